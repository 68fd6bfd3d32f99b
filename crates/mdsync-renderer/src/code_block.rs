//! Confluence code macro rendering.

use std::fmt::Write;

/// Language used for code blocks without a fence language.
const DEFAULT_LANGUAGE: &str = "bash";

/// Map a fence language to a language the Confluence code macro understands.
///
/// Returns `None` for languages the macro has no highlighter for, in which case
/// the `language` parameter is omitted entirely.
pub(crate) fn confluence_language(fence: Option<&str>) -> Option<&'static str> {
    let Some(fence) = fence.map(str::trim).filter(|f| !f.is_empty()) else {
        return Some(DEFAULT_LANGUAGE);
    };

    let lang = match fence.to_lowercase().as_str() {
        "actionscript" | "actionscript3" | "as3" => "actionscript3",
        "applescript" => "applescript",
        "bash" | "sh" | "shell" | "zsh" | "console" | "shell-session" => "bash",
        "c#" | "csharp" | "cs" => "c#",
        "c" | "cpp" | "c++" | "cc" | "h" | "hpp" => "cpp",
        "css" => "css",
        "coldfusion" | "cf" => "coldfusion",
        "delphi" | "pascal" => "delphi",
        "diff" | "patch" => "diff",
        "erlang" | "erl" => "erl",
        "groovy" => "groovy",
        "html" | "xhtml" | "xml" | "svg" => "xml",
        "java" => "java",
        "javafx" | "jfx" => "jfx",
        "javascript" | "js" | "json" | "jsx" | "typescript" | "ts" => "js",
        "php" => "php",
        "perl" | "pl" => "perl",
        "text" | "txt" | "plain" | "plaintext" => "text",
        "powershell" | "ps" | "ps1" => "powershell",
        "python" | "py" => "py",
        "ruby" | "rb" => "ruby",
        "sql" => "sql",
        "sass" | "scss" => "sass",
        "scala" => "scala",
        "vb" | "vbnet" | "visualbasic" => "vb",
        "yaml" | "yml" => "yml",
        _ => return None,
    };
    Some(lang)
}

/// Wrap code in CDATA, splitting any literal `]]>` across two sections.
fn cdata(content: &str) -> String {
    format!(
        "<![CDATA[{}]]>",
        content.replace("]]>", "]]>]]&gt;<![CDATA[")
    )
}

/// Render a code block as a Confluence `code` structured macro.
///
/// Trailing blank lines are collapsed to a single newline.
pub(crate) fn render_code_block(fence: Option<&str>, content: &str, out: &mut String) {
    out.push_str(r#"<ac:structured-macro ac:name="code" ac:schema-version="1">"#);
    if let Some(lang) = confluence_language(fence) {
        write!(
            out,
            r#"<ac:parameter ac:name="language">{lang}</ac:parameter>"#
        )
        .unwrap();
    }
    let body = format!("{}\n", content.trim_end_matches('\n'));
    write!(out, "<ac:plain-text-body>{}</ac:plain-text-body>", cdata(&body)).unwrap();
    out.push_str("</ac:structured-macro>");
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_language_mapping() {
        assert_eq!(confluence_language(Some("python")), Some("py"));
        assert_eq!(confluence_language(Some("YAML")), Some("yml"));
        assert_eq!(confluence_language(Some("xml")), Some("xml"));
        assert_eq!(confluence_language(Some("c++")), Some("cpp"));
    }

    #[test]
    fn test_language_default() {
        assert_eq!(confluence_language(None), Some("bash"));
        assert_eq!(confluence_language(Some("  ")), Some("bash"));
    }

    #[test]
    fn test_language_unsupported() {
        assert_eq!(confluence_language(Some("Dockerfile")), None);
    }

    #[test]
    fn test_cdata_split() {
        assert_eq!(
            cdata("<![CDATA[TEST]]>\n"),
            "<![CDATA[<![CDATA[TEST]]>]]&gt;<![CDATA[\n]]>"
        );
    }

    #[test]
    fn test_render_code_block_trailing_blank_lines() {
        let mut out = String::new();
        render_code_block(Some("python"), "x = 1\n\n\n", &mut out);
        assert_eq!(
            out,
            concat!(
                r#"<ac:structured-macro ac:name="code" ac:schema-version="1">"#,
                r#"<ac:parameter ac:name="language">py</ac:parameter>"#,
                "<ac:plain-text-body><![CDATA[x = 1\n]]></ac:plain-text-body>",
                "</ac:structured-macro>"
            )
        );
    }
}
