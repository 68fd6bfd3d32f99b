//! Confluence storage format renderer built on pulldown-cmark.

use std::fmt::Write;

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};

use crate::ContentRenderer;
use crate::code_block::render_code_block;
use crate::state::{PendingImage, TableState, escape_html};

/// Image source scheme that refers to an attachment of the page itself.
pub const ATTACHMENT_SCHEME: &str = "attachment:";

/// Renders markdown to Confluence XHTML storage format.
///
/// Supports GitHub Flavored Markdown tables, strikethrough and task lists.
/// Raw HTML is passed through untouched so documents can embed Confluence
/// macros inside `<div>` blocks.
#[derive(Clone, Debug)]
pub struct ConfluenceRenderer {
    options: Options,
}

impl Default for ConfluenceRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfluenceRenderer {
    /// Create a renderer with GFM extensions enabled.
    #[must_use]
    pub fn new() -> Self {
        Self {
            options: Options::ENABLE_TABLES
                | Options::ENABLE_STRIKETHROUGH
                | Options::ENABLE_TASKLISTS,
        }
    }
}

impl ContentRenderer for ConfluenceRenderer {
    fn render(&self, markdown: &str) -> String {
        let mut writer = StorageWriter::default();
        for event in Parser::new_ext(markdown, self.options) {
            writer.process_event(event);
        }
        writer.output
    }
}

/// Accumulates storage format output for one document.
#[derive(Default)]
struct StorageWriter {
    output: String,
    /// Fence language and buffered content of the open code block.
    code: Option<(Option<String>, String)>,
    table: TableState,
    image: Option<PendingImage>,
}

impl StorageWriter {
    fn process_event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => self.inline_code(&code),
            Event::Html(html) | Event::InlineHtml(html) => self.output.push_str(&html),
            Event::SoftBreak => self.text("\n"),
            Event::HardBreak => self.output.push_str("<br />"),
            Event::Rule => self.output.push_str("<hr />"),
            Event::TaskListMarker(checked) => {
                self.output.push_str(if checked { "[x] " } else { "[ ] " });
            }
            Event::FootnoteReference(_) | Event::InlineMath(_) | Event::DisplayMath(_) => {}
        }
    }

    fn start_tag(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => self.output.push_str("<p>"),
            Tag::Heading { level, .. } => {
                write!(self.output, "<h{}>", heading_level(level)).unwrap();
            }
            Tag::BlockQuote(_) => self.output.push_str(
                r#"<ac:structured-macro ac:name="info" ac:schema-version="1"><ac:rich-text-body>"#,
            ),
            Tag::CodeBlock(kind) => {
                let fence = match kind {
                    CodeBlockKind::Fenced(info) => info
                        .split_whitespace()
                        .next()
                        .map(ToOwned::to_owned),
                    CodeBlockKind::Indented => None,
                };
                self.code = Some((fence, String::new()));
            }
            Tag::List(start) => match start {
                Some(1) => self.output.push_str("<ol>"),
                Some(n) => write!(self.output, r#"<ol start="{n}">"#).unwrap(),
                None => self.output.push_str("<ul>"),
            },
            Tag::Item => self.output.push_str("<li>"),
            Tag::Table(alignments) => {
                self.table.start(alignments);
                self.output.push_str("<table>");
            }
            Tag::TableHead => {
                self.table.start_head();
                self.output.push_str("<thead><tr>");
            }
            Tag::TableRow => {
                self.table.start_row();
                self.output.push_str("<tr>");
            }
            Tag::TableCell => {
                write!(
                    self.output,
                    "<{}{}>",
                    self.table.cell_tag(),
                    self.table.alignment_style()
                )
                .unwrap();
            }
            Tag::Emphasis => self.output.push_str("<em>"),
            Tag::Strong => self.output.push_str("<strong>"),
            Tag::Strikethrough => self.output.push_str("<s>"),
            Tag::Superscript => self.output.push_str("<sup>"),
            Tag::Subscript => self.output.push_str("<sub>"),
            Tag::Link { dest_url, .. } => {
                write!(self.output, r#"<a href="{}">"#, escape_html(&dest_url)).unwrap();
            }
            Tag::Image {
                dest_url, title, ..
            } => {
                self.image = Some(PendingImage {
                    src: dest_url.into_string(),
                    title: title.into_string(),
                    alt: String::new(),
                });
            }
            Tag::DefinitionList => self.output.push_str("<dl>"),
            Tag::DefinitionListTitle => self.output.push_str("<dt>"),
            Tag::DefinitionListDefinition => self.output.push_str("<dd>"),
            Tag::FootnoteDefinition(_) | Tag::HtmlBlock | Tag::MetadataBlock(_) => {}
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => self.output.push_str("</p>"),
            TagEnd::Heading(level) => {
                write!(self.output, "</h{}>", heading_level(level)).unwrap();
            }
            TagEnd::BlockQuote(_) => self
                .output
                .push_str("</ac:rich-text-body></ac:structured-macro>"),
            TagEnd::CodeBlock => {
                if let Some((fence, content)) = self.code.take() {
                    render_code_block(fence.as_deref(), &content, &mut self.output);
                }
            }
            TagEnd::List(ordered) => self.output.push_str(if ordered { "</ol>" } else { "</ul>" }),
            TagEnd::Item => self.output.push_str("</li>"),
            TagEnd::Table => self.output.push_str("</tbody></table>"),
            TagEnd::TableHead => {
                self.output.push_str("</tr></thead><tbody>");
                self.table.end_head();
            }
            TagEnd::TableRow => self.output.push_str("</tr>"),
            TagEnd::TableCell => {
                write!(self.output, "</{}>", self.table.cell_tag()).unwrap();
                self.table.next_cell();
            }
            TagEnd::Emphasis => self.output.push_str("</em>"),
            TagEnd::Strong => self.output.push_str("</strong>"),
            TagEnd::Strikethrough => self.output.push_str("</s>"),
            TagEnd::Superscript => self.output.push_str("</sup>"),
            TagEnd::Subscript => self.output.push_str("</sub>"),
            TagEnd::Link => self.output.push_str("</a>"),
            TagEnd::Image => {
                if let Some(image) = self.image.take() {
                    write_image(&image, &mut self.output);
                }
            }
            TagEnd::DefinitionList => self.output.push_str("</dl>"),
            TagEnd::DefinitionListTitle => self.output.push_str("</dt>"),
            TagEnd::DefinitionListDefinition => self.output.push_str("</dd>"),
            TagEnd::FootnoteDefinition | TagEnd::HtmlBlock | TagEnd::MetadataBlock(_) => {}
        }
    }

    fn text(&mut self, text: &str) {
        if let Some((_, buffer)) = &mut self.code {
            buffer.push_str(text);
        } else if let Some(image) = &mut self.image {
            image.alt.push_str(text);
        } else {
            self.output.push_str(&escape_html(text));
        }
    }

    fn inline_code(&mut self, code: &str) {
        if let Some(image) = &mut self.image {
            image.alt.push_str(code);
        } else {
            write!(self.output, "<code>{}</code>", escape_html(code)).unwrap();
        }
    }
}

fn heading_level(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

/// Write an `ac:image` macro. The title falls back to the alt text.
fn write_image(image: &PendingImage, out: &mut String) {
    let label = if image.title.is_empty() {
        &image.alt
    } else {
        &image.title
    };

    out.push_str(r#"<ac:image ac:thumbnail="true""#);
    if !label.is_empty() {
        let label = escape_html(label);
        write!(out, r#" ac:title="{label}" ac:alt="{label}""#).unwrap();
    }
    out.push('>');

    let src = image.src.as_str();
    if let Some(name) = src.strip_prefix(ATTACHMENT_SCHEME) {
        write!(out, r#"<ri:attachment ri:filename="{}"/>"#, escape_html(name)).unwrap();
    } else if src.starts_with("http://") || src.starts_with("https://") || src.starts_with("//") {
        write!(out, r#"<ri:url ri:value="{}"/>"#, escape_html(src)).unwrap();
    } else {
        let name = src.rsplit('/').next().unwrap_or(src);
        write!(out, r#"<ri:attachment ri:filename="{}"/>"#, escape_html(name)).unwrap();
    }

    out.push_str("</ac:image>");
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn render(markdown: &str) -> String {
        ConfluenceRenderer::new().render(markdown)
    }

    #[test]
    fn test_paragraph_and_inline() {
        assert_eq!(
            render("Hello *big* **bold** `x < y` ~~old~~"),
            "<p>Hello <em>big</em> <strong>bold</strong> <code>x &lt; y</code> <s>old</s></p>"
        );
    }

    #[test]
    fn test_headings_keep_levels() {
        assert_eq!(render("# One\n\n## Two"), "<h1>One</h1><h2>Two</h2>");
    }

    #[test]
    fn test_code_block() {
        let out = render("```python\nm = {}\nm[\"x\"] = 1\n\n```\n");
        assert!(out.contains(concat!(
            r#"<ac:structured-macro ac:name="code" ac:schema-version="1">"#,
            r#"<ac:parameter ac:name="language">py</ac:parameter>"#,
            "<ac:plain-text-body><![CDATA[",
            "m = {}\n",
            "m[\"x\"] = 1\n",
            "]]></ac:plain-text-body>",
            "</ac:structured-macro>"
        )));
    }

    #[test]
    fn test_code_block_default_language() {
        let out = render("```\ncd $HOME\n\n```\n");
        assert!(out.contains(concat!(
            r#"<ac:parameter ac:name="language">bash</ac:parameter>"#,
            "<ac:plain-text-body><![CDATA[cd $HOME\n]]></ac:plain-text-body>"
        )));
    }

    #[test]
    fn test_code_block_not_escaped() {
        let out = render("```yaml\n'test': '<[{}]>'\n\n```\n");
        assert!(out.contains(concat!(
            r#"<ac:parameter ac:name="language">yml</ac:parameter>"#,
            "<ac:plain-text-body><![CDATA['test': '<[{}]>'\n]]></ac:plain-text-body>"
        )));
    }

    #[test]
    fn test_code_block_cdata_end_is_split() {
        let out = render("```xml\n<![CDATA[TEST]]>\n\n```\n");
        assert!(out.contains(concat!(
            r#"<ac:parameter ac:name="language">xml</ac:parameter>"#,
            "<ac:plain-text-body><![CDATA[<![CDATA[TEST]]>]]&gt;<![CDATA[\n]]></ac:plain-text-body>"
        )));
    }

    #[test]
    fn test_code_block_unsupported_language() {
        let out = render("```Dockerfile\nFROM postgres:latest\n\n```\n");
        assert_eq!(
            out,
            concat!(
                r#"<ac:structured-macro ac:name="code" ac:schema-version="1">"#,
                "<ac:plain-text-body><![CDATA[FROM postgres:latest\n]]></ac:plain-text-body>",
                "</ac:structured-macro>"
            )
        );
    }

    #[test]
    fn test_code_block_language_name_mapping() {
        let out = render("```YAML\n- test\n\n```\n");
        assert!(out.contains(r#"<ac:parameter ac:name="language">yml</ac:parameter>"#));
    }

    #[test]
    fn test_attachment_image() {
        assert_eq!(
            render("![The Image](<attachment:example.png>)"),
            concat!(
                r#"<p><ac:image ac:thumbnail="true" ac:title="The Image" ac:alt="The Image">"#,
                r#"<ri:attachment ri:filename="example.png"/>"#,
                "</ac:image></p>"
            )
        );
    }

    #[test]
    fn test_image_title_overrides_alt() {
        assert_eq!(
            render(r#"![alt text](images/example.png "title")"#),
            concat!(
                r#"<p><ac:image ac:thumbnail="true" ac:title="title" ac:alt="title">"#,
                r#"<ri:attachment ri:filename="example.png"/>"#,
                "</ac:image></p>"
            )
        );
    }

    #[test]
    fn test_external_image() {
        let out = render("![](https://example.com/a.png)");
        assert_eq!(
            out,
            r#"<p><ac:image ac:thumbnail="true"><ri:url ri:value="https://example.com/a.png"/></ac:image></p>"#
        );
    }

    #[test]
    fn test_html_macro_passthrough() {
        let macro_html = concat!(
            "<div>",
            r#"<ac:structured-macro ac:name="jiraissues">"#,
            r#"<ac:parameter ac:name="jqlQuery">filter=666 ORDER BY updated DESC</ac:parameter>"#,
            r#"<ac:parameter ac:name="columns">a,b,c</ac:parameter>"#,
            "</ac:structured-macro>",
            "</div>"
        );
        assert!(render(macro_html).contains(macro_html));
    }

    #[test]
    fn test_blockquote_is_info_panel() {
        assert_eq!(
            render("> Note"),
            concat!(
                r#"<ac:structured-macro ac:name="info" ac:schema-version="1"><ac:rich-text-body>"#,
                "<p>Note</p>",
                "</ac:rich-text-body></ac:structured-macro>"
            )
        );
    }

    #[test]
    fn test_lists() {
        assert_eq!(render("- a\n- b"), "<ul><li>a</li><li>b</li></ul>");
        assert_eq!(render("3. c\n4. d"), r#"<ol start="3"><li>c</li><li>d</li></ol>"#);
        assert_eq!(render("- [x] done"), "<ul><li>[x] done</li></ul>");
    }

    #[test]
    fn test_table() {
        assert_eq!(
            render("| A | B |\n|---|--:|\n| 1 | 2 |"),
            concat!(
                "<table><thead><tr><th>A</th>",
                r#"<th style="text-align: right;">B</th>"#,
                "</tr></thead><tbody><tr><td>1</td>",
                r#"<td style="text-align: right;">2</td>"#,
                "</tr></tbody></table>"
            )
        );
    }

    #[test]
    fn test_link_and_breaks() {
        assert_eq!(
            render("[site](https://example.com?a=1&b=2)  \nnext\n\n---"),
            r#"<p><a href="https://example.com?a=1&amp;b=2">site</a><br />next</p><hr />"#
        );
    }

    #[test]
    fn test_render_is_deterministic() {
        let doc = "# Title\n\nSome text with ![img](<attachment:a.png>).\n\n```rust\nfn main() {}\n```\n";
        assert_eq!(render(doc), render(doc));
    }

    #[test]
    fn test_empty_document() {
        assert_eq!(render(""), "");
    }
}
