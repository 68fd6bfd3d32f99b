//! Local image references rewritten to page attachments.

use std::collections::BTreeMap;
use std::ops::Range;
use std::sync::LazyLock;

use mdsync_renderer::ATTACHMENT_SCHEME;
use pulldown_cmark::{Event, Parser, Tag};
use regex::{Captures, Regex};

use super::error::PublishError;

/// Inline image: `![alt](path "title")`, with optional `<...>` around the path.
static IMAGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"!\[(?P<alt>[^\]\n]*)\]\(\s*(?P<src><[^>\n]*>|[^)\s]+)(?:\s+"(?P<title>[^"\n]*)")?\s*\)"#,
    )
    .unwrap()
});

/// Sources that are never uploaded.
const EXTERNAL_PREFIXES: [&str; 4] = ["http://", "https://", "data:", "//"];

/// A local image referenced from a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetReference {
    /// Alt text.
    pub alt: String,
    /// Path as written, relative to the document.
    pub path: String,
    /// Optional image title.
    pub title: Option<String>,
    /// Attachment filename (basename of `path`).
    pub name: String,
}

/// Body with local images pointing at attachments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewrittenBody {
    /// Rewritten markdown.
    pub body: String,
    /// Referenced assets keyed by attachment filename.
    pub assets: BTreeMap<String, AssetReference>,
}

/// Replace local image paths with `attachment:` references.
///
/// Images inside code blocks and code spans are left alone.
///
/// # Errors
///
/// Returns [`PublishError::AssetNameCollision`] when two different paths
/// share a filename.
pub fn rewrite_assets(body: &str) -> Result<RewrittenBody, PublishError> {
    let code = code_ranges(body);
    let mut assets: BTreeMap<String, AssetReference> = BTreeMap::new();
    let mut out = String::with_capacity(body.len());
    let mut last = 0;

    for caps in IMAGE_RE.captures_iter(body) {
        let Some(whole) = caps.get(0) else { continue };
        if code.iter().any(|r| r.contains(&whole.start())) {
            continue;
        }
        let Some(asset) = local_asset(&caps) else {
            continue;
        };

        if let Some(existing) = assets.get(&asset.name)
            && existing.path != asset.path
        {
            return Err(PublishError::AssetNameCollision {
                name: asset.name,
                first: existing.path.clone(),
                second: asset.path,
            });
        }

        out.push_str(&body[last..whole.start()]);
        out.push_str(&format!(
            "![{}](<{ATTACHMENT_SCHEME}{}>",
            asset.alt, asset.name
        ));
        if let Some(title) = &asset.title {
            out.push_str(&format!(r#" "{title}""#));
        }
        out.push(')');
        last = whole.end();

        assets.entry(asset.name.clone()).or_insert(asset);
    }
    out.push_str(&body[last..]);

    Ok(RewrittenBody { body: out, assets })
}

/// Build the reference for a local image match, `None` for external sources.
fn local_asset(caps: &Captures<'_>) -> Option<AssetReference> {
    let raw = caps.name("src")?.as_str();
    let src = raw
        .strip_prefix('<')
        .and_then(|s| s.strip_suffix('>'))
        .unwrap_or(raw)
        .trim();

    if src.starts_with(ATTACHMENT_SCHEME) || EXTERNAL_PREFIXES.iter().any(|p| src.starts_with(p)) {
        return None;
    }

    let mut path = src;
    while let Some(rest) = path.strip_prefix("./") {
        path = rest;
    }
    let name = path.rsplit('/').next().filter(|n| !n.is_empty())?;

    Some(AssetReference {
        alt: caps.name("alt").map_or("", |m| m.as_str()).to_owned(),
        path: path.to_owned(),
        title: caps.name("title").map(|m| m.as_str().to_owned()),
        name: name.to_owned(),
    })
}

/// Byte ranges covered by code blocks and code spans.
fn code_ranges(body: &str) -> Vec<Range<usize>> {
    Parser::new(body)
        .into_offset_iter()
        .filter_map(|(event, range)| match event {
            Event::Start(Tag::CodeBlock(_)) | Event::Code(_) => Some(range),
            _ => None,
        })
        .collect()
}
