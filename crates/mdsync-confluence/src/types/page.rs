//! Confluence page types.

use serde::Deserialize;

use crate::directory::RemotePage;

/// Confluence page as returned with `expand=version,ancestors`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Page {
    /// Page ID.
    pub id: String,
    /// Page title.
    pub title: String,
    /// Version information (absent when not expanded).
    #[serde(default)]
    pub version: Option<Version>,
    /// Ancestors, root first.
    #[serde(default)]
    pub ancestors: Vec<Ancestor>,
    /// Hypermedia links.
    #[serde(rename = "_links", default)]
    pub links: Option<Links>,
}

/// Page version.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Version {
    /// Version number.
    pub number: u32,
    /// Version message/comment. Holds the content fingerprint.
    #[serde(default)]
    pub message: Option<String>,
}

/// Ancestor reference.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Ancestor {
    /// Ancestor page ID.
    pub id: String,
}

/// Hypermedia links.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Links {
    /// Web UI path relative to the server base URL.
    #[serde(default)]
    pub webui: Option<String>,
}

/// Content listing response (`GET /content?title=...`).
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct PageList {
    /// Matching pages.
    pub results: Vec<Page>,
}

impl Page {
    /// Convert to the transport-independent representation.
    ///
    /// A page without version information is treated as version 1.
    pub(crate) fn into_remote(self, base_url: &str) -> RemotePage {
        let (version, fingerprint) = self
            .version
            .map_or((1, None), |v| (v.number, v.message.filter(|m| !m.is_empty())));
        RemotePage {
            id: self.id,
            title: self.title,
            version,
            fingerprint,
            ancestor_id: self.ancestors.last().map(|a| a.id.clone()),
            web_url: self
                .links
                .and_then(|l| l.webui)
                .map(|webui| format!("{base_url}{webui}")),
        }
    }
}
