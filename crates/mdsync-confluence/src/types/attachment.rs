//! Confluence attachment types.

use serde::Deserialize;

use crate::directory::RemoteAttachment;

/// Confluence attachment.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Attachment {
    /// Attachment ID.
    pub id: String,
    /// Attachment title/filename.
    pub title: String,
    /// Metadata (carries the comment when expanded).
    #[serde(default)]
    pub metadata: Option<AttachmentMetadata>,
    /// Extensions (carries comment and size on Server/Data Center).
    #[serde(default)]
    pub extensions: Option<AttachmentExtensions>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct AttachmentMetadata {
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct AttachmentExtensions {
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(rename = "fileSize", default)]
    pub file_size: Option<u64>,
}

/// Attachments API response (one page of results).
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct AttachmentsResponse {
    /// Attachments on this result page.
    pub results: Vec<Attachment>,
    /// Pagination links.
    #[serde(rename = "_links", default)]
    pub links: Option<PageLinks>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct PageLinks {
    /// Relative link to the next result page, absent on the last one.
    #[serde(default)]
    pub next: Option<String>,
}

impl AttachmentsResponse {
    pub(crate) fn has_next(&self) -> bool {
        self.links.as_ref().is_some_and(|l| l.next.is_some())
    }
}

impl Attachment {
    /// Convert to the transport-independent representation.
    pub(crate) fn into_remote(self) -> RemoteAttachment {
        let (ext_comment, size) = self
            .extensions
            .map_or((None, None), |e| (e.comment, e.file_size));
        let fingerprint = ext_comment
            .or_else(|| self.metadata.and_then(|m| m.comment))
            .filter(|c| !c.is_empty());
        RemoteAttachment {
            id: self.id,
            title: self.title,
            fingerprint,
            size,
        }
    }
}
