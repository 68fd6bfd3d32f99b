//! Remote page directory abstraction.
//!
//! The publisher talks to Confluence only through [`PageDirectory`], so the
//! same protocol runs against the live REST client, the dry-run recorder and
//! the in-memory mock used in tests.

use std::collections::BTreeMap;

use crate::client::ConfluenceClient;
use crate::error::ConfluenceError;

/// Body written when a page is created.
///
/// Carries no fingerprint, so the first content write is never skipped.
pub const PLACEHOLDER_BODY: &str = "<p>Empty page</p>";

/// A page as seen by the publisher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemotePage {
    /// Page ID, stable across runs.
    pub id: String,
    /// Page title, unique within a space.
    pub title: String,
    /// Current version number.
    pub version: u32,
    /// Version comment of the current version (content fingerprint).
    pub fingerprint: Option<String>,
    /// Nearest ancestor page ID.
    pub ancestor_id: Option<String>,
    /// Web UI link.
    pub web_url: Option<String>,
}

impl RemotePage {
    /// Link used in log lines, falling back to the page ID.
    pub fn display_url(&self) -> &str {
        self.web_url.as_deref().unwrap_or(&self.id)
    }
}

/// An attachment as seen by the publisher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteAttachment {
    /// Attachment ID.
    pub id: String,
    /// Attachment filename, unique per page.
    pub title: String,
    /// Attachment comment (content fingerprint).
    pub fingerprint: Option<String>,
    /// Size in bytes, when reported.
    pub size: Option<u64>,
}

/// Content write for an existing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageUpdate {
    /// Page ID.
    pub id: String,
    /// Page title (unchanged by the publisher).
    pub title: String,
    /// New version number, exactly one above the current one.
    pub version: u32,
    /// Storage-format body.
    pub body: String,
    /// Version comment.
    pub comment: String,
}

/// Attachment upload, created or replaced by filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentUpload {
    /// Attachment filename.
    pub filename: String,
    /// MIME type.
    pub content_type: String,
    /// File contents.
    pub data: Vec<u8>,
    /// Attachment comment.
    pub comment: String,
    /// ID of the attachment being replaced, when already known.
    pub existing_id: Option<String>,
}

/// Remote page store keyed by title within a space.
pub trait PageDirectory {
    /// Find a page by exact title.
    fn find_page(&self, title: &str, space: &str) -> Result<Option<RemotePage>, ConfluenceError>;

    /// Get a page with its current version and fingerprint.
    fn get_page(&self, id: &str) -> Result<RemotePage, ConfluenceError>;

    /// Create a page holding [`PLACEHOLDER_BODY`] under `ancestor_id`.
    fn create_page(
        &self,
        title: &str,
        space: &str,
        ancestor_id: Option<&str>,
    ) -> Result<RemotePage, ConfluenceError>;

    /// Write new content. Fails with a 409 response if `update.version` is
    /// not exactly the current version plus one.
    fn update_page(&self, update: &PageUpdate) -> Result<RemotePage, ConfluenceError>;

    /// List attachments keyed by filename. Empty for unknown pages.
    fn list_attachments(
        &self,
        page_id: &str,
    ) -> Result<BTreeMap<String, RemoteAttachment>, ConfluenceError>;

    /// Create or replace an attachment.
    fn upload_attachment(
        &self,
        page_id: &str,
        upload: &AttachmentUpload,
    ) -> Result<RemoteAttachment, ConfluenceError>;
}

impl PageDirectory for ConfluenceClient {
    fn find_page(&self, title: &str, space: &str) -> Result<Option<RemotePage>, ConfluenceError> {
        self.search_page(title, space)
    }

    fn get_page(&self, id: &str) -> Result<RemotePage, ConfluenceError> {
        self.fetch_page(id)
    }

    fn create_page(
        &self,
        title: &str,
        space: &str,
        ancestor_id: Option<&str>,
    ) -> Result<RemotePage, ConfluenceError> {
        self.post_page(title, space, ancestor_id)
    }

    fn update_page(&self, update: &PageUpdate) -> Result<RemotePage, ConfluenceError> {
        self.put_page(update)
    }

    fn list_attachments(
        &self,
        page_id: &str,
    ) -> Result<BTreeMap<String, RemoteAttachment>, ConfluenceError> {
        self.fetch_attachments(page_id)
    }

    fn upload_attachment(
        &self,
        page_id: &str,
        upload: &AttachmentUpload,
    ) -> Result<RemoteAttachment, ConfluenceError> {
        self.post_attachment(page_id, upload)
    }
}
