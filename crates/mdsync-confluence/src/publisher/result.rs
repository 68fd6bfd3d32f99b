//! Result types for publish runs.

use std::path::PathBuf;

use super::error::PublishError;

/// What happened to a page's body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageStatus {
    /// Page was created in this run and received its first content.
    Created,
    /// Existing page received new content.
    Updated,
    /// Stored fingerprint matched; nothing was written.
    Unchanged,
}

/// Attachment counts for one document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AttachmentStats {
    /// Attachments created or replaced.
    pub uploaded: usize,
    /// Attachments whose fingerprint matched.
    pub unchanged: usize,
}

/// Successful publish of one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentOutcome {
    /// Source file relative to the docs directory.
    pub path: PathBuf,
    /// Page title.
    pub title: String,
    /// Page ID.
    pub page_id: String,
    /// Page link, when known.
    pub url: Option<String>,
    /// Body status.
    pub status: PageStatus,
    /// Attachment counts.
    pub attachments: AttachmentStats,
}

/// Failed publish of one document.
#[derive(Debug)]
pub struct DocumentFailure {
    /// Source file relative to the docs directory.
    pub path: PathBuf,
    /// Why it failed.
    pub error: PublishError,
}

/// Summary of a publish run.
#[derive(Debug, Default)]
pub struct PublishReport {
    /// Published documents in publish order.
    pub outcomes: Vec<DocumentOutcome>,
    /// Documents that failed.
    pub failures: Vec<DocumentFailure>,
    /// Files skipped by the scan.
    pub skipped: Vec<PathBuf>,
    /// Pages created during the run, including directory pages.
    pub pages_created: usize,
}

impl PublishReport {
    /// Number of documents with the given status.
    pub fn count(&self, status: PageStatus) -> usize {
        self.outcomes.iter().filter(|o| o.status == status).count()
    }

    /// Attachments uploaded across all documents.
    pub fn attachments_uploaded(&self) -> usize {
        self.outcomes.iter().map(|o| o.attachments.uploaded).sum()
    }

    /// Whether every document was published.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}
