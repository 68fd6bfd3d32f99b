//! Error types for publish operations.

use std::path::PathBuf;

use crate::error::ConfluenceError;

/// Error while publishing a documentation tree.
///
/// Most variants only fail the document being published; see
/// [`is_fatal`](Self::is_fatal).
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    /// A file that is neither a document nor ignored (strict mode).
    #[error("Unsupported file in docs tree: {}", .path.display())]
    UnsupportedDocument {
        /// Offending file.
        path: PathBuf,
    },

    /// The first directory page of the run (or the parent page) could not
    /// be resolved.
    #[error("Cannot resolve page for directory '{namespace}': {source}")]
    Namespace {
        /// Namespace page title.
        namespace: String,
        /// Underlying failure.
        #[source]
        source: Box<PublishError>,
    },

    /// A directory page could not be resolved after others already were.
    /// Only documents under that directory fail.
    #[error("Directory page '{namespace}' is unavailable: {source}")]
    NamespaceUnavailable {
        /// Namespace page title.
        namespace: String,
        /// Underlying failure.
        #[source]
        source: Box<PublishError>,
    },

    /// Two documents map to the same page title.
    #[error("Page title '{title}' is used by both '{}' and '{}'", .first.display(), .second.display())]
    DuplicateTitle {
        /// Shared page title.
        title: String,
        /// Document that claimed the title first.
        first: PathBuf,
        /// Document that was not published.
        second: PathBuf,
    },

    /// A read from Confluence failed.
    #[error("Confluence lookup failed ({operation}): {source}")]
    RemoteLookup {
        /// What was being looked up.
        operation: String,
        /// Underlying API error.
        #[source]
        source: ConfluenceError,
    },

    /// A write to Confluence failed.
    #[error("Confluence write failed ({operation}): {source}")]
    RemoteWrite {
        /// What was being written.
        operation: String,
        /// Underlying API error.
        #[source]
        source: ConfluenceError,
    },

    /// The page changed between reading its version and writing.
    #[error("Page {page_id} was modified concurrently, version {version} rejected")]
    StaleVersion {
        /// Page ID.
        page_id: String,
        /// Version number that was rejected.
        version: u32,
    },

    /// Reading a local file or directory failed.
    #[error("Cannot read {}: {source}", .path.display())]
    LocalIo {
        /// Path being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Two different image paths share a filename within one document.
    #[error("Attachment name '{name}' is used by both '{first}' and '{second}'")]
    AssetNameCollision {
        /// Shared filename.
        name: String,
        /// First referenced path.
        first: String,
        /// Second referenced path.
        second: String,
    },
}

impl PublishError {
    /// Whether the error halts the whole run instead of one document.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedDocument { .. } | Self::Namespace { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        let unsupported = PublishError::UnsupportedDocument {
            path: PathBuf::from("docs/guide/notes.txt"),
        };
        let stale = PublishError::StaleVersion {
            page_id: "42".to_owned(),
            version: 3,
        };
        let namespace = PublishError::Namespace {
            namespace: "guide".to_owned(),
            source: Box::new(PublishError::StaleVersion {
                page_id: "1".to_owned(),
                version: 2,
            }),
        };

        let unavailable = PublishError::NamespaceUnavailable {
            namespace: "guide".to_owned(),
            source: Box::new(PublishError::StaleVersion {
                page_id: "1".to_owned(),
                version: 2,
            }),
        };
        let duplicate = PublishError::DuplicateTitle {
            title: "intro".to_owned(),
            first: PathBuf::from("a/intro.md"),
            second: PathBuf::from("b/intro.md"),
        };

        assert!(unsupported.is_fatal());
        assert!(namespace.is_fatal());
        assert!(!stale.is_fatal());
        assert!(!unavailable.is_fatal());
        assert!(!duplicate.is_fatal());
    }

    #[test]
    fn test_display() {
        let err = PublishError::AssetNameCollision {
            name: "logo.png".to_owned(),
            first: "images/logo.png".to_owned(),
            second: "old/logo.png".to_owned(),
        };
        assert_eq!(
            err.to_string(),
            "Attachment name 'logo.png' is used by both 'images/logo.png' and 'old/logo.png'"
        );

        let err = PublishError::DuplicateTitle {
            title: "intro".to_owned(),
            first: PathBuf::from("a/intro.md"),
            second: PathBuf::from("b/intro.md"),
        };
        assert_eq!(
            err.to_string(),
            "Page title 'intro' is used by both 'a/intro.md' and 'b/intro.md'"
        );
    }
}
