//! Confluence page-tree publishing.
//!
//! This crate provides:
//! - [`ConfluenceClient`]: REST client for Confluence Server/Data Center
//! - [`PageDirectory`]: the remote operations the publisher relies on
//! - [`DryRunDirectory`]: records writes instead of sending them
//! - [`Publisher`]: idempotent publishing of a markdown docs tree
//!
//! Change detection stores a [`ContentFingerprint`] of the rendered page in
//! the version comment, and of each attachment in the attachment comment.

mod client;
mod directory;
mod dry_run;
pub mod error;
mod fingerprint;
#[cfg(any(test, feature = "mock"))]
mod mock;
pub mod publisher;
mod types;

pub use client::ConfluenceClient;
pub use directory::{
    AttachmentUpload, PLACEHOLDER_BODY, PageDirectory, PageUpdate, RemoteAttachment, RemotePage,
};
pub use dry_run::{DryRunDirectory, PlannedWrite};
pub use error::ConfluenceError;
pub use fingerprint::ContentFingerprint;
#[cfg(any(test, feature = "mock"))]
pub use mock::{CONCURRENT_EDIT_BODY, MockAttachment, MockCalls, MockDirectory, MockPage};
pub use publisher::{PageStatus, PublishError, PublishReport, Publisher};
