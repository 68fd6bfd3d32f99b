//! Docs tree publishing.
//!
//! [`Publisher`] drives one run:
//!
//! 1. Scan the docs directory (unsupported files are reported before any
//!    remote call)
//! 2. Per document: rewrite local images to attachments, render, fingerprint
//! 3. Resolve directory pages and the document page (get or create)
//! 4. Upload changed attachments
//! 5. Update the page body unless the stored fingerprint matches
//!
//! # Example
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use mdsync_config::{ConfluenceAuth, PublishConfig};
//! use mdsync_confluence::{ConfluenceClient, Publisher};
//! use mdsync_renderer::ConfluenceRenderer;
//!
//! let client = ConfluenceClient::new(
//!     "https://confluence.example.com",
//!     &ConfluenceAuth::Token("token".to_owned()),
//! );
//! let renderer = ConfluenceRenderer::new();
//! let config = PublishConfig::default();
//!
//! let report = Publisher::new(&client, &renderer, &config, "DOCS").publish()?;
//! println!("{} documents published", report.outcomes.len());
//! # Ok(())
//! # }
//! ```

pub mod assets;
pub mod attachments;
mod error;
mod executor;
pub mod resolver;
mod result;
pub mod scanner;

pub use error::PublishError;
pub use executor::Publisher;
pub use result::{AttachmentStats, DocumentFailure, DocumentOutcome, PageStatus, PublishReport};
pub use scanner::{DocumentNode, Namespace, ScanEntry, ScanResult, Scanner};
