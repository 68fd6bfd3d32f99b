//! Markdown to Confluence storage format rendering.
//!
//! The publisher only depends on the [`ContentRenderer`] trait; the
//! [`ConfluenceRenderer`] shipped here is the default implementation.
//!
//! # Attachment references
//!
//! Image sources using the `attachment:` scheme are rendered as references to
//! page attachments:
//!
//! ```
//! use mdsync_renderer::{ConfluenceRenderer, ContentRenderer};
//!
//! let markup = ConfluenceRenderer::new().render("![Logo](<attachment:logo.png>)");
//! assert!(markup.contains(r#"<ri:attachment ri:filename="logo.png"/>"#));
//! ```

mod code_block;
mod renderer;
mod state;

pub use renderer::{ATTACHMENT_SCHEME, ConfluenceRenderer};
pub use state::escape_html;

/// Converts a document body to Confluence storage format.
///
/// Implementations must be pure: the same body always yields the same bytes,
/// since the output is fingerprinted to detect changes.
pub trait ContentRenderer {
    /// Render markdown to Confluence XHTML storage format.
    fn render(&self, markdown: &str) -> String;
}
