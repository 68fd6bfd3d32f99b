//! Confluence REST API wire types.
//!
//! Only fields that are actually used are declared; serde ignores the rest.

mod attachment;
mod page;

pub(crate) use attachment::{Attachment, AttachmentsResponse};
pub(crate) use page::{Page, PageList};
