//! Dry-run page directory.
//!
//! [`DryRunDirectory`] answers reads from the live directory (when one is
//! available) and records every write as a [`PlannedWrite`] instead of
//! sending it. Pages it "creates" get synthetic IDs so the rest of the
//! protocol runs unchanged.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::RwLock;

use crate::directory::{AttachmentUpload, PageDirectory, PageUpdate, RemoteAttachment, RemotePage};
use crate::error::ConfluenceError;

/// Prefix of page IDs invented during a dry run.
const SYNTHETIC_PREFIX: &str = "dry-run-";

/// A write that a live run would have sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlannedWrite {
    /// Page creation with the placeholder body.
    CreatePage {
        title: String,
        ancestor_id: Option<String>,
    },
    /// Page content update.
    UpdatePage {
        page_id: String,
        title: String,
        version: u32,
        body: String,
        comment: String,
    },
    /// Attachment upload.
    UploadAttachment {
        page_id: String,
        filename: String,
        size: usize,
        comment: String,
    },
}

impl fmt::Display for PlannedWrite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreatePage { title, ancestor_id } => match ancestor_id {
                Some(parent) => write!(f, "create page '{title}' under {parent}"),
                None => write!(f, "create page '{title}'"),
            },
            Self::UpdatePage {
                page_id,
                title,
                version,
                ..
            } => write!(f, "update page '{title}' ({page_id}) to version {version}"),
            Self::UploadAttachment {
                page_id,
                filename,
                size,
                ..
            } => write!(f, "upload attachment '{filename}' ({size} bytes) to {page_id}"),
        }
    }
}

#[derive(Debug, Default)]
struct DryRunState {
    next_id: usize,
    pages: BTreeMap<String, RemotePage>,
    planned: Vec<PlannedWrite>,
}

/// Page directory that never writes.
pub struct DryRunDirectory<'a> {
    live: Option<&'a dyn PageDirectory>,
    state: RwLock<DryRunState>,
}

impl<'a> DryRunDirectory<'a> {
    /// Wrap a live directory used for reads only.
    #[must_use]
    pub fn new(live: &'a dyn PageDirectory) -> Self {
        Self {
            live: Some(live),
            state: RwLock::default(),
        }
    }

    /// Dry run without Confluence access: every page looks new.
    #[must_use]
    pub fn offline() -> Self {
        Self {
            live: None,
            state: RwLock::default(),
        }
    }

    /// Writes recorded so far, in call order.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn planned_writes(&self) -> Vec<PlannedWrite> {
        self.state.read().unwrap().planned.clone()
    }

    fn is_synthetic(id: &str) -> bool {
        id.starts_with(SYNTHETIC_PREFIX)
    }
}

impl PageDirectory for DryRunDirectory<'_> {
    fn find_page(&self, title: &str, space: &str) -> Result<Option<RemotePage>, ConfluenceError> {
        if let Some(page) = self
            .state
            .read()
            .unwrap()
            .pages
            .values()
            .find(|p| p.title == title)
        {
            return Ok(Some(page.clone()));
        }
        match self.live {
            Some(live) => live.find_page(title, space),
            None => Ok(None),
        }
    }

    fn get_page(&self, id: &str) -> Result<RemotePage, ConfluenceError> {
        if let Some(page) = self.state.read().unwrap().pages.get(id) {
            return Ok(page.clone());
        }
        match self.live {
            Some(live) if !Self::is_synthetic(id) => live.get_page(id),
            _ => Err(ConfluenceError::UnexpectedResponse {
                url: format!("dry-run://content/{id}"),
                message: "page is unknown to the dry run".to_owned(),
            }),
        }
    }

    fn create_page(
        &self,
        title: &str,
        _space: &str,
        ancestor_id: Option<&str>,
    ) -> Result<RemotePage, ConfluenceError> {
        let mut state = self.state.write().unwrap();
        state.next_id += 1;
        let id = format!("{SYNTHETIC_PREFIX}{}", state.next_id);
        let page = RemotePage {
            id: id.clone(),
            title: title.to_owned(),
            version: 1,
            fingerprint: None,
            ancestor_id: ancestor_id.map(str::to_owned),
            web_url: None,
        };
        state.pages.insert(id, page.clone());
        state.planned.push(PlannedWrite::CreatePage {
            title: title.to_owned(),
            ancestor_id: ancestor_id.map(str::to_owned),
        });
        Ok(page)
    }

    fn update_page(&self, update: &PageUpdate) -> Result<RemotePage, ConfluenceError> {
        let mut state = self.state.write().unwrap();
        state.planned.push(PlannedWrite::UpdatePage {
            page_id: update.id.clone(),
            title: update.title.clone(),
            version: update.version,
            body: update.body.clone(),
            comment: update.comment.clone(),
        });

        let page = state.pages.get(&update.id).cloned();
        let mut page = page.unwrap_or_else(|| RemotePage {
            id: update.id.clone(),
            title: update.title.clone(),
            version: update.version,
            fingerprint: None,
            ancestor_id: None,
            web_url: None,
        });
        page.version = update.version;
        page.fingerprint = Some(update.comment.clone());
        if Self::is_synthetic(&page.id) {
            state.pages.insert(page.id.clone(), page.clone());
        }
        Ok(page)
    }

    fn list_attachments(
        &self,
        page_id: &str,
    ) -> Result<BTreeMap<String, RemoteAttachment>, ConfluenceError> {
        match self.live {
            Some(live) if !Self::is_synthetic(page_id) => live.list_attachments(page_id),
            _ => Ok(BTreeMap::new()),
        }
    }

    fn upload_attachment(
        &self,
        page_id: &str,
        upload: &AttachmentUpload,
    ) -> Result<RemoteAttachment, ConfluenceError> {
        let mut state = self.state.write().unwrap();
        state.planned.push(PlannedWrite::UploadAttachment {
            page_id: page_id.to_owned(),
            filename: upload.filename.clone(),
            size: upload.data.len(),
            comment: upload.comment.clone(),
        });
        Ok(RemoteAttachment {
            id: upload
                .existing_id
                .clone()
                .unwrap_or_else(|| format!("{SYNTHETIC_PREFIX}{}", upload.filename)),
            title: upload.filename.clone(),
            fingerprint: Some(upload.comment.clone()),
            size: Some(upload.data.len() as u64),
        })
    }
}
