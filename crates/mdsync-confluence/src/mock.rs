//! In-memory page directory for testing.
//!
//! Provides [`MockDirectory`], which behaves like a Confluence space: titles
//! are unique per space, versions must increase by exactly one and every call
//! is counted so tests can assert how much remote traffic a run caused.

use std::collections::{BTreeMap, HashSet};
use std::sync::RwLock;

use crate::directory::{
    AttachmentUpload, PLACEHOLDER_BODY, PageDirectory, PageUpdate, RemoteAttachment, RemotePage,
};
use crate::error::ConfluenceError;

/// Body written by a simulated concurrent editor.
pub const CONCURRENT_EDIT_BODY: &str = "<p>Edited elsewhere</p>";

/// Number of calls made to each [`PageDirectory`] operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MockCalls {
    pub find: usize,
    pub get: usize,
    pub create: usize,
    pub update: usize,
    pub list_attachments: usize,
    pub upload: usize,
}

impl MockCalls {
    /// Number of calls that changed remote state.
    pub fn writes(&self) -> usize {
        self.create + self.update + self.upload
    }
}

/// Page stored in the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockPage {
    /// Page metadata.
    pub page: RemotePage,
    /// Space key.
    pub space: String,
    /// Current storage-format body.
    pub body: String,
}

/// Attachment stored in the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockAttachment {
    /// Attachment metadata.
    pub attachment: RemoteAttachment,
    /// File contents.
    pub data: Vec<u8>,
}

#[derive(Debug, Default)]
struct MockState {
    pages: BTreeMap<String, MockPage>,
    attachments: BTreeMap<String, BTreeMap<String, MockAttachment>>,
    next_id: u64,
    calls: MockCalls,
    concurrent_edits: HashSet<String>,
    failing_uploads: HashSet<String>,
    failing_lookups: HashSet<String>,
}

impl MockState {
    fn allocate_id(&mut self) -> String {
        self.next_id += 1;
        format!("{}", 1000 + self.next_id)
    }

    fn page_by_title(&self, title: &str, space: &str) -> Option<&MockPage> {
        self.pages
            .values()
            .find(|p| p.page.title == title && p.space == space)
    }
}

fn error(method: &'static str, path: &str, status: u16, body: &str) -> ConfluenceError {
    ConfluenceError::HttpResponse {
        method,
        url: format!("mock://rest/api/{path}"),
        status,
        body: body.to_owned(),
    }
}

/// Mock page directory for testing.
///
/// # Example
///
/// ```ignore
/// use mdsync_confluence::{MockDirectory, PageDirectory};
///
/// let directory = MockDirectory::new().with_page("DOCS", "guide", 3, Some("abc"));
/// let page = directory.find_page("guide", "DOCS").unwrap().unwrap();
/// assert_eq!(page.version, 3);
/// ```
#[derive(Debug, Default)]
pub struct MockDirectory {
    state: RwLock<MockState>,
}

impl MockDirectory {
    /// Create an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an existing top-level page.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_page(self, space: &str, title: &str, version: u32, fingerprint: Option<&str>) -> Self {
        {
            let mut state = self.state.write().unwrap();
            let id = state.allocate_id();
            state.pages.insert(
                id.clone(),
                MockPage {
                    page: RemotePage {
                        id: id.clone(),
                        title: title.to_owned(),
                        version,
                        fingerprint: fingerprint.map(str::to_owned),
                        ancestor_id: None,
                        web_url: Some(format!("mock://display/{space}/{id}")),
                    },
                    space: space.to_owned(),
                    body: PLACEHOLDER_BODY.to_owned(),
                },
            );
        }
        self
    }

    /// Make lookups of `title` fail with a server error.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_failing_lookup(self, title: &str) -> Self {
        self.state
            .write()
            .unwrap()
            .failing_lookups
            .insert(title.to_owned());
        self
    }

    /// Make uploads of `filename` fail with a server error.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_failing_upload(self, filename: &str) -> Self {
        self.state
            .write()
            .unwrap()
            .failing_uploads
            .insert(filename.to_owned());
        self
    }

    /// Simulate another editor saving page `title` right before our next
    /// update of it.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn edit_concurrently(&self, title: &str) {
        self.state
            .write()
            .unwrap()
            .concurrent_edits
            .insert(title.to_owned());
    }

    /// Call counters since creation or the last [`reset_calls`](Self::reset_calls).
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn calls(&self) -> MockCalls {
        self.state.read().unwrap().calls
    }

    /// Reset call counters.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn reset_calls(&self) {
        self.state.write().unwrap().calls = MockCalls::default();
    }

    /// Page with the given title in any space.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn page(&self, title: &str) -> Option<MockPage> {
        self.state
            .read()
            .unwrap()
            .pages
            .values()
            .find(|p| p.page.title == title)
            .cloned()
    }

    /// All pages, ordered by ID (creation order).
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn pages(&self) -> Vec<MockPage> {
        self.state.read().unwrap().pages.values().cloned().collect()
    }

    /// Attachment `filename` on the page titled `page_title`.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn attachment(&self, page_title: &str, filename: &str) -> Option<MockAttachment> {
        let page_id = self.page(page_title)?.page.id;
        self.state
            .read()
            .unwrap()
            .attachments
            .get(&page_id)?
            .get(filename)
            .cloned()
    }
}

impl PageDirectory for MockDirectory {
    fn find_page(&self, title: &str, space: &str) -> Result<Option<RemotePage>, ConfluenceError> {
        let mut state = self.state.write().unwrap();
        state.calls.find += 1;
        if state.failing_lookups.contains(title) {
            return Err(error("GET", "content", 500, "lookup failed"));
        }
        Ok(state.page_by_title(title, space).map(|p| p.page.clone()))
    }

    fn get_page(&self, id: &str) -> Result<RemotePage, ConfluenceError> {
        let mut state = self.state.write().unwrap();
        state.calls.get += 1;
        state
            .pages
            .get(id)
            .map(|p| p.page.clone())
            .ok_or_else(|| error("GET", &format!("content/{id}"), 404, "no such page"))
    }

    fn create_page(
        &self,
        title: &str,
        space: &str,
        ancestor_id: Option<&str>,
    ) -> Result<RemotePage, ConfluenceError> {
        let mut state = self.state.write().unwrap();
        state.calls.create += 1;
        if state.page_by_title(title, space).is_some() {
            return Err(error(
                "POST",
                "content",
                400,
                "A page with this title already exists",
            ));
        }
        if let Some(ancestor) = ancestor_id
            && !state.pages.contains_key(ancestor)
        {
            return Err(error("POST", "content", 404, "no such ancestor"));
        }

        let id = state.allocate_id();
        let page = RemotePage {
            id: id.clone(),
            title: title.to_owned(),
            version: 1,
            fingerprint: None,
            ancestor_id: ancestor_id.map(str::to_owned),
            web_url: Some(format!("mock://display/{space}/{id}")),
        };
        state.pages.insert(
            id,
            MockPage {
                page: page.clone(),
                space: space.to_owned(),
                body: PLACEHOLDER_BODY.to_owned(),
            },
        );
        Ok(page)
    }

    fn update_page(&self, update: &PageUpdate) -> Result<RemotePage, ConfluenceError> {
        let mut state = self.state.write().unwrap();
        state.calls.update += 1;
        let path = format!("content/{}", update.id);

        let Some(title) = state.pages.get(&update.id).map(|p| p.page.title.clone()) else {
            return Err(error("PUT", &path, 404, "no such page"));
        };
        let edited_elsewhere = state.concurrent_edits.remove(&title);

        let Some(stored) = state.pages.get_mut(&update.id) else {
            return Err(error("PUT", &path, 404, "no such page"));
        };
        if edited_elsewhere {
            stored.page.version += 1;
            stored.page.fingerprint = None;
            CONCURRENT_EDIT_BODY.clone_into(&mut stored.body);
        }
        if update.version != stored.page.version + 1 {
            return Err(error(
                "PUT",
                &path,
                409,
                "Version must be incremented on update",
            ));
        }

        stored.page.title.clone_from(&update.title);
        stored.page.version = update.version;
        stored.page.fingerprint = Some(update.comment.clone());
        stored.body.clone_from(&update.body);
        Ok(stored.page.clone())
    }

    fn list_attachments(
        &self,
        page_id: &str,
    ) -> Result<BTreeMap<String, RemoteAttachment>, ConfluenceError> {
        let mut state = self.state.write().unwrap();
        state.calls.list_attachments += 1;
        Ok(state
            .attachments
            .get(page_id)
            .map(|by_name| {
                by_name
                    .iter()
                    .map(|(name, a)| (name.clone(), a.attachment.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    fn upload_attachment(
        &self,
        page_id: &str,
        upload: &AttachmentUpload,
    ) -> Result<RemoteAttachment, ConfluenceError> {
        let mut state = self.state.write().unwrap();
        state.calls.upload += 1;
        let path = format!("content/{page_id}/child/attachment");
        if state.failing_uploads.contains(&upload.filename) {
            return Err(error("POST", &path, 500, "upload failed"));
        }
        if !state.pages.contains_key(page_id) {
            return Err(error("POST", &path, 404, "no such page"));
        }

        let existing = state
            .attachments
            .get(page_id)
            .and_then(|by_name| by_name.get(&upload.filename))
            .map(|a| a.attachment.id.clone());
        let id = match existing {
            Some(id) => id,
            None => format!("att{}", state.allocate_id()),
        };

        let attachment = RemoteAttachment {
            id,
            title: upload.filename.clone(),
            fingerprint: Some(upload.comment.clone()),
            size: Some(upload.data.len() as u64),
        };
        state.attachments.entry(page_id.to_owned()).or_default().insert(
            upload.filename.clone(),
            MockAttachment {
                attachment: attachment.clone(),
                data: upload.data.clone(),
            },
        );
        Ok(attachment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn update(page: &RemotePage, version: u32, body: &str) -> PageUpdate {
        PageUpdate {
            id: page.id.clone(),
            title: page.title.clone(),
            version,
            body: body.to_owned(),
            comment: "fp".to_owned(),
        }
    }

    #[test]
    fn test_create_then_find() {
        let directory = MockDirectory::new();
        let created = directory.create_page("guide", "DOCS", None).unwrap();
        assert_eq!(created.version, 1);
        assert_eq!(created.fingerprint, None);

        let found = directory.find_page("guide", "DOCS").unwrap();
        assert_eq!(found, Some(created));
        assert_eq!(directory.find_page("guide", "OTHER").unwrap(), None);
        assert_eq!(directory.calls().find, 2);
    }

    #[test]
    fn test_create_duplicate_title_fails() {
        let directory = MockDirectory::new().with_page("DOCS", "guide", 1, None);
        let err = directory.create_page("guide", "DOCS", None).unwrap_err();
        assert_eq!(err.status(), Some(400));
    }

    #[test]
    fn test_update_requires_next_version() {
        let directory = MockDirectory::new();
        let page = directory.create_page("guide", "DOCS", None).unwrap();

        let err = directory.update_page(&update(&page, 3, "<p>x</p>")).unwrap_err();
        assert!(err.is_version_conflict());

        let updated = directory.update_page(&update(&page, 2, "<p>x</p>")).unwrap();
        assert_eq!(updated.version, 2);
        assert_eq!(updated.fingerprint.as_deref(), Some("fp"));
        assert_eq!(directory.page("guide").unwrap().body, "<p>x</p>");
    }

    #[test]
    fn test_concurrent_edit_conflicts_once() {
        let directory = MockDirectory::new();
        let page = directory.create_page("guide", "DOCS", None).unwrap();
        directory.edit_concurrently("guide");

        let err = directory.update_page(&update(&page, 2, "<p>mine</p>")).unwrap_err();
        assert!(err.is_version_conflict());
        let stored = directory.page("guide").unwrap();
        assert_eq!(stored.page.version, 2);
        assert_eq!(stored.body, CONCURRENT_EDIT_BODY);

        let updated = directory.update_page(&update(&page, 3, "<p>mine</p>")).unwrap();
        assert_eq!(updated.version, 3);
    }

    #[test]
    fn test_upload_upserts_by_filename() {
        let directory = MockDirectory::new();
        let page = directory.create_page("guide", "DOCS", None).unwrap();
        let upload = |data: &[u8]| AttachmentUpload {
            filename: "logo.png".to_owned(),
            content_type: "image/png".to_owned(),
            data: data.to_vec(),
            comment: format!("{}", data.len()),
            existing_id: None,
        };

        let first = directory.upload_attachment(&page.id, &upload(b"ab")).unwrap();
        let second = directory.upload_attachment(&page.id, &upload(b"abc")).unwrap();
        assert_eq!(first.id, second.id);

        let listed = directory.list_attachments(&page.id).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed["logo.png"].fingerprint.as_deref(), Some("3"));
        assert_eq!(directory.attachment("guide", "logo.png").unwrap().data, b"abc");
        assert_eq!(directory.calls().upload, 2);
    }

    #[test]
    fn test_list_attachments_unknown_page_is_empty() {
        let directory = MockDirectory::new();
        assert!(directory.list_attachments("404").unwrap().is_empty());
    }
}
