//! Attachment synchronization for one page.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use tracing::info;

use super::assets::AssetReference;
use super::error::PublishError;
use super::result::AttachmentStats;
use crate::directory::{AttachmentUpload, PageDirectory};
use crate::fingerprint::ContentFingerprint;

/// Uploads referenced images whose content changed.
pub struct AttachmentSync<'a> {
    directory: &'a dyn PageDirectory,
}

impl<'a> AttachmentSync<'a> {
    pub fn new(directory: &'a dyn PageDirectory) -> Self {
        Self { directory }
    }

    /// Bring the page's attachments in line with `assets`.
    ///
    /// Asset paths resolve against `document_dir`. Attachments that are not
    /// referenced are left on the page.
    pub fn sync(
        &self,
        page_id: &str,
        document_dir: &Path,
        assets: &BTreeMap<String, AssetReference>,
    ) -> Result<AttachmentStats, PublishError> {
        let mut stats = AttachmentStats::default();
        if assets.is_empty() {
            return Ok(stats);
        }

        let remote = self
            .directory
            .list_attachments(page_id)
            .map_err(|source| PublishError::RemoteLookup {
                operation: format!("list attachments of page {page_id}"),
                source,
            })?;

        for (name, asset) in assets {
            let path = document_dir.join(&asset.path);
            let data = fs::read(&path).map_err(|source| PublishError::LocalIo {
                path: path.clone(),
                source,
            })?;
            let fingerprint = ContentFingerprint::of(&data);
            let existing = remote.get(name);

            if existing.is_some_and(|a| fingerprint.matches(a.fingerprint.as_deref())) {
                info!("Attachment '{}' unchanged, skipping", name);
                stats.unchanged += 1;
                continue;
            }

            let upload = AttachmentUpload {
                filename: name.clone(),
                content_type: content_type(name).to_owned(),
                data,
                comment: fingerprint.into(),
                existing_id: existing.map(|a| a.id.clone()),
            };
            self.directory
                .upload_attachment(page_id, &upload)
                .map_err(|source| PublishError::RemoteWrite {
                    operation: format!("upload attachment '{name}'"),
                    source,
                })?;
            stats.uploaded += 1;
        }

        Ok(stats)
    }
}

/// MIME type guessed from the file extension.
fn content_type(filename: &str) -> &'static str {
    let ext = Path::new(filename)
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "pdf" => "application/pdf",
        _ => "application/octet-stream",
    }
}
