//! Attachment operations for Confluence API.

use std::collections::BTreeMap;

use rand::RngExt;
use tracing::{debug, info};

use super::{ConfluenceClient, check_status};
use crate::directory::{AttachmentUpload, RemoteAttachment};
use crate::error::ConfluenceError;
use crate::types::{Attachment, AttachmentsResponse};

/// Page size for attachment listing.
const PAGE_LIMIT: usize = 100;

impl ConfluenceClient {
    /// List all attachments on a page, following pagination.
    ///
    /// A page that does not exist yet has no attachments.
    pub(crate) fn fetch_attachments(
        &self,
        page_id: &str,
    ) -> Result<BTreeMap<String, RemoteAttachment>, ConfluenceError> {
        info!("Getting attachments for page {}", page_id);

        let mut attachments = BTreeMap::new();
        let mut start = 0;
        loop {
            let url = format!(
                "{}/content/{page_id}/child/attachment?start={start}&limit={PAGE_LIMIT}&expand=metadata",
                self.api_url()
            );

            let response = self
                .agent
                .get(&url)
                .header("Authorization", &self.authorization)
                .header("Accept", "application/json")
                .call()?;

            let page: AttachmentsResponse = match check_status("GET", &url, response) {
                Ok(mut body) => body.read_json()?,
                Err(e) if e.is_not_found() => {
                    debug!("Page {} has no attachment container", page_id);
                    break;
                }
                Err(e) => return Err(e),
            };

            let has_next = page.has_next();
            let count = page.results.len();
            for attachment in page.results {
                let remote = attachment.into_remote();
                attachments.insert(remote.title.clone(), remote);
            }

            if !has_next || count == 0 {
                break;
            }
            start += count;
        }

        Ok(attachments)
    }

    /// Upload or update attachment (upsert by filename).
    pub(crate) fn post_attachment(
        &self,
        page_id: &str,
        upload: &AttachmentUpload,
    ) -> Result<RemoteAttachment, ConfluenceError> {
        let existing_id = match &upload.existing_id {
            Some(id) => Some(id.clone()),
            None => self
                .fetch_attachments(page_id)?
                .remove(&upload.filename)
                .map(|a| a.id),
        };

        let url = if let Some(id) = &existing_id {
            info!(
                "Updating existing attachment '{}' (id={})",
                upload.filename, id
            );
            format!(
                "{}/content/{page_id}/child/attachment/{id}/data",
                self.api_url()
            )
        } else {
            info!(
                "Uploading new attachment '{}' to page {}",
                upload.filename, page_id
            );
            format!("{}/content/{page_id}/child/attachment", self.api_url())
        };

        let boundary = format!("----MdsyncBoundary{:016x}", rand::rng().random::<u64>());
        let body = multipart_body(&boundary, upload);

        let response = self
            .agent
            .post(&url)
            .header("Authorization", &self.authorization)
            .header(
                "Content-Type",
                &format!("multipart/form-data; boundary={boundary}"),
            )
            .header("X-Atlassian-Token", "nocheck")
            .header("Accept", "application/json")
            .send(&body[..])?;

        let mut body_reader = check_status("POST", &url, response)?;

        // Response is a list for new uploads, single object for updates
        let attachment = if existing_id.is_some() {
            body_reader.read_json::<Attachment>()?
        } else {
            let response: AttachmentsResponse = body_reader.read_json()?;
            response.results.into_iter().next().ok_or_else(|| {
                ConfluenceError::UnexpectedResponse {
                    url: url.clone(),
                    message: "empty attachment list".to_owned(),
                }
            })?
        };

        let mut remote = attachment.into_remote();
        if remote.fingerprint.is_none() {
            remote.fingerprint = Some(upload.comment.clone());
        }
        if remote.size.is_none() {
            remote.size = Some(upload.data.len() as u64);
        }
        Ok(remote)
    }
}

/// Encode a `multipart/form-data` body with the file and its comment.
fn multipart_body(boundary: &str, upload: &AttachmentUpload) -> Vec<u8> {
    let mut body = Vec::with_capacity(upload.data.len() + 512);

    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\n",
            escape_filename(&upload.filename)
        )
        .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", upload.content_type).as_bytes());
    body.extend_from_slice(&upload.data);
    body.extend_from_slice(b"\r\n");

    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(b"Content-Disposition: form-data; name=\"comment\"\r\n\r\n");
    body.extend_from_slice(upload.comment.as_bytes());
    body.extend_from_slice(b"\r\n");

    body.extend_from_slice(b"--");
    body.extend_from_slice(boundary.as_bytes());
    body.extend_from_slice(b"--\r\n");
    body
}

/// Percent-encode the characters that would end a quoted `filename` parameter
/// or the header line.
fn escape_filename(name: &str) -> String {
    name.replace('"', "%22")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}
