//! Page operations for Confluence API.

use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use serde_json::json;
use tracing::info;

use super::{ConfluenceClient, check_status};
use crate::directory::{PLACEHOLDER_BODY, PageUpdate, RemotePage};
use crate::error::ConfluenceError;
use crate::types::{Page, PageList};

/// Fields expanded on every page read.
const PAGE_EXPAND: &str = "version,ancestors";

impl ConfluenceClient {
    /// Find a page by exact title within a space.
    pub(crate) fn search_page(
        &self,
        title: &str,
        space: &str,
    ) -> Result<Option<RemotePage>, ConfluenceError> {
        let url = format!(
            "{}/content?type=page&spaceKey={}&title={}&expand={PAGE_EXPAND}",
            self.api_url(),
            utf8_percent_encode(space, NON_ALPHANUMERIC),
            utf8_percent_encode(title, NON_ALPHANUMERIC),
        );

        info!("Looking up page '{}' in space {}", title, space);

        let response = self
            .agent
            .get(&url)
            .header("Authorization", &self.authorization)
            .header("Accept", "application/json")
            .call()?;

        let list: PageList = check_status("GET", &url, response)?.read_json()?;
        Ok(list
            .results
            .into_iter()
            .find(|page| page.title == title)
            .map(|page| page.into_remote(&self.base_url)))
    }

    /// Get page by ID with version and ancestors.
    pub(crate) fn fetch_page(&self, page_id: &str) -> Result<RemotePage, ConfluenceError> {
        let url = format!("{}/content/{page_id}?expand={PAGE_EXPAND}", self.api_url());

        info!("Getting page {}", page_id);

        let response = self
            .agent
            .get(&url)
            .header("Authorization", &self.authorization)
            .header("Accept", "application/json")
            .call()?;

        let page: Page = check_status("GET", &url, response)?.read_json()?;
        Ok(page.into_remote(&self.base_url))
    }

    /// Create a page holding the placeholder body.
    pub(crate) fn post_page(
        &self,
        title: &str,
        space: &str,
        ancestor_id: Option<&str>,
    ) -> Result<RemotePage, ConfluenceError> {
        let url = format!("{}/content", self.api_url());

        let mut payload = json!({
            "type": "page",
            "title": title,
            "space": {"key": space},
            "body": {
                "storage": {
                    "value": PLACEHOLDER_BODY,
                    "representation": "storage"
                }
            }
        });
        if let Some(id) = ancestor_id {
            payload["ancestors"] = json!([{"id": id}]);
        }

        info!(
            "Creating page '{}' in space {} (parent: {})",
            title,
            space,
            ancestor_id.unwrap_or("none")
        );

        let payload_bytes = serde_json::to_vec(&payload)?;

        let response = self
            .agent
            .post(&url)
            .header("Authorization", &self.authorization)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .send(&payload_bytes[..])?;

        let page: Page = check_status("POST", &url, response)?.read_json()?;
        let mut remote = page.into_remote(&self.base_url);
        if remote.ancestor_id.is_none() {
            remote.ancestor_id = ancestor_id.map(str::to_owned);
        }
        Ok(remote)
    }

    /// Replace page body, bumping the version to `update.version`.
    pub(crate) fn put_page(&self, update: &PageUpdate) -> Result<RemotePage, ConfluenceError> {
        let url = format!("{}/content/{}", self.api_url(), update.id);

        let payload = json!({
            "id": update.id,
            "type": "page",
            "title": update.title,
            "body": {
                "storage": {
                    "value": update.body,
                    "representation": "storage"
                }
            },
            "version": {
                "number": update.version,
                "minorEdit": true,
                "message": update.comment
            }
        });

        info!(
            "Updating page {} to version {}",
            update.id, update.version
        );

        let payload_bytes = serde_json::to_vec(&payload)?;

        let response = self
            .agent
            .put(&url)
            .header("Authorization", &self.authorization)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .send(&payload_bytes[..])?;

        let page: Page = check_status("PUT", &url, response)?.read_json()?;
        Ok(page.into_remote(&self.base_url))
    }
}
