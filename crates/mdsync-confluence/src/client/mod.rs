//! Confluence REST API client.
//!
//! Provides sync HTTP client for Confluence Server/Data Center REST API
//! with basic or bearer token authentication.

mod attachments;
mod auth;
mod pages;

use std::time::Duration;

use mdsync_config::ConfluenceAuth;
use ureq::Agent;
use ureq::http::Response;

use crate::error::ConfluenceError;

/// Default HTTP timeout in seconds.
const DEFAULT_TIMEOUT: u64 = 30;

/// Confluence REST API client.
pub struct ConfluenceClient {
    agent: Agent,
    base_url: String,
    authorization: String,
}

impl ConfluenceClient {
    /// Create client for a Confluence server.
    ///
    /// # Arguments
    /// * `base_url` - Confluence server base URL
    /// * `auth` - Credentials sent with every request
    #[must_use]
    pub fn new(base_url: &str, auth: &ConfluenceAuth) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(DEFAULT_TIMEOUT)))
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_owned(),
            authorization: auth::authorization_header(auth),
        }
    }

    /// Server base URL without trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the API base URL.
    fn api_url(&self) -> String {
        format!("{}/rest/api", self.base_url)
    }
}

/// Turn an error status into [`ConfluenceError::HttpResponse`], otherwise hand
/// back the body for decoding.
fn check_status(
    method: &'static str,
    url: &str,
    response: Response<ureq::Body>,
) -> Result<ureq::Body, ConfluenceError> {
    let status = response.status().as_u16();
    let mut body = response.into_body();

    if status >= 400 {
        let error_body = body
            .read_to_string()
            .unwrap_or_else(|_| "(unable to read error body)".to_owned());
        return Err(ConfluenceError::HttpResponse {
            method,
            url: url.to_owned(),
            status,
            body: error_body,
        });
    }

    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_trims_trailing_slash() {
        let client = ConfluenceClient::new(
            "https://wiki.example.com/",
            &ConfluenceAuth::Token("secret".to_owned()),
        );
        assert_eq!(client.base_url(), "https://wiki.example.com");
        assert_eq!(client.api_url(), "https://wiki.example.com/rest/api");
    }
}
