//! Error types for the Confluence REST API.

/// Error from Confluence API operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfluenceError {
    /// HTTP request failed (network error, timeout, etc).
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] ureq::Error),

    /// HTTP response error (server returned error status).
    #[error("HTTP error: {method} {url} returned {status} - {body}")]
    HttpResponse {
        /// HTTP method of the failed request.
        method: &'static str,
        /// Request URL.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Response body (may contain error details).
        body: String,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The server answered successfully but without the expected content.
    #[error("unexpected response from {url}: {message}")]
    UnexpectedResponse {
        /// Request URL.
        url: String,
        /// What was missing.
        message: String,
    },
}

impl ConfluenceError {
    /// HTTP status of a response error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpResponse { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The resource does not exist (404).
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// The write was rejected because the page changed underneath us (409).
    pub fn is_version_conflict(&self) -> bool {
        self.status() == Some(409)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16) -> ConfluenceError {
        ConfluenceError::HttpResponse {
            method: "PUT",
            url: "https://wiki.example.com/rest/api/content/42".to_owned(),
            status,
            body: "{}".to_owned(),
        }
    }

    #[test]
    fn test_status_helpers() {
        assert!(response(409).is_version_conflict());
        assert!(!response(409).is_not_found());
        assert!(response(404).is_not_found());
        assert_eq!(response(500).status(), Some(500));
    }

    #[test]
    fn test_display_includes_request() {
        let msg = response(400).to_string();
        assert!(msg.contains("PUT https://wiki.example.com/rest/api/content/42"));
        assert!(msg.contains("400"));
    }
}
