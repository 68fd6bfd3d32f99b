//! Content fingerprints used for change detection.
//!
//! Page markup and attachment bytes are hashed the same way; the hex digest
//! is stored verbatim in the page version comment or attachment comment.

use std::fmt;

use sha2::{Digest, Sha256};

/// Lowercase hex SHA-256 digest of a payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentFingerprint(String);

impl ContentFingerprint {
    /// Fingerprint the given bytes.
    pub fn of(payload: impl AsRef<[u8]>) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(payload.as_ref());
        Self(hex::encode(hasher.finalize()))
    }

    /// Hex digest.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether a stored comment records this exact fingerprint.
    pub fn matches(&self, stored: Option<&str>) -> bool {
        stored.is_some_and(|s| s == self.0)
    }
}

impl fmt::Display for ContentFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<ContentFingerprint> for String {
    fn from(fingerprint: ContentFingerprint) -> Self {
        fingerprint.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_digest() {
        assert_eq!(
            ContentFingerprint::of("abc").as_str(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_empty_payload() {
        assert_eq!(
            ContentFingerprint::of(b"").to_string(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_one_byte_change_differs() {
        assert_ne!(
            ContentFingerprint::of("<p>a</p>"),
            ContentFingerprint::of("<p>b</p>")
        );
    }

    #[test]
    fn test_matches() {
        let fp = ContentFingerprint::of("body");
        assert!(fp.matches(Some(fp.as_str())));
        assert!(!fp.matches(None));
        assert!(!fp.matches(Some("stale")));
    }
}
