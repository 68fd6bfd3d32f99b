//! `Authorization` header construction.

use base64::Engine as _;
use base64::prelude::BASE64_STANDARD;
use mdsync_config::ConfluenceAuth;

/// Build the `Authorization` header value for the given credentials.
pub(super) fn authorization_header(auth: &ConfluenceAuth) -> String {
    match auth {
        ConfluenceAuth::Basic { username, password } => {
            let encoded = BASE64_STANDARD.encode(format!("{username}:{password}"));
            format!("Basic {encoded}")
        }
        ConfluenceAuth::Token(token) => format!("Bearer {token}"),
    }
}
