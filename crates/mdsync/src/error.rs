//! CLI error types.

use mdsync_config::ConfigError;
use mdsync_confluence::PublishError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Publish(#[from] PublishError),

    #[error("{0} document(s) failed to publish")]
    Incomplete(usize),
}
