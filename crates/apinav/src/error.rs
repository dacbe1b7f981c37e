//! CLI error types.

use std::path::PathBuf;

use apinav_config::ConfigError;
use apinav_site::PageWriteError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("Cannot read {}: {source}", path.display())]
    ReadInput {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid documentation data in {}: {source}", path.display())]
    ParseInput {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("{0}")]
    Write(#[from] PageWriteError),
}
