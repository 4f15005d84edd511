//! Error types for configuration persistence.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigSystemError {
    #[error("I/O error during '{operation}' on '{path}': {source}", path = .path.display())]
    Io {
        operation: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not serialize configuration: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("malformed configuration at '{path}': {source}", path = .path.display())]
    Deserialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("unknown configuration field: '{0}'")]
    UnknownField(String),
}
