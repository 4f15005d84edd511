//! Error types for the single-instance claim mechanism.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum InstanceError {
    #[error("could not probe instance socket '{path}': {source}", path = .path.display())]
    Probe {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not claim instance socket '{path}': {source}", path = .path.display())]
    Claim {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not forward activation to the running instance: {source}")]
    Forward {
        #[source]
        source: std::io::Error,
    },

    #[error("could not release instance socket '{path}': {source}", path = .path.display())]
    Release {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not encode instance request: {0}")]
    Encode(#[from] serde_json::Error),
}
