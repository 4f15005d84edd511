//! Top-level error type aggregating the per-subsystem errors.

use std::result::Result as StdResult;

use thiserror::Error as ThisError;

use crate::config::error::ConfigSystemError;
use crate::feature::error::FeatureSystemError;
use crate::hotkeys::error::HotkeyError;
use crate::instance::error::InstanceError;
use crate::kernel::manifest::ManifestError;

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("feature system error: {0}")]
    FeatureSystem(#[from] FeatureSystemError),

    #[error("single-instance error: {0}")]
    Instance(#[from] InstanceError),

    #[error("configuration error: {0}")]
    ConfigSystem(#[from] ConfigSystemError),

    #[error("hotkey error: {0}")]
    Hotkeys(#[from] HotkeyError),

    #[error("manifest error: {0}")]
    Manifest(#[from] ManifestError),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

/// Shorthand for `Result` with our [`Error`] type.
pub type Result<T> = StdResult<T, Error>;

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Other(msg.to_string())
    }
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Other(msg)
    }
}
