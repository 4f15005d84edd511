use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// File name of the component manifest inside the working directory.
pub const MANIFEST_FILE: &str = "manifest.toml";

/// Identity of a component: the stable application id plus descriptive
/// metadata. Immutable after construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentManifest {
    /// Stable application identity, e.g. `org.example.launcher`. Also keys
    /// the single-instance claim.
    pub id: String,

    /// Human-readable name.
    pub name: String,

    /// Component version, semver.
    pub version: String,

    #[serde(default)]
    pub description: String,
}

impl ComponentManifest {
    pub fn new(id: &str, name: &str, version: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            version: version.to_string(),
            description: String::new(),
        }
    }

    /// Reads and validates `manifest.toml` from `working_dir`.
    pub fn load(working_dir: &Path) -> Result<Self, ManifestError> {
        let path = working_dir.join(MANIFEST_FILE);
        let content = std::fs::read_to_string(&path).map_err(|source| ManifestError::Io {
            path: path.clone(),
            source,
        })?;
        let manifest: ComponentManifest =
            toml::from_str(&content).map_err(|source| ManifestError::Parse { path, source })?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Checks the invariants the rest of the system relies on: a non-empty
    /// id and a parseable semver version.
    pub fn validate(&self) -> Result<(), ManifestError> {
        if self.id.trim().is_empty() {
            return Err(ManifestError::EmptyId);
        }
        semver::Version::parse(&self.version).map_err(|source| ManifestError::InvalidVersion {
            version: self.version.clone(),
            source,
        })?;
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("could not read manifest at '{path}': {source}", path = .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed manifest at '{path}': {source}", path = .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("manifest id must not be empty")]
    EmptyId,

    #[error("manifest version '{version}' is not valid semver: {source}")]
    InvalidVersion {
        version: String,
        #[source]
        source: semver::Error,
    },
}
