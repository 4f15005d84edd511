//! # Configuration persistence
//!
//! A component's settings live in a flat store of named fields persisted as
//! JSON in the working directory. Fields carry a kind next to their value so
//! other capabilities can recognize what they hold — the hotkey feature
//! scans for [`FieldKind::Hotkey`] fields and mirrors their bindings to the
//! remote broker.
//!
//! Edits go through [`Configuration::set`], which broadcasts a
//! [`FieldChange`] to every subscriber; subscribers run on the component
//! loop, never concurrently with it.

pub mod error;
pub mod feature;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::config::error::ConfigSystemError;

/// File name of the persisted field store inside the working directory.
pub const CONFIG_FILE: &str = "config.json";

/// Capacity of the change-notification channel.
const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// What a configuration field holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldKind {
    /// A plain value with no special meaning to the core.
    Value,
    /// A hotkey binding mirrored to the broker under `action`.
    Hotkey { action: String },
}

/// One named field: its kind and its current value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigField {
    #[serde(flatten)]
    pub kind: FieldKind,
    pub value: serde_json::Value,
}

/// Broadcast payload for a field edit.
#[derive(Debug, Clone)]
pub struct FieldChange {
    pub name: String,
    pub value: serde_json::Value,
}

/// The persisted field store.
///
/// Owned by the configuration feature and shared as `Arc<Configuration>`
/// through the component context. Mutation happens only from loop-driven
/// callbacks; the mutex guards the brief read/write sections, not
/// concurrent writers.
#[derive(Debug)]
pub struct Configuration {
    path: PathBuf,
    fields: Mutex<HashMap<String, ConfigField>>,
    changes: broadcast::Sender<FieldChange>,
}

impl Configuration {
    /// Poison-tolerant lock: a panic elsewhere must not wedge teardown paths
    /// (autosave runs during finalize).
    fn lock_fields(&self) -> std::sync::MutexGuard<'_, HashMap<String, ConfigField>> {
        self.fields.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Loads the store from `working_dir`, starting empty when no file has
    /// been persisted yet.
    pub fn load(working_dir: &Path) -> Result<Self, ConfigSystemError> {
        let path = working_dir.join(CONFIG_FILE);
        let fields = if path.exists() {
            let content =
                std::fs::read_to_string(&path).map_err(|source| ConfigSystemError::Io {
                    operation: "read".to_string(),
                    path: path.clone(),
                    source,
                })?;
            serde_json::from_str(&content).map_err(|source| ConfigSystemError::Deserialize {
                path: path.clone(),
                source,
            })?
        } else {
            HashMap::new()
        };

        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Ok(Self {
            path,
            fields: Mutex::new(fields),
            changes,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Registers a field. The kind always follows the declaration; a value
    /// already loaded from disk is kept, otherwise `default` applies.
    pub fn declare(&self, name: &str, kind: FieldKind, default: serde_json::Value) {
        let mut fields = self.lock_fields();
        match fields.get_mut(name) {
            Some(field) => field.kind = kind,
            None => {
                fields.insert(
                    name.to_string(),
                    ConfigField {
                        kind,
                        value: default,
                    },
                );
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<serde_json::Value> {
        let fields = self.lock_fields();
        fields.get(name).map(|field| field.value.clone())
    }

    pub fn kind_of(&self, name: &str) -> Option<FieldKind> {
        let fields = self.lock_fields();
        fields.get(name).map(|field| field.kind.clone())
    }

    /// Updates a declared field and notifies subscribers. Writing the value
    /// a field already holds is not a change and stays silent.
    pub fn set(&self, name: &str, value: serde_json::Value) -> Result<(), ConfigSystemError> {
        {
            let mut fields = self.lock_fields();
            let field = fields
                .get_mut(name)
                .ok_or_else(|| ConfigSystemError::UnknownField(name.to_string()))?;
            if field.value == value {
                return Ok(());
            }
            field.value = value.clone();
        }
        let _ = self.changes.send(FieldChange {
            name: name.to_string(),
            value,
        });
        Ok(())
    }

    /// Subscribes to field edits.
    pub fn subscribe(&self) -> broadcast::Receiver<FieldChange> {
        self.changes.subscribe()
    }

    /// Snapshot of every field.
    pub fn fields(&self) -> HashMap<String, ConfigField> {
        self.lock_fields().clone()
    }

    /// The hotkey-kind fields: `(field name, action, current binding)`.
    pub fn hotkey_fields(&self) -> Vec<(String, String, serde_json::Value)> {
        let fields = self.lock_fields();
        fields
            .iter()
            .filter_map(|(name, field)| match &field.kind {
                FieldKind::Hotkey { action } => {
                    Some((name.clone(), action.clone(), field.value.clone()))
                }
                FieldKind::Value => None,
            })
            .collect()
    }

    /// Persists the whole store back to the working directory.
    pub fn save(&self) -> Result<(), ConfigSystemError> {
        let snapshot = self.fields();
        let content =
            serde_json::to_string_pretty(&snapshot).map_err(ConfigSystemError::Serialize)?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ConfigSystemError::Io {
                operation: "create directory".to_string(),
                path: parent.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(&self.path, content).map_err(|source| ConfigSystemError::Io {
            operation: "write".to_string(),
            path: self.path.clone(),
            source,
        })
    }
}

pub use feature::{config_feature_descriptor, ConfigFeature};

#[cfg(test)]
mod tests;
