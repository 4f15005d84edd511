use std::collections::HashMap;

use crate::feature::error::FeatureSystemError;
use crate::feature::{FeatureDescriptor, FeatureId};

/// Registry mapping capability identifiers to their descriptors.
///
/// Populated once at process startup, before the component is constructed,
/// and passed into [`Component::new`] explicitly; there is no ambient global
/// registry. Registration order carries no meaning.
///
/// [`Component::new`]: crate::kernel::component::Component::new
#[derive(Debug, Default)]
pub struct FeatureRegistry {
    descriptors: HashMap<FeatureId, FeatureDescriptor>,
}

impl FeatureRegistry {
    pub fn new() -> Self {
        Self {
            descriptors: HashMap::new(),
        }
    }

    /// A registry pre-populated with the builtin capabilities
    /// ([`FeatureId::CONFIG`] and [`FeatureId::HOTKEYS`]).
    pub fn with_builtin_features() -> Self {
        let mut registry = Self::new();
        registry.register(crate::config::config_feature_descriptor());
        registry.register(crate::hotkeys::hotkey_feature_descriptor());
        registry
    }

    /// Stores a descriptor under its identifier.
    ///
    /// A collision overwrites the previous registration (last writer wins)
    /// and is reported as a warning; duplicate identifiers usually indicate
    /// a packaging defect.
    pub fn register(&mut self, descriptor: FeatureDescriptor) {
        let id = descriptor.id();
        if self.descriptors.insert(id, descriptor).is_some() {
            log::warn!("feature '{id}' registered more than once; keeping the newer registration");
        }
    }

    /// Looks up the descriptor for `id`.
    pub fn resolve(&self, id: FeatureId) -> Result<&FeatureDescriptor, FeatureSystemError> {
        self.descriptors
            .get(&id)
            .ok_or(FeatureSystemError::NoSuchFeature(id))
    }

    pub fn contains(&self, id: FeatureId) -> bool {
        self.descriptors.contains_key(&id)
    }

    /// Identifiers of all registered capabilities, in no particular order.
    pub fn ids(&self) -> Vec<FeatureId> {
        self.descriptors.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}
