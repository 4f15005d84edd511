//! # Feature System
//!
//! Features are optional, named capabilities attached to a [`Component`]
//! (configuration persistence, global hotkeys). Each capability is described
//! by a [`FeatureDescriptor`] carrying its identifier, its dependency list
//! and a constructor; descriptors live in a [`FeatureRegistry`] that is
//! populated before the component is built and read-only afterwards.
//!
//! Dependencies are declared on the descriptor rather than on the instance
//! so the component can activate them *before* the dependent feature is
//! constructed: constructors routinely read state a dependency just
//! established (the hotkey feature reads the configuration feature's loaded
//! fields).
//!
//! [`Component`]: crate::kernel::component::Component

pub mod error;
pub mod registry;

use std::any::Any;
use std::fmt;
use std::sync::Weak;

use async_trait::async_trait;

use crate::feature::error::FeatureSystemError;
use crate::kernel::component::ComponentContext;

/// Typed capability identifier.
///
/// Identifiers are interned `&'static str` names; the builtin capabilities
/// are exposed as associated constants so call sites never pass raw strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FeatureId(&'static str);

impl FeatureId {
    /// Configuration persistence.
    pub const CONFIG: FeatureId = FeatureId("config");
    /// Global hotkey registration through the remote broker.
    pub const HOTKEYS: FeatureId = FeatureId("hotkeys");

    pub const fn new(name: &'static str) -> Self {
        FeatureId(name)
    }

    pub const fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Core trait implemented by every capability.
///
/// Instances move through `constructed -> active -> finalized`; the owning
/// component calls `activate` exactly once after construction and `finalize`
/// at most once during shutdown. Implementations hold their back-reference
/// to the owner as a `Weak<ComponentContext>` and must tolerate a failed
/// upgrade instead of assuming the component is still alive.
#[async_trait]
pub trait Feature: Send + Sync {
    /// The capability identifier this instance implements.
    fn id(&self) -> FeatureId;

    /// Bring the capability up. Dependencies are already active.
    async fn activate(&mut self) -> Result<(), FeatureSystemError>;

    /// Tear the capability down. Invoked at most once; the default is a
    /// no-op.
    async fn finalize(&mut self) -> Result<(), FeatureSystemError> {
        Ok(())
    }

    /// Cast to `Any` for downcasting to the concrete feature type.
    fn as_any(&self) -> &dyn Any;
}

impl<'a> fmt::Debug for dyn Feature + 'a {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Feature").field("id", &self.id()).finish()
    }
}

/// Constructor stored in a descriptor. Receives the non-owning back-reference
/// to the component that is activating the feature.
pub type FeatureConstructor = Box<dyn Fn(Weak<ComponentContext>) -> Box<dyn Feature> + Send + Sync>;

/// Static description of a capability: identifier, dependencies, constructor.
pub struct FeatureDescriptor {
    id: FeatureId,
    dependencies: Vec<FeatureId>,
    constructor: FeatureConstructor,
}

impl FeatureDescriptor {
    pub fn new<F>(id: FeatureId, dependencies: impl Into<Vec<FeatureId>>, constructor: F) -> Self
    where
        F: Fn(Weak<ComponentContext>) -> Box<dyn Feature> + Send + Sync + 'static,
    {
        Self {
            id,
            dependencies: dependencies.into(),
            constructor: Box::new(constructor),
        }
    }

    pub fn id(&self) -> FeatureId {
        self.id
    }

    /// Capability identifiers that must be active before construction, in
    /// declaration order.
    pub fn dependencies(&self) -> &[FeatureId] {
        &self.dependencies
    }

    pub(crate) fn construct(&self, owner: Weak<ComponentContext>) -> Box<dyn Feature> {
        (self.constructor)(owner)
    }
}

impl fmt::Debug for FeatureDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeatureDescriptor")
            .field("id", &self.id)
            .field("dependencies", &self.dependencies)
            .finish_non_exhaustive()
    }
}

pub use registry::FeatureRegistry;
