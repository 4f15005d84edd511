//! # roost-core
//!
//! Lifecycle and capability composition for long-running desktop-agent
//! processes. A [`Component`] carries a stable identity, enforces a
//! single-running-instance guarantee, activates optional capabilities
//! ("features") in dependency order and tears them down deterministically,
//! exactly once, when the process quits.

pub mod config;
pub mod event;
pub mod feature;
pub mod hotkeys;
pub mod instance;
pub mod ipc;
pub mod kernel;

// Re-export key public types for the binary and for embedders.
pub use event::{Event, EventResult, SharedEventDispatcher, SystemEvent};
pub use feature::{Feature, FeatureDescriptor, FeatureId, FeatureRegistry};
pub use instance::{claim, InstanceClaim, InstanceRole, SingleInstanceGuard};
pub use kernel::error::{Error, Result};
pub use kernel::{Component, ComponentContext, ComponentManifest, MainLoop};
