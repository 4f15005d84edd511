//! # Kernel
//!
//! The `kernel` module owns the component lifecycle: identity, feature
//! activation and teardown, and the cooperative main loop.
//!
//! ## Key responsibilities & components:
//!
//! - **Component lifecycle**: [`Component`](component::Component) resolves
//!   and activates capabilities on demand and finalizes them deterministically
//!   on shutdown.
//! - **Identity**: [`ComponentManifest`](manifest::ComponentManifest), loaded
//!   from `manifest.toml` in the working directory.
//! - **Main loop**: [`MainLoop`](main_loop::MainLoop), the run-until-stopped
//!   primitive behind [`Component::run`](component::Component::run).
//! - **Error handling**: the top-level [`Error`](error::Error) and `Result`
//!   alias in the `error` submodule.

pub mod component;
pub mod error;
pub mod main_loop;
pub mod manifest;

pub use component::{Component, ComponentContext};
pub use error::{Error, Result};
pub use main_loop::MainLoop;
pub use manifest::ComponentManifest;

#[cfg(test)]
mod tests;
