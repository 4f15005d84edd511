//! Local event dispatch for a component.
//!
//! Events are queued onto a FIFO and drained by the component's main loop,
//! so every handler runs on the loop that owns the component state. Remote
//! notifications (hotkey activations, activation requests from a secondary
//! process) are re-emitted here instead of being handled on their I/O tasks.

pub mod dispatcher;
pub mod types;

use std::any::Any;
use std::fmt;

use async_trait::async_trait;

/// Type for event handler identifiers.
pub type EventId = u64;

/// Result of event processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResult {
    /// Event was processed and propagation should continue.
    Continue,
    /// Event was processed and propagation should stop.
    Stop,
}

/// Core event trait.
pub trait Event: Any + fmt::Debug + Send + Sync {
    /// Stable name of this event, used for name-keyed handler lookup.
    fn name(&self) -> &'static str;

    /// Clone this event.
    fn clone_event(&self) -> Box<dyn Event>;

    /// Cast to `Any` for downcasting.
    fn as_any(&self) -> &dyn Any;
}

/// Asynchronous event handler trait.
#[async_trait]
pub trait AsyncEventHandler: Send + Sync {
    async fn handle(&self, event: &dyn Event) -> EventResult;
}

pub use dispatcher::{
    sync_event_handler, sync_typed_handler, EventDispatcher, SharedEventDispatcher,
};
pub use types::SystemEvent;

#[cfg(test)]
mod tests;
