use std::any::Any;

use crate::event::Event;
use crate::feature::FeatureId;

/// System events emitted by the core lifecycle machinery.
#[derive(Debug, Clone)]
pub enum SystemEvent {
    /// Component is entering its main loop.
    ComponentStart,
    /// Component is shutting down; features have been finalized.
    ComponentShutdown,
    /// A feature finished activating.
    FeatureActivated { id: FeatureId },
    /// A secondary process forwarded its activation to this primary.
    ActivationRequested,
    /// The hotkey broker reported a hotkey press.
    HotkeyActivated { action: String },
    /// A configuration field changed value.
    ConfigChange { key: String, value: serde_json::Value },
}

impl Event for SystemEvent {
    fn name(&self) -> &'static str {
        match self {
            SystemEvent::ComponentStart => "component.start",
            SystemEvent::ComponentShutdown => "component.shutdown",
            SystemEvent::FeatureActivated { .. } => "feature.activated",
            SystemEvent::ActivationRequested => "instance.activation-requested",
            SystemEvent::HotkeyActivated { .. } => "hotkeys.activated",
            SystemEvent::ConfigChange { .. } => "config.change",
        }
    }

    fn clone_event(&self) -> Box<dyn Event> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
