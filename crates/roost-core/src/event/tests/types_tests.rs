use crate::event::{Event, SystemEvent};
use crate::feature::FeatureId;

#[test]
fn test_system_event_names() {
    assert_eq!(SystemEvent::ComponentStart.name(), "component.start");
    assert_eq!(SystemEvent::ComponentShutdown.name(), "component.shutdown");
    assert_eq!(
        SystemEvent::FeatureActivated { id: FeatureId::CONFIG }.name(),
        "feature.activated"
    );
    assert_eq!(
        SystemEvent::ActivationRequested.name(),
        "instance.activation-requested"
    );
    assert_eq!(
        SystemEvent::HotkeyActivated { action: "toggle".to_string() }.name(),
        "hotkeys.activated"
    );
    assert_eq!(
        SystemEvent::ConfigChange {
            key: "opacity".to_string(),
            value: serde_json::json!(0.8),
        }
        .name(),
        "config.change"
    );
}

#[test]
fn test_system_event_clone_preserves_payload() {
    let event = SystemEvent::HotkeyActivated {
        action: "toggle-window".to_string(),
    };
    let cloned = event.clone_event();

    let downcast = cloned
        .as_any()
        .downcast_ref::<SystemEvent>()
        .expect("clone should downcast to SystemEvent");
    match downcast {
        SystemEvent::HotkeyActivated { action } => assert_eq!(action, "toggle-window"),
        other => panic!("unexpected variant after clone: {other:?}"),
    }
}
