use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use serde_json::json;
use tempfile::tempdir;
use tokio::time::{sleep, timeout, Duration};

use crate::config::{config_feature_descriptor, ConfigFeature, Configuration, FieldKind, CONFIG_FILE};
use crate::event::{sync_event_handler, EventResult, SharedEventDispatcher};
use crate::feature::{Feature, FeatureId, FeatureRegistry};
use crate::kernel::component::Component;
use crate::kernel::manifest::ComponentManifest;

fn config_component(dir: &std::path::Path) -> Component {
    let mut registry = FeatureRegistry::new();
    registry.register(config_feature_descriptor());
    Component::new(
        ComponentManifest::new("org.example.demo", "Demo", "0.1.0"),
        dir.to_path_buf(),
        registry,
        SharedEventDispatcher::new(),
    )
    .expect("Component::new failed")
}

#[tokio::test]
async fn test_activation_publishes_the_store() {
    let dir = tempdir().expect("Failed to create temporary directory");
    let mut component = config_component(dir.path());

    assert!(component.context().config().is_none());
    component.load_feature(FeatureId::CONFIG).await.expect("load failed");

    let config = component.context().config().expect("store should be published");
    assert_eq!(config.path(), dir.path().join(CONFIG_FILE));
}

#[tokio::test]
async fn test_autosave_round_trip_through_quit() {
    let dir = tempdir().expect("Failed to create temporary directory");
    let mut component = config_component(dir.path());
    component.load_feature(FeatureId::CONFIG).await.expect("load failed");

    let config = component.context().config().expect("store should be published");
    config.declare("opacity", FieldKind::Value, json!(0.85));
    config.set("opacity", json!(0.6)).expect("set failed");

    component.quit().await;

    // Quit autosaved; a fresh load sees the edited value.
    let reloaded = Configuration::load(dir.path()).expect("reload failed");
    assert_eq!(reloaded.get("opacity"), Some(json!(0.6)));
}

#[tokio::test]
async fn test_autosave_disabled_writes_nothing() {
    let dir = tempdir().expect("Failed to create temporary directory");
    let component = config_component(dir.path());

    let mut feature = ConfigFeature::new(Arc::downgrade(component.context()));
    assert!(feature.autosave(), "autosave defaults to on");
    feature.set_autosave(false);

    feature.activate().await.expect("activate failed");
    let config = feature.configuration().expect("store should be loaded");
    config.declare("opacity", FieldKind::Value, json!(0.85));

    feature.finalize().await.expect("finalize failed");
    assert!(!dir.path().join(CONFIG_FILE).exists());
}

#[tokio::test]
async fn test_finalize_twice_is_a_noop() {
    let dir = tempdir().expect("Failed to create temporary directory");
    let component = config_component(dir.path());

    let mut feature = ConfigFeature::new(Arc::downgrade(component.context()));
    feature.activate().await.expect("activate failed");

    feature.finalize().await.expect("first finalize failed");
    let saved_at = std::fs::metadata(dir.path().join(CONFIG_FILE))
        .expect("first finalize should have saved")
        .modified()
        .expect("mtime unavailable");

    feature.finalize().await.expect("second finalize failed");
    let still_at = std::fs::metadata(dir.path().join(CONFIG_FILE))
        .expect("store file should remain")
        .modified()
        .expect("mtime unavailable");
    assert_eq!(saved_at, still_at, "second finalize must not save again");
}

#[tokio::test]
async fn test_field_edits_surface_as_config_change_events() {
    let dir = tempdir().expect("Failed to create temporary directory");
    let mut component = config_component(dir.path());

    let changes = Arc::new(AtomicU32::new(0));
    let changes_clone = Arc::clone(&changes);
    component
        .events()
        .register_handler(
            "config.change",
            sync_event_handler(move |_| {
                changes_clone.fetch_add(1, Ordering::SeqCst);
                EventResult::Continue
            }),
        )
        .await;

    component.load_feature(FeatureId::CONFIG).await.expect("load failed");
    let config = component.context().config().expect("store should be published");
    config.declare("opacity", FieldKind::Value, json!(0.85));
    config.set("opacity", json!(0.3)).expect("set failed");

    let events = component.events().clone();
    timeout(Duration::from_secs(2), async {
        loop {
            events.process_queue().await;
            if changes.load(Ordering::SeqCst) >= 1 {
                break;
            }
            sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("config change event did not arrive in time");
}
