use crate::kernel::manifest::{ComponentManifest, ManifestError, MANIFEST_FILE};

use tempfile::tempdir;

#[test]
fn test_load_valid_manifest() {
    let dir = tempdir().expect("Failed to create temporary directory");
    std::fs::write(
        dir.path().join(MANIFEST_FILE),
        r#"
id = "org.example.launcher"
name = "Launcher"
version = "0.3.1"
description = "Quick launcher"
"#,
    )
    .expect("write failed");

    let manifest = ComponentManifest::load(dir.path()).expect("load failed");
    assert_eq!(manifest.id, "org.example.launcher");
    assert_eq!(manifest.name, "Launcher");
    assert_eq!(manifest.version, "0.3.1");
    assert_eq!(manifest.description, "Quick launcher");
}

#[test]
fn test_description_is_optional() {
    let dir = tempdir().expect("Failed to create temporary directory");
    std::fs::write(
        dir.path().join(MANIFEST_FILE),
        "id = \"org.example.app\"\nname = \"App\"\nversion = \"1.0.0\"\n",
    )
    .expect("write failed");

    let manifest = ComponentManifest::load(dir.path()).expect("load failed");
    assert_eq!(manifest.description, "");
}

#[test]
fn test_missing_manifest_fails() {
    let dir = tempdir().expect("Failed to create temporary directory");

    match ComponentManifest::load(dir.path()) {
        Err(ManifestError::Io { path, .. }) => {
            assert!(path.ends_with(MANIFEST_FILE));
        }
        other => panic!("expected Io error, got {other:?}"),
    }
}

#[test]
fn test_malformed_manifest_fails() {
    let dir = tempdir().expect("Failed to create temporary directory");
    std::fs::write(dir.path().join(MANIFEST_FILE), "id = [not toml").expect("write failed");

    assert!(matches!(
        ComponentManifest::load(dir.path()),
        Err(ManifestError::Parse { .. })
    ));
}

#[test]
fn test_validate_rejects_empty_id() {
    let manifest = ComponentManifest::new("  ", "App", "1.0.0");
    assert!(matches!(manifest.validate(), Err(ManifestError::EmptyId)));
}

#[test]
fn test_validate_rejects_bad_version() {
    let manifest = ComponentManifest::new("org.example.app", "App", "not-a-version");
    match manifest.validate() {
        Err(ManifestError::InvalidVersion { version, .. }) => {
            assert_eq!(version, "not-a-version");
        }
        other => panic!("expected InvalidVersion, got {other:?}"),
    }
}
