//! Integration tests for the path layout lifecycle.
//!
//! These tests drive a layout through the public API only: build it from
//! templates, assess a fresh sandbox, generate, and assess again.  Every test
//! resolves paths under its own temporary directory.

use std::fs;

use appcontext_core::pathspec::templates;
use appcontext_core::{
    Discrepancy, Layout, LayoutError, Location, PathEntry, PathResolver, XdgDirs,
};
use tempfile::TempDir;

fn layout_in(tmp: &TempDir, entries: Vec<PathEntry>) -> Layout {
    Layout::new("lifecycle", entries)
        .expect("template entries must be valid")
        .with_resolver(PathResolver::new(XdgDirs::rooted_at(tmp.path())))
}

fn full_layout(tmp: &TempDir) -> Layout {
    layout_in(
        tmp,
        vec![
            templates::config_file().with_name("config.toml"),
            templates::json_storage().with_name("records.json"),
            templates::process_state().with_name("workers"),
            templates::projects().with_name("projects"),
            templates::log_file().with_name("lifecycle.log"),
            templates::stats().with_name("stats.json"),
            templates::backup_storage().with_name("snapshots"),
            templates::upload_cache().with_name("incoming"),
            templates::export_dir().with_name("reports"),
        ],
    )
}

#[test]
fn test_missing_mandatory_config_is_the_only_discrepancy_until_generated() {
    // Arrange
    let tmp = TempDir::new().unwrap();
    let layout = layout_in(&tmp, vec![templates::config_file().with_name("config.toml")]);

    // Act
    let before = layout.assess();

    // Assert
    assert_eq!(before.len(), 1);
    assert!(matches!(
        before.discrepancies[0],
        Discrepancy::MissingMandatory { .. }
    ));
    assert!(before.messages()[0].starts_with("mandatory path does not exist"));
    assert!(matches!(
        before.status(),
        Err(LayoutError::Assessment { count: 1 })
    ));

    layout.generate().unwrap();
    let after = layout.assess();

    assert!(after.messages().is_empty());
    assert!(after.status().is_ok());
}

#[test]
fn test_full_layout_generates_cleanly_and_assesses_clean() {
    let tmp = TempDir::new().unwrap();
    let layout = full_layout(&tmp);

    layout.generate().unwrap();

    let assessment = layout.assess();
    assert!(assessment.is_clean(), "unexpected: {:?}", assessment.messages());
    for entry in layout.all_entries() {
        match layout.location(entry).unwrap() {
            Location::File(path) => assert!(path.is_file(), "{} missing", path.display()),
            Location::Dir(path) => assert!(path.is_dir(), "{} missing", path.display()),
        }
    }
}

#[test]
fn test_second_generate_succeeds_and_preserves_files() {
    let tmp = TempDir::new().unwrap();
    let layout = full_layout(&tmp);
    layout.generate().unwrap();

    let config = layout
        .location(layout.find("config.toml").unwrap())
        .unwrap()
        .into_path_buf();
    fs::write(&config, "name = \"kept\"\n").unwrap();

    layout.generate().unwrap();

    assert_eq!(fs::read_to_string(&config).unwrap(), "name = \"kept\"\n");
    assert!(layout.assess().is_clean());
}

#[test]
fn test_exported_manifest_generates_the_same_tree() {
    let tmp = TempDir::new().unwrap();
    let manifest = tmp.path().join("manifest").join("layout.json");
    full_layout(&tmp).export(&manifest).unwrap();

    let imported = Layout::import(&manifest)
        .unwrap()
        .with_resolver(PathResolver::new(XdgDirs::rooted_at(tmp.path())));
    imported.generate().unwrap();

    assert!(tmp.path().join("config/lifecycle/config.toml").is_file());
    assert!(tmp.path().join("data/lifecycle/storage/records.json").is_file());
    assert!(tmp.path().join("cache/lifecycle/cache/incoming").is_dir());
    assert!(tmp.path().join("state/lifecycle/logs/lifecycle.log").is_file());
    assert!(full_layout(&tmp).assess().is_clean());
}
