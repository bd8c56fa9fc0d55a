//! Integration tests for Settings config loading.
//!
//! Merge semantics: every layer REPLACES the values it specifies and leaves
//! the rest untouched.
//!
//! Note: These tests run against temp directories only, so they effectively
//! test the local config layered over compiled defaults.

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

use treeselect::config::{local_config_path, MatchFrom, Settings};
use treeselect::util::testing;

#[ctor::ctor]
fn init() {
    testing::init_test_setup();
}

// ============================================================
// Settings::load() local config tests
// ============================================================

#[test]
fn given_no_local_config_when_load_then_defaults() {
    // Arrange
    let dir = TempDir::new().unwrap();

    // Act
    let settings = Settings::load(Some(dir.path())).expect("load settings");

    // Assert
    assert!(!settings.select.multiple);
    assert!(!settings.select.free_solo);
    assert!(settings.filter.ignore_case);
    assert_eq!(settings.filter.match_from, MatchFrom::Any);
    assert_eq!(settings.tree.path_separator, " / ");
}

#[test]
fn given_partial_local_config_when_load_then_only_given_keys_replaced() {
    // Arrange: local config sets two keys in different sections
    let dir = TempDir::new().unwrap();
    let local = r#"
[select]
multiple = true

[filter]
match_from = "start"
limit = 5
"#;
    fs::write(local_config_path(dir.path()), local).unwrap();

    // Act
    let settings = Settings::load(Some(dir.path())).expect("load settings");

    // Assert: given keys replaced, siblings keep their defaults
    assert!(settings.select.multiple);
    assert!(!settings.select.free_solo);
    assert_eq!(settings.filter.match_from, MatchFrom::Start);
    assert_eq!(settings.filter.limit, Some(5));
    assert!(settings.filter.trim);
}

#[test]
fn given_root_with_tilde_when_load_then_expanded() {
    let dir = TempDir::new().unwrap();
    fs::write(
        local_config_path(dir.path()),
        "[tree]\nroot = \"~/projects\"\n",
    )
    .unwrap();

    let settings = Settings::load(Some(dir.path())).expect("load settings");

    let root = settings.tree.root.expect("root set");
    assert!(!root.to_string_lossy().starts_with('~'));
    assert!(root.ends_with("projects"));
}

#[test]
fn given_malformed_local_config_when_load_then_config_error() {
    let dir = TempDir::new().unwrap();
    fs::write(local_config_path(dir.path()), "[select\nmultiple = ").unwrap();

    let err = Settings::load(Some(dir.path())).unwrap_err();

    assert!(err.to_string().starts_with("config error: parse"));
}

#[test]
fn given_invalid_match_from_when_load_then_rejected() {
    let dir = TempDir::new().unwrap();
    fs::write(local_config_path(dir.path()), "[filter]\nmatch_from = \"middle\"\n").unwrap();

    assert!(Settings::load(Some(dir.path())).is_err());
}

// ============================================================
// Serialization
// ============================================================

#[test]
fn given_settings_when_to_toml_then_reloads_to_same_values() {
    // Arrange
    let dir = TempDir::new().unwrap();
    let mut settings = Settings::default();
    settings.select.free_solo = true;
    settings.tree.root = Some(PathBuf::from("/srv/data"));

    // Act: write the rendered settings back as a local config
    fs::write(local_config_path(dir.path()), settings.to_toml().unwrap()).unwrap();
    let reloaded = Settings::load(Some(dir.path())).expect("load settings");

    // Assert
    assert_eq!(reloaded.select, settings.select);
    assert_eq!(reloaded.tree.root, settings.tree.root);
}

#[test]
fn given_template_when_parsed_then_all_sections_present_and_valid() {
    let template = Settings::template();

    let value: toml::Value = toml::from_str(&template).expect("template parses");

    for section in ["select", "filter", "tree"] {
        assert!(value.get(section).is_some(), "missing [{section}]");
    }
}
