//! Browsing a real directory through the service container

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;
use termtree::Tree;

use treeselect::application::services::Outcome;
use treeselect::config::Settings;
use treeselect::domain::{Entry, EntryKind, MaybeDeferred, Selection, Target};
use treeselect::infrastructure::di::ServiceContainer;
use treeselect::infrastructure::traits::TreeSource;
use treeselect::tree_traits::TreeNodeConvert;
use treeselect::util::testing;

#[ctor::ctor]
fn init() {
    testing::init_test_setup();
}

fn fixture() -> TempDir {
    let temp = TempDir::new().unwrap();
    fs::create_dir_all(temp.path().join("src/bin")).unwrap();
    fs::create_dir_all(temp.path().join(".git")).unwrap();
    fs::write(temp.path().join("Cargo.toml"), "").unwrap();
    fs::write(temp.path().join("src/lib.rs"), "").unwrap();
    fs::write(temp.path().join("src/bin/main.rs"), "").unwrap();
    temp
}

fn ready<T: std::fmt::Debug>(value: MaybeDeferred<T>) -> T {
    match value {
        MaybeDeferred::Ready(Ok(v)) => v,
        other => panic!("expected ready value, got {:?}", other),
    }
}

fn kinds(container: &ServiceContainer, entries: &[Entry<PathBuf>]) -> Vec<(EntryKind, String)> {
    entries
        .iter()
        .map(|e| {
            let label = e
                .node()
                .map(|n| container.source.option_label(n))
                .unwrap_or_default();
            (e.kind, label)
        })
        .collect()
}

// ============================================================
// Browse flow
// ============================================================

#[test]
fn given_directory_when_browsing_into_src_and_picking_file_then_value_has_path() {
    // Arrange
    let temp = fixture();
    let container = ServiceContainer::new(Settings::default(), temp.path().to_path_buf());
    let select = container.tree_select();

    // Act + Assert: root level, hidden entries skipped
    let root = select.options().unwrap();
    assert_eq!(
        kinds(&container, &root),
        vec![
            (EntryKind::DownBranch, "src".to_string()),
            (EntryKind::Leaf, "Cargo.toml".to_string()),
        ]
    );

    // descend into src
    let outcome = select.select(&root[0]).unwrap();
    assert!(matches!(outcome, Outcome::Navigated { .. }));
    let at_src = select.options().unwrap();
    assert_eq!(select.entry_label(&at_src[0]), "src");
    assert_eq!(
        kinds(&container, &at_src[1..]),
        vec![
            (EntryKind::DownBranch, "bin".to_string()),
            (EntryKind::Leaf, "lib.rs".to_string()),
        ]
    );

    // narrow down and pick
    select.set_input("lib");
    let narrowed = select.options().unwrap();
    let lib = narrowed.last().cloned().expect("lib.rs listed");
    select.select(&lib).unwrap();

    let lib_path = temp.path().join("src/lib.rs");
    assert_eq!(select.selection(), Selection::Single(Some(Target::Node(lib_path.clone()))));
    let value = select.value().unwrap().expect("resolved");
    let picked = value.single().expect("single value");
    assert_eq!(picked.path, vec![temp.path().join("src")]);
    assert_eq!(select.path_label(picked), "src");
}

#[test]
fn given_selectable_branches_when_listing_then_directory_also_offered_as_value() {
    let temp = fixture();
    let mut settings = Settings::default();
    settings.select.branches_selectable = true;
    let container = ServiceContainer::new(settings, temp.path().to_path_buf());

    let root = ready(container.options().build(None));

    assert_eq!(
        kinds(&container, &root),
        vec![
            (EntryKind::DownBranch, "src".to_string()),
            (EntryKind::Leaf, "src".to_string()),
            (EntryKind::Leaf, "Cargo.toml".to_string()),
        ]
    );
}

#[test]
fn given_nested_file_when_resolving_path_then_ancestors_below_root() {
    let temp = fixture();
    let container = ServiceContainer::new(Settings::default(), temp.path().to_path_buf());

    let path = ready(container.paths().resolve(&temp.path().join("src/bin/main.rs")));

    assert_eq!(path, vec![temp.path().join("src/bin"), temp.path().join("src")]);
}

// ============================================================
// Tree rendering
// ============================================================

#[test]
fn given_depth_two_when_rendering_then_stops_at_second_level() {
    // Arrange
    let temp = fixture();
    let container = ServiceContainer::new(Settings::default(), temp.path().to_path_buf());

    // Act
    let leaves = ready(container.options().to_tree_string(None, 2));
    let rendered = Tree::new("root".to_string()).with_leaves(leaves).to_string();

    // Assert
    assert!(rendered.contains("src/"));
    assert!(rendered.contains("bin/"));
    assert!(rendered.contains("lib.rs"));
    assert!(rendered.contains("Cargo.toml"));
    assert!(!rendered.contains("main.rs"));
    assert!(!rendered.contains(".git"));
}
