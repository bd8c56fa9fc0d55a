//! Tests for ValueResolver

mod common;

use std::rc::Rc;

use common::{drive, ready, MapTree, Mode, N};
use treeselect::application::services::{OptionBuilder, ValueResolver};
use treeselect::domain::{Entry, EntryKind, FreeText, ResolvedValue, Selection, Target};
use treeselect::infrastructure::traits::TreeSource;

fn deep(mode: Mode) -> Rc<MapTree> {
    // R -> [X, L1], X -> [Y, L2], Y -> [L3]
    Rc::new(
        MapTree::new(mode)
            .with_children(None, &["R"])
            .with_children(Some("R"), &["X", "L1"])
            .with_children(Some("X"), &["Y", "L2"])
            .with_children(Some("Y"), &["L3"]),
    )
}

fn values(tree: &Rc<MapTree>) -> ValueResolver<N> {
    let source: Rc<dyn TreeSource<N>> = tree.clone();
    ValueResolver::new(source)
}

#[test]
fn given_empty_selection_when_resolving_then_empty_per_mode() {
    let tree = deep(Mode::Gated);
    let resolver = values(&tree);

    assert_eq!(ready(resolver.resolve(&Selection::Single(None))), ResolvedValue::Single(None));
    assert_eq!(ready(resolver.resolve(&Selection::Multiple(vec![]))), ResolvedValue::Multiple(vec![]));
    assert!(tree.calls().is_empty());
}

#[test]
fn given_single_node_when_resolving_then_leaf_with_ancestors() {
    let tree = deep(Mode::Sync);

    let value = ready(values(&tree).resolve(&Selection::Single(Some(Target::Node("L3")))));

    assert_eq!(
        value,
        ResolvedValue::Single(Some(Entry::leaf(Target::Node("L3"), vec!["Y", "X", "R"])))
    );
}

#[test]
fn given_multiple_gated_nodes_when_resolving_then_input_order_kept() {
    // Arrange
    let tree = deep(Mode::Gated);
    let selection = Selection::Multiple(vec![
        Target::Node("L3"),
        Target::Node("L1"),
        Target::FreeText(FreeText::new("typed", Some("X"))),
    ]);

    // Act
    let value = values(&tree).resolve(&selection);

    // Assert: every path walk starts before any finishes
    assert!(value.is_deferred());
    let mut pending = tree.pending();
    pending.sort();
    assert_eq!(pending, vec!["parent:L1", "parent:L3", "parent:X"]);

    let entries = match drive(&tree, value).unwrap() {
        ResolvedValue::Multiple(entries) => entries,
        other => panic!("unexpected {:?}", other),
    };
    let paths: Vec<Vec<N>> = entries.iter().map(|e| e.path.clone()).collect();
    assert_eq!(paths, vec![vec!["Y", "X", "R"], vec!["R"], vec!["X", "R"]]);
    assert!(entries.iter().all(|e| e.kind == EntryKind::Leaf));
    assert!(entries[2].is_free_text());
}

#[test]
fn given_one_failing_path_when_resolving_multiple_then_whole_value_fails() {
    let tree = Rc::new(
        MapTree::new(Mode::Gated)
            .with_children(Some("R"), &["A", "B"])
            .with_failure("parent:R"),
    );
    let selection = Selection::Multiple(vec![Target::Node("A"), Target::Node("B")]);

    let err = drive(&tree, values(&tree).resolve(&selection)).unwrap_err();

    assert!(err.is_lookup());
}

#[test]
fn given_committed_leaf_when_resolving_value_then_path_round_trips() {
    // Arrange: the entry as listed under Y
    let tree = deep(Mode::Lazy);
    let source: Rc<dyn TreeSource<N>> = tree.clone();
    let listed = drive(&tree, OptionBuilder::new(source).build(Some(&"Y"))).unwrap();
    let picked = listed
        .iter()
        .find(|e| e.kind == EntryKind::Leaf)
        .cloned()
        .expect("L3 listed");

    // Act
    let selection = Selection::Single(Some(picked.target.clone()));
    let value = drive(&tree, values(&tree).resolve(&selection)).unwrap();

    // Assert
    assert_eq!(value.single().map(|e| &e.path), Some(&picked.path));
}
