use std::fmt;

use generational_arena::{Arena, Index};
use itertools::Itertools;
use tracing::instrument;

use crate::domain::MaybeDeferred;
use crate::infrastructure::traits::TreeSource;

/// Tree node in the arena-based hierarchy structure.
#[derive(Debug)]
pub struct TreeNode<T> {
    /// Payload shown as the option label
    pub data: T,
    /// Index of parent node in the arena, None for root nodes
    pub parent: Option<Index>,
    /// Indices of child nodes in the arena
    pub children: Vec<Index>,
}

/// Arena-based in-memory tree, usable as a synchronous [`TreeSource`].
///
/// Uses generational arena for memory-safe node references and O(1) lookups.
/// Several roots are allowed; they form the root level of the source.
#[derive(Debug)]
pub struct ArenaTree<T> {
    /// Arena storage for all tree nodes
    arena: Arena<TreeNode<T>>,
    /// Root nodes in insertion order
    roots: Vec<Index>,
    /// Branches that may also be picked as values
    selectable_branches: bool,
    separator: String,
}

impl<T> Default for ArenaTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ArenaTree<T> {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            roots: Vec::new(),
            selectable_branches: false,
            separator: " / ".to_string(),
        }
    }

    pub fn with_selectable_branches(mut self, selectable: bool) -> Self {
        self.selectable_branches = selectable;
        self
    }

    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    #[instrument(level = "trace", skip(self, data))]
    pub fn insert_node(&mut self, data: T, parent: Option<Index>) -> Index {
        let node = TreeNode {
            data,
            parent,
            children: Vec::new(),
        };
        let node_idx = self.arena.insert(node);

        match parent.and_then(|p| self.arena.get_mut(p)) {
            Some(parent) => parent.children.push(node_idx),
            None => self.roots.push(node_idx),
        }

        node_idx
    }

    pub fn get_node(&self, idx: Index) -> Option<&TreeNode<T>> {
        self.arena.get(idx)
    }

    pub fn roots(&self) -> &[Index] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Depth of the deepest root-to-leaf chain.
    pub fn depth(&self) -> usize {
        self.roots
            .iter()
            .map(|&r| self.calculate_depth(r))
            .max()
            .unwrap_or(0)
    }

    fn calculate_depth(&self, node_idx: Index) -> usize {
        if let Some(node) = self.get_node(node_idx) {
            1 + node
                .children
                .iter()
                .map(|&child| self.calculate_depth(child))
                .max()
                .unwrap_or(0)
        } else {
            0
        }
    }
}

impl<T: PartialEq> ArenaTree<T> {
    /// First node (depth-first, roots in order) whose payload equals `data`.
    pub fn find(&self, data: &T) -> Option<Index> {
        let mut stack: Vec<Index> = self.roots.iter().rev().copied().collect();
        while let Some(idx) = stack.pop() {
            let node = self.arena.get(idx)?;
            if &node.data == data {
                return Some(idx);
            }
            stack.extend(node.children.iter().rev());
        }
        None
    }
}

impl<T: fmt::Display> TreeSource<Index> for ArenaTree<T> {
    fn children(&self, node: Option<&Index>) -> MaybeDeferred<Option<Vec<Index>>> {
        let children = match node {
            None => Some(self.roots.clone()),
            Some(idx) => self
                .arena
                .get(*idx)
                .filter(|n| !n.children.is_empty())
                .map(|n| n.children.clone()),
        };
        MaybeDeferred::ready(children)
    }

    fn parent(&self, node: &Index) -> MaybeDeferred<Option<Index>> {
        MaybeDeferred::ready(self.arena.get(*node).and_then(|n| n.parent))
    }

    fn is_branch_selectable(&self, _node: &Index) -> MaybeDeferred<bool> {
        MaybeDeferred::ready(self.selectable_branches)
    }

    fn option_label(&self, node: &Index) -> String {
        self.arena
            .get(*node)
            .map(|n| n.data.to_string())
            .unwrap_or_default()
    }

    fn path_label(&self, path: &[Index], _include_self: bool) -> String {
        path.iter()
            .rev()
            .map(|n| self.option_label(n))
            .join(&self.separator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_nested_inserts_when_building_then_links_parent_and_children() {
        let mut tree = ArenaTree::new();
        let a = tree.insert_node("A", None);
        let b = tree.insert_node("B", Some(a));
        let c = tree.insert_node("C", Some(a));
        let d = tree.insert_node("D", Some(b));

        assert_eq!(tree.roots(), &[a]);
        assert_eq!(tree.get_node(a).unwrap().children, vec![b, c]);
        assert_eq!(tree.get_node(d).unwrap().parent, Some(b));
        assert_eq!(tree.depth(), 3);
        assert_eq!(tree.find(&"D"), Some(d));
        assert_eq!(tree.find(&"Z"), None);
    }

    #[test]
    fn given_leaf_when_listing_children_then_none() {
        let mut tree = ArenaTree::new();
        let a = tree.insert_node("A", None);

        match tree.children(Some(&a)) {
            MaybeDeferred::Ready(Ok(children)) => assert_eq!(children, None),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn given_path_when_labelling_then_root_first_with_separator() {
        let mut tree = ArenaTree::new().with_separator(" > ");
        let a = tree.insert_node("A", None);
        let b = tree.insert_node("B", Some(a));

        assert_eq!(tree.path_label(&[b, a], true), "A > B");
    }
}
