//! Domain entities: core data structures

use std::fmt;
use std::hash::Hash;

use crate::domain::error::{DomainError, DomainResult};

/// Bound for caller-supplied node identities.
///
/// Nodes are opaque to the engine; equality is identity unless a tree
/// source supplies its own equivalence.
pub trait Node: Clone + Eq + Hash + fmt::Debug + 'static {}

impl<T: Clone + Eq + Hash + fmt::Debug + 'static> Node for T {}

/// Literal user input that is not backed by a tree node.
///
/// Always a leaf. `branch` is the branch that was active when the text was
/// entered; it stands in for the parent a real node would have.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FreeText<N> {
    pub text: String,
    pub branch: Option<N>,
}

impl<N> FreeText<N> {
    pub fn new(text: impl Into<String>, branch: Option<N>) -> Self {
        Self {
            text: text.into(),
            branch,
        }
    }
}

/// The thing an entry points at: a real node or free text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Target<N> {
    Node(N),
    FreeText(FreeText<N>),
}

impl<N> Target<N> {
    pub fn node(&self) -> Option<&N> {
        match self {
            Self::Node(n) => Some(n),
            Self::FreeText(_) => None,
        }
    }

    pub fn free_text(&self) -> Option<&FreeText<N>> {
        match self {
            Self::Node(_) => None,
            Self::FreeText(ft) => Some(ft),
        }
    }

    pub fn is_free_text(&self) -> bool {
        matches!(self, Self::FreeText(_))
    }
}

impl<N> From<FreeText<N>> for Target<N> {
    fn from(ft: FreeText<N>) -> Self {
        Self::FreeText(ft)
    }
}

/// Role an entry plays in the flattened option list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntryKind {
    /// Navigate to the parent of the active branch.
    UpBranch,
    /// Navigate into a child branch.
    DownBranch,
    /// A selectable value.
    Leaf,
}

impl EntryKind {
    pub fn is_branch(self) -> bool {
        !matches!(self, Self::Leaf)
    }
}

/// An option in the flattened list, annotated with its ancestor path.
///
/// `path` is nearest ancestor first, root last. For `UpBranch` it is the
/// chain above the branch itself; for `Leaf` and `DownBranch` it is the
/// chain of the branch the entry was listed under, that branch included.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Entry<N> {
    pub target: Target<N>,
    pub kind: EntryKind,
    pub path: Vec<N>,
}

impl<N> Entry<N> {
    pub fn leaf(target: Target<N>, path: Vec<N>) -> Self {
        Self {
            target,
            kind: EntryKind::Leaf,
            path,
        }
    }

    pub fn down_branch(node: N, path: Vec<N>) -> Self {
        Self {
            target: Target::Node(node),
            kind: EntryKind::DownBranch,
            path,
        }
    }

    pub fn up_branch(node: N, path: Vec<N>) -> Self {
        Self {
            target: Target::Node(node),
            kind: EntryKind::UpBranch,
            path,
        }
    }

    pub fn node(&self) -> Option<&N> {
        self.target.node()
    }

    pub fn is_branch(&self) -> bool {
        self.kind.is_branch()
    }

    pub fn is_free_text(&self) -> bool {
        self.target.is_free_text()
    }

    /// Unwrap to the raw target handed to value-change listeners.
    pub fn into_target(self) -> Target<N> {
        self.target
    }
}

impl<N: PartialEq + fmt::Debug> Entry<N> {
    /// Free text is always a leaf listed under the branch it carries.
    pub fn check_shape(&self) -> DomainResult<()> {
        let Target::FreeText(ft) = &self.target else {
            return Ok(());
        };
        if self.kind != EntryKind::Leaf {
            return Err(DomainError::ConsistencyViolation(format!(
                "free text {:?} listed as {:?}",
                ft.text, self.kind
            )));
        }
        if self.path.first() != ft.branch.as_ref() {
            return Err(DomainError::ConsistencyViolation(format!(
                "free text {:?} carries branch {:?} but is listed under {:?}",
                ft.text,
                ft.branch,
                self.path.first()
            )));
        }
        Ok(())
    }
}

/// Which way a branch change went.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Up => f.write_str("up"),
            Self::Down => f.write_str("down"),
        }
    }
}

/// Why a value change was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeReason {
    Select,
    Create,
    Blur,
    Remove,
    Clear,
}

impl fmt::Display for ChangeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Select => "select",
            Self::Create => "create",
            Self::Blur => "blur",
            Self::Remove => "remove",
            Self::Clear => "clear",
        };
        f.write_str(s)
    }
}

/// Extra context handed to value-change listeners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitDetails<N> {
    /// The raw option that triggered the change, never the entry wrapper.
    pub option: Option<Target<N>>,
    /// Set when the change was re-dispatched from a blur.
    pub from_blur: bool,
}

/// Externally held selection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selection<N> {
    Single(Option<Target<N>>),
    Multiple(Vec<Target<N>>),
}

impl<N> Selection<N> {
    pub fn empty(multiple: bool) -> Self {
        if multiple {
            Self::Multiple(Vec::new())
        } else {
            Self::Single(None)
        }
    }

    pub fn is_multiple(&self) -> bool {
        matches!(self, Self::Multiple(_))
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Single(v) => v.is_none(),
            Self::Multiple(v) => v.is_empty(),
        }
    }

    pub fn targets(&self) -> Vec<&Target<N>> {
        match self {
            Self::Single(v) => v.iter().collect(),
            Self::Multiple(v) => v.iter().collect(),
        }
    }
}

/// A selection with every target resolved to a path-annotated leaf entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedValue<N> {
    Single(Option<Entry<N>>),
    Multiple(Vec<Entry<N>>),
}

impl<N> ResolvedValue<N> {
    pub fn entries(&self) -> Vec<&Entry<N>> {
        match self {
            Self::Single(v) => v.iter().collect(),
            Self::Multiple(v) => v.iter().collect(),
        }
    }

    pub fn single(&self) -> Option<&Entry<N>> {
        match self {
            Self::Single(v) => v.as_ref(),
            Self::Multiple(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_entry_kinds_when_checking_branch_then_only_leaf_is_not() {
        assert!(EntryKind::UpBranch.is_branch());
        assert!(EntryKind::DownBranch.is_branch());
        assert!(!EntryKind::Leaf.is_branch());
    }

    #[test]
    fn given_free_text_entries_when_checking_shape_then_branch_must_match_listing() {
        let at_branch = Entry::leaf(Target::FreeText(FreeText::new("x", Some(1u8))), vec![1, 0]);
        let at_root = Entry::leaf(Target::FreeText(FreeText::<u8>::new("x", None)), vec![]);
        let misplaced = Entry::leaf(Target::FreeText(FreeText::new("x", Some(1u8))), vec![2]);
        let as_branch = Entry {
            kind: EntryKind::DownBranch,
            ..at_branch.clone()
        };

        assert!(at_branch.check_shape().is_ok());
        assert!(at_root.check_shape().is_ok());
        assert!(Entry::down_branch(3u8, vec![]).check_shape().is_ok());
        assert!(matches!(misplaced.check_shape(), Err(DomainError::ConsistencyViolation(_))));
        assert!(matches!(as_branch.check_shape(), Err(DomainError::ConsistencyViolation(_))));
    }

    #[test]
    fn given_selection_modes_when_empty_then_matches_mode() {
        assert_eq!(Selection::<u8>::empty(false), Selection::Single(None));
        assert_eq!(Selection::<u8>::empty(true), Selection::Multiple(vec![]));
        assert!(Selection::<u8>::empty(true).is_empty());
        assert!(!Selection::Single(Some(Target::Node(1u8))).is_empty());
    }
}
