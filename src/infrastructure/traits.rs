//! Boundary traits for external collaborators
//!
//! The engine never owns the tree. It asks a [`TreeSource`] for children and
//! parents, narrows candidates with a [`FilterPredicate`], and reports
//! navigation and value changes to [`NavigationEvents`]. Tests plug in
//! mock implementations of each.

use itertools::Itertools;

use crate::config::{FilterConfig, MatchFrom};
use crate::domain::{ChangeReason, CommitDetails, Direction, MaybeDeferred, Node, Selection, Target};

/// Externally owned, lazily walked tree.
///
/// Lookups may answer immediately or later; the engine handles both
/// without the implementation having to pick one mode.
pub trait TreeSource<N: Node> {
    /// Children of `node`, or of the root level when `node` is `None`.
    ///
    /// `None` means `node` is a leaf.
    fn children(&self, node: Option<&N>) -> MaybeDeferred<Option<Vec<N>>>;

    /// Parent of `node`; `None` when `node` is a root.
    fn parent(&self, node: &N) -> MaybeDeferred<Option<N>>;

    /// Explicit branch classification.
    ///
    /// Returning `None` (the default) classifies `node` as a branch iff
    /// [`children`](Self::children) yields a non-empty list.
    fn is_branch(&self, _node: &N) -> Option<MaybeDeferred<bool>> {
        None
    }

    /// Whether a branch is also offered as a selectable leaf.
    fn is_branch_selectable(&self, _node: &N) -> MaybeDeferred<bool> {
        MaybeDeferred::ready(false)
    }

    fn option_label(&self, node: &N) -> String;

    /// Label for an ancestor path (nearest first). `include_self` is set when
    /// `path[0]` is the labelled entry itself rather than its parent.
    fn path_label(&self, path: &[N], _include_self: bool) -> String {
        path.iter().rev().map(|n| self.option_label(n)).join(" / ")
    }

    /// Equivalence override; `None` defers to the built-in rules.
    fn is_equivalent(&self, _a: &Target<N>, _b: &Target<N>) -> Option<bool> {
        None
    }
}

/// Query handed to a filter predicate.
pub struct FilterQuery<'a, N> {
    pub text: &'a str,
    pub label: &'a dyn Fn(&N) -> String,
}

/// Narrows candidate nodes against free text.
pub trait FilterPredicate<N> {
    /// Return the matching subsequence of `candidates`, order preserved.
    fn filter(&self, candidates: Vec<N>, query: &FilterQuery<'_, N>) -> Vec<N>;
}

/// Listener for requested state changes.
///
/// The engine never mutates the selection or input itself; it asks here.
pub trait NavigationEvents<N> {
    fn on_branch_change(&self, _branch: Option<&N>, _direction: Direction) {}

    fn on_value_change(&self, _value: &Selection<N>, _reason: ChangeReason, _details: &CommitDetails<N>) {}

    fn on_input_change(&self, _input: &str) {}

    fn on_close(&self) {}
}

/// Listener that ignores everything.
#[derive(Debug, Default)]
pub struct NoopEvents;

impl<N> NavigationEvents<N> for NoopEvents {}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Substring filter over option labels.
///
/// Optional trimming and case folding, matching anywhere or only at the
/// start of the label, with an optional cap on the number of matches.
#[derive(Debug, Clone, Default)]
pub struct SubstringFilter {
    config: FilterConfig,
}

impl SubstringFilter {
    pub fn new(config: FilterConfig) -> Self {
        Self { config }
    }

    fn normalize(&self, s: &str) -> String {
        let s = if self.config.trim { s.trim() } else { s };
        if self.config.ignore_case {
            s.to_lowercase()
        } else {
            s.to_string()
        }
    }
}

impl<N> FilterPredicate<N> for SubstringFilter {
    fn filter(&self, candidates: Vec<N>, query: &FilterQuery<'_, N>) -> Vec<N> {
        let needle = self.normalize(query.text);
        let limit = self.config.limit.unwrap_or(usize::MAX);
        candidates
            .into_iter()
            .filter(|n| {
                let label = self.normalize(&(query.label)(n));
                match self.config.match_from {
                    MatchFrom::Any => label.contains(&needle),
                    MatchFrom::Start => label.starts_with(&needle),
                }
            })
            .take(limit)
            .collect()
    }
}
