//! Two-tier option filtering
//!
//! The text predicate only ever sees tree-backed nodes. The ascend entry and
//! free-text entries are structural and always survive.

use std::collections::HashSet;

use itertools::Itertools;
use tracing::{debug, trace};

use crate::domain::{is_equivalent, Entry, EntryKind, Node, Target};
use crate::infrastructure::traits::{FilterPredicate, FilterQuery, TreeSource};

/// Input the filter runs against.
#[derive(Debug)]
pub struct FilterState<'a, N> {
    /// Current raw input text
    pub input: &'a str,
    /// Resolved single-mode selection, if any
    pub selected: Option<&'a Entry<N>>,
}

/// Narrow `entries` against the current input.
///
/// Output order: the `UpBranch` entry, matching `DownBranch` entries,
/// matching `Leaf` entries, then every free-text entry. Within each group
/// the incoming order is kept.
///
/// When the selected value's label already equals the input but the value
/// is not among `entries` (the branch moved on), the list is returned
/// untouched so the displayed selection does not vanish.
pub fn filter_entries<N: Node>(
    entries: Vec<Entry<N>>,
    state: &FilterState<'_, N>,
    source: &dyn TreeSource<N>,
    predicate: &dyn FilterPredicate<N>,
) -> Vec<Entry<N>> {
    if let Some(selected) = state.selected {
        if target_label(source, &selected.target) == state.input && !contains(&entries, selected, source) {
            debug!("filter: selection label equals input but is not listed, bypassing");
            return entries;
        }
    }

    let mut up = None;
    let mut down = Vec::new();
    let mut leaves = Vec::new();
    let mut free = Vec::new();
    for entry in entries {
        match (&entry.kind, &entry.target) {
            (_, Target::FreeText(_)) => free.push(entry),
            (EntryKind::UpBranch, _) => {
                if up.is_none() {
                    up = Some(entry);
                }
            }
            (EntryKind::DownBranch, _) => down.push(entry),
            (EntryKind::Leaf, _) => leaves.push(entry),
        }
    }

    let candidates: Vec<N> = down
        .iter()
        .chain(leaves.iter())
        .filter_map(|e| e.node().cloned())
        .unique()
        .collect();
    let label = |n: &N| source.option_label(n);
    let query = FilterQuery {
        text: state.input,
        label: &label,
    };
    let matched: HashSet<N> = predicate.filter(candidates, &query).into_iter().collect();
    trace!("filter: {} nodes matched {:?}", matched.len(), state.input);

    let keep = |e: &Entry<N>| e.node().is_some_and(|n| matched.contains(n));
    up.into_iter()
        .chain(down.into_iter().filter(keep))
        .chain(leaves.into_iter().filter(keep))
        .chain(free)
        .collect()
}

fn target_label<N: Node>(source: &dyn TreeSource<N>, target: &Target<N>) -> String {
    match target {
        Target::Node(n) => source.option_label(n),
        Target::FreeText(ft) => ft.text.clone(),
    }
}

fn contains<N: Node>(entries: &[Entry<N>], wanted: &Entry<N>, source: &dyn TreeSource<N>) -> bool {
    let override_fn = |a: &Target<N>, b: &Target<N>| source.is_equivalent(a, b);
    entries
        .iter()
        .any(|e| is_equivalent(e, wanted, Some(&override_fn)))
}
