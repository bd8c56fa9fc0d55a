/*
Rendering lives in a trait so the builder stays free of terminal concerns.
 */
use std::collections::HashSet;
use std::rc::Rc;

use termtree::Tree;
use tracing::instrument;

use crate::application::services::OptionBuilder;
use crate::domain::{EntryKind, MaybeDeferred, Node};

pub trait TreeNodeConvert<N> {
    /// Subtrees below `branch`, descending at most `depth` levels.
    fn to_tree_string(&self, branch: Option<&N>, depth: usize) -> MaybeDeferred<Vec<Tree<String>>>;
}

impl<N: Node> TreeNodeConvert<N> for OptionBuilder<N> {
    #[instrument(level = "debug", skip(self))]
    fn to_tree_string(&self, branch: Option<&N>, depth: usize) -> MaybeDeferred<Vec<Tree<String>>> {
        if depth == 0 {
            return MaybeDeferred::ready(Vec::new());
        }
        let this = self.clone();
        self.build(branch).and_then(move |entries| {
            let source = Rc::clone(this.source());
            let mut branches = HashSet::new();
            let mut subtrees = Vec::new();
            for entry in entries {
                let Some(node) = entry.node().cloned() else {
                    continue;
                };
                match entry.kind {
                    EntryKind::UpBranch => {}
                    EntryKind::DownBranch => {
                        let label = format!("{}/", source.option_label(&node));
                        subtrees.push(
                            this.to_tree_string(Some(&node), depth - 1)
                                .map(move |leaves| Tree::new(label).with_leaves(leaves)),
                        );
                        branches.insert(node);
                    }
                    // selectable branches are already shown
                    EntryKind::Leaf if branches.contains(&node) => {}
                    EntryKind::Leaf => subtrees.push(MaybeDeferred::ready(Tree::new(source.option_label(&node)))),
                }
            }
            MaybeDeferred::join_all(subtrees)
        })
    }
}
