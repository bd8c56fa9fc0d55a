//! Option list assembly for the active branch
//!
//! Produces one `UpBranch` entry when a branch is active, then the branch's
//! children in lookup order. A child classified as a branch yields a
//! `DownBranch` entry, immediately followed by a `Leaf` entry for the same
//! node when the branch is also selectable. Every other child yields one
//! `Leaf` entry.

use std::rc::Rc;

use tracing::{debug, instrument};

use crate::application::services::path::PathResolver;
use crate::domain::{Entry, MaybeDeferred, Node, Target};
use crate::infrastructure::traits::TreeSource;

/// Branch/selectable classification of one child.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub is_branch: bool,
    pub selectable: bool,
}

pub struct OptionBuilder<N: Node> {
    source: Rc<dyn TreeSource<N>>,
    paths: PathResolver<N>,
}

impl<N: Node> Clone for OptionBuilder<N> {
    fn clone(&self) -> Self {
        Self {
            source: Rc::clone(&self.source),
            paths: self.paths.clone(),
        }
    }
}

impl<N: Node> OptionBuilder<N> {
    pub fn new(source: Rc<dyn TreeSource<N>>) -> Self {
        let paths = PathResolver::new(Rc::clone(&source));
        Self { source, paths }
    }

    pub fn source(&self) -> &Rc<dyn TreeSource<N>> {
        &self.source
    }

    /// Entries for `branch` (`None` is the root level).
    ///
    /// The branch path and the children are fetched concurrently, then all
    /// children are classified concurrently. Any failed lookup fails the
    /// whole list.
    #[instrument(level = "debug", skip(self))]
    pub fn build(&self, branch: Option<&N>) -> MaybeDeferred<Vec<Entry<N>>> {
        let branch = branch.cloned();
        let ancestors = match &branch {
            Some(b) => self.paths.resolve(b),
            None => MaybeDeferred::ready(Vec::new()),
        };
        let children = self.source.children(branch.as_ref());

        let this = self.clone();
        ancestors.join(children).and_then(move |(ancestors, children)| {
            let children = children.unwrap_or_default();
            debug!("build: {:?} has {} children", branch, children.len());

            let classifications = MaybeDeferred::join_all(children.iter().map(|c| this.classify(c)));
            classifications.map(move |classes| assemble(branch, ancestors, children, classes))
        })
    }

    /// Classify one child: branch-ness first, then selectability of branches.
    pub fn classify(&self, node: &N) -> MaybeDeferred<Classification> {
        let context = format!("classify {:?}", node);
        let is_branch = match self.source.is_branch(node) {
            Some(explicit) => explicit,
            None => self
                .source
                .children(Some(node))
                .map(|children| children.is_some_and(|c| !c.is_empty())),
        };

        let source = Rc::clone(&self.source);
        let node = node.clone();
        is_branch
            .and_then(move |is_branch| {
                if !is_branch {
                    return MaybeDeferred::ready(Classification {
                        is_branch,
                        selectable: false,
                    });
                }
                source.is_branch_selectable(&node).map(move |selectable| Classification {
                    is_branch,
                    selectable,
                })
            })
            .map_err(move |e| e.into_classification(context))
    }
}

fn assemble<N: Node>(
    branch: Option<N>,
    ancestors: Vec<N>,
    children: Vec<N>,
    classes: Vec<Classification>,
) -> Vec<Entry<N>> {
    let mut entries = Vec::with_capacity(children.len() + 1);

    let listing_path = match branch {
        Some(b) => {
            let mut path = Vec::with_capacity(ancestors.len() + 1);
            path.push(b.clone());
            path.extend(ancestors.iter().cloned());
            entries.push(Entry::up_branch(b, ancestors));
            path
        }
        None => Vec::new(),
    };

    for (child, class) in children.into_iter().zip(classes) {
        if class.is_branch {
            entries.push(Entry::down_branch(child.clone(), listing_path.clone()));
            if class.selectable {
                entries.push(Entry::leaf(Target::Node(child), listing_path.clone()));
            }
        } else {
            entries.push(Entry::leaf(Target::Node(child), listing_path.clone()));
        }
    }

    entries
}
