//! Ancestor path resolution
//!
//! Walks `parent` lookups upwards through the trampoline, so an all-synchronous
//! source yields an all-synchronous path.

use std::collections::HashSet;
use std::rc::Rc;

use tracing::{debug, instrument, trace};

use crate::domain::{run, DomainError, DomainResult, FreeText, MaybeDeferred, Node, Step, Steps, Target};
use crate::infrastructure::traits::TreeSource;

/// Resolves ancestor chains, nearest ancestor first, root last.
pub struct PathResolver<N: Node> {
    source: Rc<dyn TreeSource<N>>,
}

impl<N: Node> Clone for PathResolver<N> {
    fn clone(&self) -> Self {
        Self {
            source: Rc::clone(&self.source),
        }
    }
}

impl<N: Node> PathResolver<N> {
    pub fn new(source: Rc<dyn TreeSource<N>>) -> Self {
        Self { source }
    }

    /// Ancestors of `node`, excluding `node` itself.
    ///
    /// Empty when `node` is a root. A parent chain that revisits a node
    /// fails with [`DomainError::CycleDetected`].
    #[instrument(level = "debug", skip(self))]
    pub fn resolve(&self, node: &N) -> MaybeDeferred<Vec<N>> {
        run(ParentWalk {
            source: Rc::clone(&self.source),
            start: node.clone(),
            current: node.clone(),
            path: Vec::new(),
            seen: HashSet::from([node.clone()]),
        })
    }

    /// Path for a selection target.
    ///
    /// Free text has no discoverable parent; its carried branch is used
    /// instead, giving the same path a leaf listed under that branch has.
    pub fn resolve_target(&self, target: &Target<N>) -> MaybeDeferred<Vec<N>> {
        match target {
            Target::Node(node) => self.resolve(node),
            Target::FreeText(FreeText { branch, .. }) => self.resolve_listing(branch.as_ref()),
        }
    }

    /// Path carried by entries listed under `branch`: the branch itself
    /// followed by its ancestors. Empty at the root level.
    pub fn resolve_listing(&self, branch: Option<&N>) -> MaybeDeferred<Vec<N>> {
        match branch {
            None => MaybeDeferred::ready(Vec::new()),
            Some(b) => {
                let b = b.clone();
                self.resolve(&b).map(move |ancestors| {
                    let mut path = Vec::with_capacity(ancestors.len() + 1);
                    path.push(b);
                    path.extend(ancestors);
                    path
                })
            }
        }
    }
}

/// Step machine: one `parent` lookup per step until the root is reached.
struct ParentWalk<N: Node> {
    source: Rc<dyn TreeSource<N>>,
    start: N,
    current: N,
    path: Vec<N>,
    seen: HashSet<N>,
}

impl<N: Node> Steps for ParentWalk<N> {
    type Input = Option<N>;
    type Output = Vec<N>;

    fn step(&mut self, input: Option<Option<N>>) -> DomainResult<Step<Option<N>, Vec<N>>> {
        match input {
            None => Ok(Step::Await(self.source.parent(&self.current))),
            Some(None) => {
                debug!("resolve: {:?} has {} ancestors", self.start, self.path.len());
                Ok(Step::Done(std::mem::take(&mut self.path)))
            }
            Some(Some(parent)) => {
                if !self.seen.insert(parent.clone()) {
                    return Err(DomainError::CycleDetected {
                        node: format!("{:?}", self.start),
                        depth: self.path.len(),
                    });
                }
                trace!("resolve: {:?} -> {:?}", self.current, parent);
                self.path.push(parent.clone());
                self.current = parent;
                Ok(Step::Await(self.source.parent(&self.current)))
            }
        }
    }
}
