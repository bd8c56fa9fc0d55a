//! Selection value resolution
//!
//! Maps the externally held selection onto path-annotated leaf entries,
//! independent of whichever branch is currently listed.

use std::rc::Rc;

use tracing::{debug, instrument};

use crate::application::services::path::PathResolver;
use crate::domain::{Entry, MaybeDeferred, Node, ResolvedValue, Selection, Target};
use crate::infrastructure::traits::TreeSource;

pub struct ValueResolver<N: Node> {
    paths: PathResolver<N>,
}

impl<N: Node> ValueResolver<N> {
    pub fn new(source: Rc<dyn TreeSource<N>>) -> Self {
        Self {
            paths: PathResolver::new(source),
        }
    }

    /// Resolve every held target. Multiple targets resolve concurrently and
    /// keep their input order.
    #[instrument(level = "debug", skip(self))]
    pub fn resolve(&self, selection: &Selection<N>) -> MaybeDeferred<ResolvedValue<N>> {
        match selection {
            Selection::Single(None) => MaybeDeferred::ready(ResolvedValue::Single(None)),
            Selection::Single(Some(target)) => self
                .resolve_target(target)
                .map(|entry| ResolvedValue::Single(Some(entry))),
            Selection::Multiple(targets) => {
                debug!("resolve: {} targets", targets.len());
                MaybeDeferred::join_all(targets.iter().map(|t| self.resolve_target(t)))
                    .map(ResolvedValue::Multiple)
            }
        }
    }

    pub fn resolve_target(&self, target: &Target<N>) -> MaybeDeferred<Entry<N>> {
        let owned = target.clone();
        self.paths
            .resolve_target(target)
            .map(move |path| Entry::leaf(owned, path))
    }
}
