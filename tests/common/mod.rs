//! Shared fixtures for integration tests
//!
//! `MapTree` is a hash-map backed tree source whose lookups can answer
//! immediately, lazily, or only when a test releases them. `Recorder`
//! captures every navigation callback.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use futures::channel::oneshot;
use futures::FutureExt;

use treeselect::application::services::TreeSelect;
use treeselect::domain::{
    ChangeReason, CommitDetails, Direction, DomainError, DomainResult, MaybeDeferred, Selection, Target,
};
use treeselect::infrastructure::traits::{NavigationEvents, TreeSource};
use treeselect::util::testing;

#[ctor::ctor]
fn init() {
    testing::init_test_setup();
}

pub type N = &'static str;

/// How lookups answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// `Ready` values
    Sync,
    /// `Deferred` values that complete on first poll
    Lazy,
    /// `Deferred` values that complete when released
    Gated,
}

#[derive(Default)]
pub struct MapTree {
    children: HashMap<Option<N>, Vec<N>>,
    parents: HashMap<N, N>,
    explicit: HashMap<N, bool>,
    selectable: HashSet<N>,
    failing: HashSet<String>,
    equivalent: Option<fn(&Target<N>, &Target<N>) -> Option<bool>>,
    mode: Option<Mode>,
    gates: RefCell<Vec<(String, oneshot::Sender<()>)>>,
    calls: RefCell<Vec<String>>,
}

impl MapTree {
    pub fn new(mode: Mode) -> Self {
        Self {
            mode: Some(mode),
            ..Self::default()
        }
    }

    /// `A -> [B, C]`, `B -> [D]`, with B and C at the root level.
    pub fn abcd(mode: Mode) -> Self {
        Self::new(mode).with_children(None, &["B", "C"]).with_children(Some("B"), &["D"])
    }

    pub fn with_children(mut self, node: Option<N>, children: &[N]) -> Self {
        for child in children {
            if let Some(parent) = node {
                self.parents.insert(child, parent);
            }
        }
        self.children.insert(node, children.to_vec());
        self
    }

    /// Parent link only, for malformed chains.
    pub fn with_parent(mut self, node: N, parent: N) -> Self {
        self.parents.insert(node, parent);
        self
    }

    pub fn with_explicit_branch(mut self, node: N, is_branch: bool) -> Self {
        self.explicit.insert(node, is_branch);
        self
    }

    pub fn with_selectable(mut self, node: N) -> Self {
        self.selectable.insert(node);
        self
    }

    /// Fail the lookup with this key, e.g. `children:B` or `parent:D`.
    pub fn with_failure(mut self, key: &str) -> Self {
        self.failing.insert(key.to_string());
        self
    }

    pub fn with_equivalence(mut self, f: fn(&Target<N>, &Target<N>) -> Option<bool>) -> Self {
        self.equivalent = Some(f);
        self
    }

    /// Every lookup key in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn count(&self, key: &str) -> usize {
        self.calls.borrow().iter().filter(|c| *c == key).count()
    }

    /// Keys of gated lookups still waiting.
    pub fn pending(&self) -> Vec<String> {
        self.gates.borrow().iter().map(|(k, _)| k.clone()).collect()
    }

    /// Complete every waiting lookup with this key. Returns how many.
    pub fn release(&self, key: &str) -> usize {
        let mut gates = self.gates.borrow_mut();
        let (open, keep): (Vec<_>, Vec<_>) = gates.drain(..).partition(|(k, _)| k == key);
        *gates = keep;
        let count = open.len();
        for (_, tx) in open {
            let _ = tx.send(());
        }
        count
    }

    /// Complete waiting lookups until none are left, newest first.
    pub fn release_all(&self) {
        loop {
            let Some((_, tx)) = self.gates.borrow_mut().pop() else {
                break;
            };
            let _ = tx.send(());
        }
    }

    fn answer<T: 'static>(&self, key: String, value: T) -> MaybeDeferred<T> {
        self.calls.borrow_mut().push(key.clone());
        let result = if self.failing.contains(&key) {
            Err(DomainError::lookup_msg(key.clone(), "injected failure"))
        } else {
            Ok(value)
        };
        match self.mode.unwrap_or(Mode::Sync) {
            Mode::Sync => MaybeDeferred::Ready(result),
            Mode::Lazy => MaybeDeferred::deferred(async move { result }),
            Mode::Gated => {
                let (tx, rx) = oneshot::channel();
                self.gates.borrow_mut().push((key.clone(), tx));
                MaybeDeferred::deferred(async move {
                    rx.await.map_err(|e| DomainError::lookup(key, e))?;
                    result
                })
            }
        }
    }
}

impl TreeSource<N> for MapTree {
    fn children(&self, node: Option<&N>) -> MaybeDeferred<Option<Vec<N>>> {
        let key = format!("children:{}", node.copied().unwrap_or("root"));
        self.answer(key, self.children.get(&node.copied()).cloned())
    }

    fn parent(&self, node: &N) -> MaybeDeferred<Option<N>> {
        self.answer(format!("parent:{node}"), self.parents.get(node).copied())
    }

    fn is_branch(&self, node: &N) -> Option<MaybeDeferred<bool>> {
        let explicit = *self.explicit.get(node)?;
        Some(self.answer(format!("is_branch:{node}"), explicit))
    }

    fn is_branch_selectable(&self, node: &N) -> MaybeDeferred<bool> {
        self.answer(format!("selectable:{node}"), self.selectable.contains(node))
    }

    fn option_label(&self, node: &N) -> String {
        node.to_string()
    }

    fn is_equivalent(&self, a: &Target<N>, b: &Target<N>) -> Option<bool> {
        self.equivalent.and_then(|f| f(a, b))
    }
}

/// One observed callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Branch(Option<N>, Direction),
    Value(Selection<N>, ChangeReason, CommitDetails<N>),
    Input(String),
    Close,
}

#[derive(Debug, Default)]
pub struct Recorder {
    events: RefCell<Vec<Event>>,
}

impl Recorder {
    pub fn events(&self) -> Vec<Event> {
        self.events.borrow().clone()
    }

    pub fn branch_changes(&self) -> Vec<(Option<N>, Direction)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Branch(b, d) => Some((b, d)),
                _ => None,
            })
            .collect()
    }

    pub fn value_changes(&self) -> Vec<(Selection<N>, ChangeReason, CommitDetails<N>)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Value(v, r, d) => Some((v, r, d)),
                _ => None,
            })
            .collect()
    }
}

impl NavigationEvents<N> for Recorder {
    fn on_branch_change(&self, branch: Option<&N>, direction: Direction) {
        self.events.borrow_mut().push(Event::Branch(branch.copied(), direction));
    }

    fn on_value_change(&self, value: &Selection<N>, reason: ChangeReason, details: &CommitDetails<N>) {
        self.events
            .borrow_mut()
            .push(Event::Value(value.clone(), reason, details.clone()));
    }

    fn on_input_change(&self, input: &str) {
        self.events.borrow_mut().push(Event::Input(input.to_string()));
    }

    fn on_close(&self) {
        self.events.borrow_mut().push(Event::Close);
    }
}

/// Unwrap a value that must already be available.
pub fn ready<T: std::fmt::Debug>(value: MaybeDeferred<T>) -> T {
    match value {
        MaybeDeferred::Ready(Ok(v)) => v,
        MaybeDeferred::Ready(Err(e)) => panic!("expected ready value, got error {e}"),
        MaybeDeferred::Deferred(_) => panic!("expected ready value, got deferred"),
    }
}

/// Poll `value` to completion, releasing gated lookups as they appear.
pub fn drive<T: 'static>(tree: &MapTree, value: MaybeDeferred<T>) -> DomainResult<T> {
    let mut fut = value.into_future();
    for _ in 0..1000 {
        tree.release_all();
        if let Some(result) = (&mut fut).now_or_never() {
            return result;
        }
        assert!(!tree.pending().is_empty(), "stalled without pending lookups");
    }
    panic!("did not settle");
}

/// Release gated lookups until the facade has nothing in flight.
pub fn drive_select(tree: &MapTree, select: &TreeSelect<N>) {
    for _ in 0..1000 {
        tree.release_all();
        if !select.is_loading() {
            return;
        }
    }
    panic!("did not settle");
}
