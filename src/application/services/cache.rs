//! Keyed single-flight memo
//!
//! Holds the result of one computation per key. Asking again with the same
//! key never recomputes; a different key drops the old result and starts a
//! new computation. Deferred computations are shared, and every computation
//! is tagged with a generation so a result that lands after the key moved on
//! is discarded instead of applied.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use futures::future::{FutureExt, LocalBoxFuture, Shared};
use tracing::{debug, trace, warn};

use crate::domain::{DomainError, DomainResult, MaybeDeferred};

/// Receiver for failed computations.
pub type ErrorHandler = Rc<dyn Fn(&DomainError)>;

type Pending<T> = Shared<LocalBoxFuture<'static, DomainResult<T>>>;

/// Observable state of a memo: `{data, loading, error}`.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoSnapshot<T> {
    pub data: Option<T>,
    pub loading: bool,
    pub error: Option<String>,
}

struct Slot<K, T> {
    key: Option<K>,
    generation: u64,
    data: Option<T>,
    error: Option<DomainError>,
    pending: Option<Pending<T>>,
}

pub struct Memo<K, T: Clone + 'static> {
    name: &'static str,
    slot: Rc<RefCell<Slot<K, T>>>,
    on_error: Option<ErrorHandler>,
}

impl<K, T> Memo<K, T>
where
    K: PartialEq + fmt::Debug,
    T: Clone + 'static,
{
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            slot: Rc::new(RefCell::new(Slot {
                key: None,
                generation: 0,
                data: None,
                error: None,
                pending: None,
            })),
            on_error: None,
        }
    }

    pub fn with_on_error(mut self, handler: Option<ErrorHandler>) -> Self {
        self.on_error = handler;
        self
    }

    /// Current state for `key`, starting `producer` only if the key changed.
    pub fn get<F>(&self, key: K, producer: F) -> MemoSnapshot<T>
    where
        F: FnOnce() -> MaybeDeferred<T>,
    {
        self.refresh();
        let generation = {
            let mut slot = self.slot.borrow_mut();
            if slot.key.as_ref() == Some(&key) {
                trace!("{}: hit for {:?}", self.name, key);
                drop(slot);
                return self.snapshot();
            }
            debug!("{}: key changed to {:?}, recomputing", self.name, key);
            slot.key = Some(key);
            slot.generation += 1;
            slot.data = None;
            slot.error = None;
            slot.pending = None;
            slot.generation
        };

        match producer().try_ready() {
            Ok(result) => self.apply(generation, result),
            Err(deferred) => {
                self.slot.borrow_mut().pending = Some(deferred.into_future().shared());
            }
        }
        self.snapshot()
    }

    pub fn snapshot(&self) -> MemoSnapshot<T> {
        let slot = self.slot.borrow();
        MemoSnapshot {
            data: slot.data.clone(),
            loading: slot.pending.is_some(),
            error: slot.error.as_ref().map(ToString::to_string),
        }
    }

    /// The failure of the current key, if it failed.
    pub fn error(&self) -> Option<DomainError> {
        self.slot.borrow().error.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.refresh();
        self.slot.borrow().pending.is_some()
    }

    /// Pick up a pending computation that has finished in the meantime.
    pub fn refresh(&self) {
        let Some((generation, pending)) = self.pending() else {
            return;
        };
        if let Some(result) = pending.now_or_never() {
            self.apply(generation, result);
        }
    }

    /// Wait until no computation is pending.
    pub async fn settle(&self) {
        while let Some((generation, pending)) = self.pending() {
            let result = pending.await;
            self.apply(generation, result);
        }
    }

    /// Forget the key so the next `get` recomputes.
    pub fn invalidate(&self) {
        let mut slot = self.slot.borrow_mut();
        slot.key = None;
        slot.generation += 1;
        slot.pending = None;
    }

    fn pending(&self) -> Option<(u64, Pending<T>)> {
        let slot = self.slot.borrow();
        slot.pending.clone().map(|p| (slot.generation, p))
    }

    fn apply(&self, generation: u64, result: DomainResult<T>) {
        {
            let mut slot = self.slot.borrow_mut();
            if slot.generation != generation {
                warn!(
                    "{}: discarding stale result (generation {} != {})",
                    self.name, generation, slot.generation
                );
                return;
            }
            slot.pending = None;
            match &result {
                Ok(data) => {
                    slot.data = Some(data.clone());
                    slot.error = None;
                }
                Err(e) => {
                    slot.data = None;
                    slot.error = Some(e.clone());
                }
            }
        }
        if let (Err(e), Some(handler)) = (&result, &self.on_error) {
            warn!("{}: routing failure to error handler: {}", self.name, e);
            handler(e);
        }
    }
}
