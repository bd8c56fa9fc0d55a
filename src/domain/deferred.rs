//! Deferred-or-immediate values
//!
//! Every lookup against an external tree source answers with a
//! [`MaybeDeferred`]: either the value is available right away, or a local
//! future will produce it later. Combinators keep synchronous chains fully
//! synchronous and only box a continuation once a deferred value shows up.

use std::fmt;
use std::future::Future;

use futures::future::{self, FutureExt, LocalBoxFuture};

use crate::domain::error::{DomainError, DomainResult};

/// A value that is either available now or will become available later.
pub enum MaybeDeferred<T> {
    Ready(DomainResult<T>),
    Deferred(LocalBoxFuture<'static, DomainResult<T>>),
}

impl<T: 'static> MaybeDeferred<T> {
    pub fn ready(value: T) -> Self {
        Self::Ready(Ok(value))
    }

    pub fn failed(error: DomainError) -> Self {
        Self::Ready(Err(error))
    }

    /// Wrap a future; it is never polled before the caller drives it.
    pub fn deferred<F>(fut: F) -> Self
    where
        F: Future<Output = DomainResult<T>> + 'static,
    {
        Self::Deferred(fut.boxed_local())
    }

    pub fn is_deferred(&self) -> bool {
        matches!(self, Self::Deferred(_))
    }

    /// Take the immediate result, or hand the deferred value back.
    pub fn try_ready(self) -> Result<DomainResult<T>, Self> {
        match self {
            Self::Ready(result) => Ok(result),
            deferred => Err(deferred),
        }
    }

    pub fn into_future(self) -> LocalBoxFuture<'static, DomainResult<T>> {
        match self {
            Self::Ready(result) => future::ready(result).boxed_local(),
            Self::Deferred(fut) => fut,
        }
    }

    pub fn map<U, F>(self, f: F) -> MaybeDeferred<U>
    where
        U: 'static,
        F: FnOnce(T) -> U + 'static,
    {
        match self {
            Self::Ready(result) => MaybeDeferred::Ready(result.map(f)),
            Self::Deferred(fut) => MaybeDeferred::Deferred(fut.map(|r| r.map(f)).boxed_local()),
        }
    }

    pub fn map_err<F>(self, f: F) -> Self
    where
        F: FnOnce(DomainError) -> DomainError + 'static,
    {
        match self {
            Self::Ready(result) => Self::Ready(result.map_err(f)),
            Self::Deferred(fut) => Self::Deferred(fut.map(|r| r.map_err(f)).boxed_local()),
        }
    }

    /// Recover from a failure; `f` only runs on the error path.
    pub fn or_else<F>(self, f: F) -> Self
    where
        F: FnOnce(DomainError) -> DomainResult<T> + 'static,
    {
        match self {
            Self::Ready(result) => Self::Ready(result.or_else(f)),
            Self::Deferred(fut) => Self::Deferred(fut.map(|r| r.or_else(f)).boxed_local()),
        }
    }

    /// Chain a dependent lookup. Stays synchronous when `self` is ready.
    pub fn and_then<U, F>(self, f: F) -> MaybeDeferred<U>
    where
        U: 'static,
        F: FnOnce(T) -> MaybeDeferred<U> + 'static,
    {
        match self {
            Self::Ready(Ok(value)) => f(value),
            Self::Ready(Err(e)) => MaybeDeferred::Ready(Err(e)),
            Self::Deferred(fut) => MaybeDeferred::Deferred(
                async move {
                    let value = fut.await?;
                    f(value).into_future().await
                }
                .boxed_local(),
            ),
        }
    }

    /// Combine two independent lookups; deferred halves are polled concurrently.
    pub fn join<U: 'static>(self, other: MaybeDeferred<U>) -> MaybeDeferred<(T, U)> {
        match (self, other) {
            (Self::Ready(a), MaybeDeferred::Ready(b)) => MaybeDeferred::Ready(a.and_then(|a| b.map(|b| (a, b)))),
            (a, b) => MaybeDeferred::Deferred(
                async move { future::try_join(a.into_future(), b.into_future()).await }.boxed_local(),
            ),
        }
    }

    /// Combine many independent lookups, preserving input order.
    ///
    /// Completion order of deferred members never reorders the output.
    /// The first failure fails the whole result.
    pub fn join_all<I>(items: I) -> MaybeDeferred<Vec<T>>
    where
        I: IntoIterator<Item = MaybeDeferred<T>>,
    {
        let mut ready = Vec::new();
        let mut rest = items.into_iter();
        while let Some(item) = rest.next() {
            match item.try_ready() {
                Ok(result) => ready.push(result),
                Err(deferred) => {
                    let futures: Vec<_> = ready
                        .into_iter()
                        .map(|r| future::ready(r).boxed_local())
                        .chain(std::iter::once(deferred.into_future()))
                        .chain(rest.map(MaybeDeferred::into_future))
                        .collect();
                    return MaybeDeferred::Deferred(future::try_join_all(futures).boxed_local());
                }
            }
        }
        MaybeDeferred::Ready(ready.into_iter().collect())
    }
}

impl<T: 'static> From<DomainResult<T>> for MaybeDeferred<T> {
    fn from(result: DomainResult<T>) -> Self {
        Self::Ready(result)
    }
}

impl<T: fmt::Debug> fmt::Debug for MaybeDeferred<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready(result) => f.debug_tuple("Ready").field(result).finish(),
            Self::Deferred(_) => f.write_str("Deferred(..)"),
        }
    }
}
