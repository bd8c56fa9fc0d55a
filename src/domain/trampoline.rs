//! Sync/async trampoline
//!
//! A [`Steps`] machine is advanced one step at a time. Each step either
//! finishes with an output or awaits a [`MaybeDeferred`] input. Ready inputs
//! are fed straight back in a loop, so a fully synchronous source never
//! allocates a future. The first deferred input moves the remaining steps
//! into an async continuation.

use futures::future::{FutureExt, LocalBoxFuture};
use tracing::trace;

use crate::domain::deferred::MaybeDeferred;
use crate::domain::error::DomainResult;

/// Outcome of a single step.
pub enum Step<I, O> {
    /// Suspend until the input is available, then resume with it.
    Await(MaybeDeferred<I>),
    /// The computation is finished.
    Done(O),
}

/// A step-sequenced computation.
pub trait Steps: 'static {
    type Input: 'static;
    type Output: 'static;

    /// Advance the computation. `input` is `None` on the first call and the
    /// resolved value of the previous `Await` afterwards.
    fn step(&mut self, input: Option<Self::Input>) -> DomainResult<Step<Self::Input, Self::Output>>;
}

/// Drive `steps` to completion without forcing either mode onto the other.
///
/// Failures surface as `Ready(Err)` while the machine is still synchronous
/// and as a rejected future once it has suspended. Nothing is retried.
pub fn run<S: Steps>(mut steps: S) -> MaybeDeferred<S::Output> {
    let mut input = None;
    let mut count = 0usize;
    loop {
        count += 1;
        match steps.step(input.take()) {
            Err(e) => return MaybeDeferred::Ready(Err(e)),
            Ok(Step::Done(output)) => {
                trace!("trampoline: finished synchronously after {} steps", count);
                return MaybeDeferred::Ready(Ok(output));
            }
            Ok(Step::Await(awaited)) => match awaited.try_ready() {
                Ok(Ok(value)) => input = Some(value),
                Ok(Err(e)) => return MaybeDeferred::Ready(Err(e)),
                Err(deferred) => {
                    trace!("trampoline: suspending after {} steps", count);
                    return MaybeDeferred::Deferred(resume(steps, deferred.into_future()).boxed_local());
                }
            },
        }
    }
}

async fn resume<S: Steps>(
    mut steps: S,
    mut pending: LocalBoxFuture<'static, DomainResult<S::Input>>,
) -> DomainResult<S::Output> {
    loop {
        let mut input = Some(pending.await?);
        loop {
            match steps.step(input.take())? {
                Step::Done(output) => return Ok(output),
                Step::Await(awaited) => match awaited.try_ready() {
                    Ok(result) => input = Some(result?),
                    Err(deferred) => {
                        pending = deferred.into_future();
                        break;
                    }
                },
            }
        }
    }
}
