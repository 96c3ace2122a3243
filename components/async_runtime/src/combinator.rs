//! Combinators over collections of deferred values.
//!
//! - [`all_settled`] waits for **every** input to settle and reports each
//!   outcome, never failing itself.
//! - [`all`] is the fail-fast counterpart: it resolves with all values, or
//!   with the first rejection it observes.
//!
//! Both preserve input order in their output regardless of the order in
//! which inputs settle, and both suspend on all inputs at once, so the total
//! wait is that of the slowest input rather than the sum.

use crate::deferred::{Deferred, Settlement};
use core_types::DeferredError;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tracing::trace;

/// Future returned by [`all_settled`].
pub struct AllSettled<T, E = DeferredError> {
    inputs: Vec<Deferred<T, E>>,
    outcomes: Vec<Option<Settlement<T, E>>>,
    remaining: usize,
}

/// Waits until every input has settled.
///
/// Resolves to one [`Settlement`] per input, in input order. Rejections are
/// captured as [`Settlement::Rejected`]; the combinator itself cannot fail.
/// An empty input resolves immediately to an empty vector.
///
/// # Examples
///
/// ```
/// use async_runtime::{all_settled, Deferred, EventLoop, Settlement};
/// use core_types::DeferredError;
///
/// let mut event_loop = EventLoop::with_virtual_clock();
/// let inputs = vec![
///     Deferred::resolved(1),
///     Deferred::rejected(DeferredError::producer_failure("no")),
/// ];
///
/// let settled = event_loop.block_on(all_settled(inputs)).unwrap();
/// assert_eq!(settled[0], Settlement::Fulfilled(1));
/// assert!(settled[1].is_rejected());
/// ```
pub fn all_settled<T, E, I>(inputs: I) -> AllSettled<T, E>
where
    T: Clone,
    E: Clone,
    I: IntoIterator<Item = Deferred<T, E>>,
{
    let inputs: Vec<_> = inputs.into_iter().collect();
    let remaining = inputs.len();
    AllSettled {
        outcomes: (0..remaining).map(|_| None).collect(),
        inputs,
        remaining,
    }
}

// Inputs are polled through `Pin::new`; no field is structurally pinned.
impl<T, E> Unpin for AllSettled<T, E> {}

impl<T: Clone, E: Clone> Future for AllSettled<T, E> {
    type Output = Vec<Settlement<T, E>>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        for (input, slot) in this.inputs.iter_mut().zip(this.outcomes.iter_mut()) {
            if slot.is_some() {
                continue;
            }
            if let Poll::Ready(outcome) = Pin::new(input).poll(cx) {
                *slot = Some(outcome.into());
                this.remaining -= 1;
            }
        }

        if this.remaining > 0 {
            trace!(remaining = this.remaining, "all_settled waiting");
            return Poll::Pending;
        }
        Poll::Ready(this.outcomes.drain(..).flatten().collect())
    }
}

impl<T, E> fmt::Debug for AllSettled<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AllSettled")
            .field("inputs", &self.inputs.len())
            .field("remaining", &self.remaining)
            .finish()
    }
}

/// Future returned by [`all`].
pub struct All<T, E = DeferredError> {
    inputs: Vec<Deferred<T, E>>,
    values: Vec<Option<T>>,
    remaining: usize,
}

/// Waits for every input to fulfill, failing fast on the first rejection.
///
/// Resolves to the values in input order. If an input rejects, resolves to
/// that error as soon as it is observed; inputs still pending are left
/// running. When several inputs are found rejected in the same poll, the one
/// earliest in input order wins.
pub fn all<T, E, I>(inputs: I) -> All<T, E>
where
    T: Clone,
    E: Clone,
    I: IntoIterator<Item = Deferred<T, E>>,
{
    let inputs: Vec<_> = inputs.into_iter().collect();
    let remaining = inputs.len();
    All {
        values: (0..remaining).map(|_| None).collect(),
        inputs,
        remaining,
    }
}

impl<T, E> Unpin for All<T, E> {}

impl<T: Clone, E: Clone> Future for All<T, E> {
    type Output = Result<Vec<T>, E>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        for (input, slot) in this.inputs.iter_mut().zip(this.values.iter_mut()) {
            if slot.is_some() {
                continue;
            }
            match Pin::new(input).poll(cx) {
                Poll::Ready(Ok(value)) => {
                    *slot = Some(value);
                    this.remaining -= 1;
                }
                Poll::Ready(Err(error)) => {
                    trace!("all short-circuited on rejection");
                    return Poll::Ready(Err(error));
                }
                Poll::Pending => {}
            }
        }

        if this.remaining > 0 {
            return Poll::Pending;
        }
        Poll::Ready(Ok(this.values.drain(..).flatten().collect()))
    }
}

impl<T, E> fmt::Debug for All<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("All")
            .field("inputs", &self.inputs.len())
            .field("remaining", &self.remaining)
            .finish()
    }
}
