//! Single-shot deferred values.
//!
//! A [`Deferred`] starts out pending and is settled exactly once, either
//! fulfilled with a value or rejected with an error, by the producer routine
//! it was created with. Settlement is monotonic: once settled, later signals
//! are ignored.
//!
//! Callers observe settlement in two ways:
//! - by awaiting the value (it implements [`Future`]), or
//! - by attaching [`Reactions`](crate::Reactions) through
//!   [`Deferred::react`] and its `then`/`catch`/`finally` shorthands.

use core_types::DeferredError;
use std::cell::RefCell;
use std::fmt;
use std::future::Future;
use std::mem;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};
use tracing::{trace, warn};

/// The state of a deferred value.
///
/// Once settled (Fulfilled or Rejected), a deferred value cannot change state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeferredState {
    /// Not settled yet.
    Pending,
    /// Settled with a value.
    Fulfilled,
    /// Settled with an error.
    Rejected,
}

/// The terminal outcome of one deferred value.
///
/// Produced for every input by [`all_settled`](crate::all_settled).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settlement<T, E = DeferredError> {
    /// The value fulfilled.
    Fulfilled(T),
    /// The value rejected with this reason.
    Rejected(E),
}

impl<T, E> Settlement<T, E> {
    /// Returns true for [`Settlement::Fulfilled`].
    pub fn is_fulfilled(&self) -> bool {
        matches!(self, Settlement::Fulfilled(_))
    }

    /// Returns true for [`Settlement::Rejected`].
    pub fn is_rejected(&self) -> bool {
        matches!(self, Settlement::Rejected(_))
    }

    /// The fulfillment value, if any.
    pub fn value(&self) -> Option<&T> {
        match self {
            Settlement::Fulfilled(value) => Some(value),
            Settlement::Rejected(_) => None,
        }
    }

    /// The rejection reason, if any.
    pub fn reason(&self) -> Option<&E> {
        match self {
            Settlement::Fulfilled(_) => None,
            Settlement::Rejected(reason) => Some(reason),
        }
    }

    /// The state this settlement corresponds to.
    pub fn state(&self) -> DeferredState {
        match self {
            Settlement::Fulfilled(_) => DeferredState::Fulfilled,
            Settlement::Rejected(_) => DeferredState::Rejected,
        }
    }

    /// Converts into a `Result`.
    pub fn into_result(self) -> Result<T, E> {
        match self {
            Settlement::Fulfilled(value) => Ok(value),
            Settlement::Rejected(reason) => Err(reason),
        }
    }
}

impl<T, E> From<Result<T, E>> for Settlement<T, E> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Settlement::Fulfilled(value),
            Err(reason) => Settlement::Rejected(reason),
        }
    }
}

/// A reaction runs once with the outcome.
pub(crate) type Reaction<T, E> = Box<dyn FnOnce(&Result<T, E>)>;

struct Inner<T, E> {
    outcome: Option<Result<T, E>>,
    waiters: Vec<Waker>,
    reactions: Vec<Reaction<T, E>>,
    // Set once anything consumed a rejection.
    observed: bool,
}

impl<T, E> Inner<T, E> {
    fn state(&self) -> DeferredState {
        match &self.outcome {
            None => DeferredState::Pending,
            Some(Ok(_)) => DeferredState::Fulfilled,
            Some(Err(_)) => DeferredState::Rejected,
        }
    }
}

impl<T, E> Drop for Inner<T, E> {
    fn drop(&mut self) {
        if matches!(self.outcome, Some(Err(_))) && !self.observed {
            warn!(
                error_type = std::any::type_name::<E>(),
                "deferred value was rejected but no one observed the rejection"
            );
        }
    }
}

type Shared<T, E> = Rc<RefCell<Inner<T, E>>>;

fn settle<T: Clone, E: Clone>(inner: &Shared<T, E>, outcome: Result<T, E>) -> bool {
    let (waiters, reactions, snapshot) = {
        let mut inner = inner.borrow_mut();
        if inner.outcome.is_some() {
            trace!(state = ?inner.state(), "ignoring repeated settlement");
            return false;
        }
        let snapshot = (!inner.reactions.is_empty()).then(|| outcome.clone());
        inner.outcome = Some(outcome);
        if snapshot.is_some() {
            inner.observed = true;
        }
        trace!(
            state = ?inner.state(),
            waiters = inner.waiters.len(),
            reactions = inner.reactions.len(),
            "deferred value settled"
        );
        (
            mem::take(&mut inner.waiters),
            mem::take(&mut inner.reactions),
            snapshot,
        )
    };

    // Handlers run without the cell borrowed, so they may touch this value.
    if let Some(snapshot) = snapshot {
        for reaction in reactions {
            reaction(&snapshot);
        }
    }
    for waker in waiters {
        waker.wake();
    }
    true
}

/// Settles a [`Deferred`] by fulfilling it.
///
/// Cloneable; every clone settles the same value. Only the first resolve or
/// reject across all handles takes effect.
pub struct Resolver<T, E = DeferredError> {
    inner: Shared<T, E>,
}

impl<T: Clone, E: Clone> Resolver<T, E> {
    /// Fulfills the deferred value with `value`.
    ///
    /// Returns false, leaving the value untouched, if it was already settled.
    pub fn resolve(&self, value: T) -> bool {
        settle(&self.inner, Ok(value))
    }
}

impl<T, E> Clone for Resolver<T, E> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T, E> fmt::Debug for Resolver<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("state", &self.inner.borrow().state())
            .finish()
    }
}

/// Settles a [`Deferred`] by rejecting it.
///
/// Cloneable; shares first-signal-wins semantics with [`Resolver`].
pub struct Rejecter<T, E = DeferredError> {
    inner: Shared<T, E>,
}

impl<T: Clone, E: Clone> Rejecter<T, E> {
    /// Rejects the deferred value with `error`.
    ///
    /// Returns false, leaving the value untouched, if it was already settled.
    pub fn reject(&self, error: E) -> bool {
        settle(&self.inner, Err(error))
    }
}

impl<T, E> Clone for Rejecter<T, E> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T, E> fmt::Debug for Rejecter<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rejecter")
            .field("state", &self.inner.borrow().state())
            .finish()
    }
}

/// A single-shot deferred value.
///
/// `Deferred` is a handle: clones share one settlement state, and all of
/// them observe the same outcome. Awaiting yields `Ok(value)` or
/// `Err(error)`; any number of clones may be awaited at the same time.
///
/// # Examples
///
/// ```
/// use async_runtime::{Deferred, DeferredState, EventLoop};
/// use core_types::DeferredError;
/// use std::time::Duration;
///
/// let mut event_loop = EventLoop::with_virtual_clock();
/// let handle = event_loop.handle();
///
/// let deferred: Deferred<u32> = Deferred::new(|resolve, _reject| {
///     handle.set_timeout(Duration::from_secs(2), move || {
///         resolve.resolve(42);
///     });
/// });
/// assert_eq!(deferred.state(), DeferredState::Pending);
///
/// let value = event_loop.block_on(deferred.clone()).unwrap();
/// assert_eq!(value, Ok(42));
/// assert_eq!(deferred.state(), DeferredState::Fulfilled);
/// ```
pub struct Deferred<T, E = DeferredError> {
    inner: Shared<T, E>,
}

impl<T: Clone + 'static, E: Clone + 'static> Deferred<T, E> {
    /// Creates a pending value and runs `producer` once, synchronously.
    ///
    /// The producer receives the signals that settle the value and is
    /// expected to call one of them later, typically from a timer or task.
    pub fn new<P>(producer: P) -> Self
    where
        P: FnOnce(Resolver<T, E>, Rejecter<T, E>),
    {
        let (deferred, resolver, rejecter) = Self::pending();
        producer(resolver, rejecter);
        deferred
    }

    /// Creates a pending value together with its settlement signals.
    pub fn pending() -> (Self, Resolver<T, E>, Rejecter<T, E>) {
        let inner = Rc::new(RefCell::new(Inner {
            outcome: None,
            waiters: Vec::new(),
            reactions: Vec::new(),
            observed: false,
        }));
        (
            Self {
                inner: inner.clone(),
            },
            Resolver {
                inner: inner.clone(),
            },
            Rejecter { inner },
        )
    }

    /// Creates a value that is already fulfilled.
    pub fn resolved(value: T) -> Self {
        let (deferred, resolver, _) = Self::pending();
        resolver.resolve(value);
        deferred
    }

    /// Creates a value that is already rejected.
    pub fn rejected(error: E) -> Self {
        let (deferred, _, rejecter) = Self::pending();
        rejecter.reject(error);
        deferred
    }

    /// The current state.
    pub fn state(&self) -> DeferredState {
        self.inner.borrow().state()
    }

    /// Returns true once the value is fulfilled or rejected.
    pub fn is_settled(&self) -> bool {
        self.state() != DeferredState::Pending
    }

    /// A copy of the fulfillment value, if fulfilled.
    pub fn result(&self) -> Option<T> {
        match &self.inner.borrow().outcome {
            Some(Ok(value)) => Some(value.clone()),
            _ => None,
        }
    }

    /// A copy of the rejection error, if rejected.
    ///
    /// Reading the error counts as observing the rejection.
    pub fn error(&self) -> Option<E> {
        let mut inner = self.inner.borrow_mut();
        let error = match &inner.outcome {
            Some(Err(error)) => Some(error.clone()),
            _ => None,
        };
        if error.is_some() {
            inner.observed = true;
        }
        error
    }

    /// A copy of the outcome, if settled.
    pub fn settlement(&self) -> Option<Settlement<T, E>> {
        let mut inner = self.inner.borrow_mut();
        let settlement = inner.outcome.clone().map(Settlement::from);
        if settlement.is_some() {
            inner.observed = true;
        }
        settlement
    }

    /// Registers a raw reaction.
    ///
    /// Runs at settlement, or right away if already settled.
    pub(crate) fn on_settled(&self, reaction: Reaction<T, E>) {
        let snapshot = {
            let mut inner = self.inner.borrow_mut();
            inner.observed = true;
            match &inner.outcome {
                Some(outcome) => outcome.clone(),
                None => {
                    inner.reactions.push(reaction);
                    return;
                }
            }
        };
        reaction(&snapshot);
    }
}

impl<T, E> Clone for Deferred<T, E> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Clone, E: Clone> Future for Deferred<T, E> {
    type Output = Result<T, E>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut inner = self.inner.borrow_mut();
        match inner.outcome.clone() {
            Some(outcome) => {
                if outcome.is_err() {
                    inner.observed = true;
                }
                Poll::Ready(outcome)
            }
            None => {
                if !inner.waiters.iter().any(|w| w.will_wake(cx.waker())) {
                    inner.waiters.push(cx.waker().clone());
                }
                Poll::Pending
            }
        }
    }
}

impl<T, E> fmt::Debug for Deferred<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Deferred")
            .field("state", &inner.state())
            .field("waiters", &inner.waiters.len())
            .field("reactions", &inner.reactions.len())
            .finish()
    }
}
