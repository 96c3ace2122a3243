//! Producer routines that settle a deferred value after a delay.
//!
//! A producer is the closure handed to [`Deferred::new`](crate::Deferred::new).
//! The helpers here register a timer on an event loop and settle the value
//! when it fires.

use crate::deferred::{Rejecter, Resolver};
use crate::event_loop::Handle;
use core_types::{DeferredError, FutureValue};
use std::time::Duration;

/// Delay used by the demonstration producers.
pub const DEFAULT_DELAY: Duration = Duration::from_secs(2);

/// Message carried by [`always_rejects`].
pub const REJECTION_MESSAGE: &str = "this promise failed";

/// Returns the record [`always_fulfills`] settles with.
pub fn sample_value() -> FutureValue {
    FutureValue::new("Nadia", "Idris")
}

/// Producer that fulfills with `value` once `delay` has elapsed.
pub fn fulfill_after<T, E>(
    handle: &Handle,
    delay: Duration,
    value: T,
) -> impl FnOnce(Resolver<T, E>, Rejecter<T, E>)
where
    T: Clone + 'static,
    E: Clone + 'static,
{
    let handle = handle.clone();
    move |resolver, _rejecter| {
        handle.set_timeout(delay, move || {
            resolver.resolve(value);
        });
    }
}

/// Producer that rejects with `error` once `delay` has elapsed.
pub fn reject_after<T, E>(
    handle: &Handle,
    delay: Duration,
    error: E,
) -> impl FnOnce(Resolver<T, E>, Rejecter<T, E>)
where
    T: Clone + 'static,
    E: Clone + 'static,
{
    let handle = handle.clone();
    move |_resolver, rejecter| {
        handle.set_timeout(delay, move || {
            rejecter.reject(error);
        });
    }
}

/// Producer that fulfills with `{ firstName: 'Nadia', lastName: 'Idris' }`
/// after `delay`.
///
/// # Examples
///
/// ```
/// use async_runtime::{always_fulfills, Deferred, EventLoop, DEFAULT_DELAY};
/// use core_types::FutureValue;
///
/// let mut event_loop = EventLoop::with_virtual_clock();
/// let deferred = Deferred::new(always_fulfills(&event_loop.handle(), DEFAULT_DELAY));
///
/// let value = event_loop.block_on(deferred).unwrap().unwrap();
/// assert_eq!(value, FutureValue::new("Nadia", "Idris"));
/// assert_eq!(event_loop.now(), DEFAULT_DELAY);
/// ```
pub fn always_fulfills(
    handle: &Handle,
    delay: Duration,
) -> impl FnOnce(Resolver<FutureValue, DeferredError>, Rejecter<FutureValue, DeferredError>) {
    fulfill_after(handle, delay, sample_value())
}

/// Producer that rejects with a [`DeferredError`] reading
/// "this promise failed" after `delay`.
///
/// The error is constructed when the timer fires.
pub fn always_rejects(
    handle: &Handle,
    delay: Duration,
) -> impl FnOnce(Resolver<FutureValue, DeferredError>, Rejecter<FutureValue, DeferredError>) {
    let handle = handle.clone();
    move |_resolver, rejecter| {
        handle.set_timeout(delay, move || {
            rejecter.reject(DeferredError::producer_failure(REJECTION_MESSAGE));
        });
    }
}
