//! Single-threaded async runtime with deferred values.
//!
//! This crate provides:
//! - Event loop with a run queue, timers and a pluggable clock
//! - Single-shot deferred values with await and reaction-callback consumers
//! - Combinators that wait on many deferred values at once
//!
//! # Overview
//!
//! - [`EventLoop`] / [`Handle`] - Cooperative scheduler and its spawn/timer API
//! - [`Deferred`] - Value settled once, fulfilled or rejected, by a producer
//! - [`Reactions`] - Fulfillment, rejection and finally handlers
//! - [`all_settled`] / [`all`] - Wait on a collection of deferred values
//! - [`TimeSource`] - Wall clock or virtual time
//!
//! # Examples
//!
//! ## Awaiting one value
//!
//! ```
//! use async_runtime::{always_rejects, Deferred, EventLoop, DEFAULT_DELAY};
//!
//! let mut event_loop = EventLoop::with_virtual_clock();
//! let deferred = Deferred::new(always_rejects(&event_loop.handle(), DEFAULT_DELAY));
//!
//! let error = event_loop.block_on(deferred).unwrap().unwrap_err();
//! assert_eq!(error.message, "this promise failed");
//! ```
//!
//! ## Waiting for many values concurrently
//!
//! ```
//! use async_runtime::{
//!     all_settled, always_fulfills, always_rejects, Deferred, EventLoop, DEFAULT_DELAY,
//! };
//!
//! let mut event_loop = EventLoop::with_virtual_clock();
//! let handle = event_loop.handle();
//! let inputs = vec![
//!     Deferred::new(always_fulfills(&handle, DEFAULT_DELAY)),
//!     Deferred::new(always_rejects(&handle, DEFAULT_DELAY)),
//! ];
//!
//! let settled = event_loop.block_on(all_settled(inputs)).unwrap();
//! assert!(settled[0].is_fulfilled());
//! assert!(settled[1].is_rejected());
//! // Both timers ran side by side.
//! assert_eq!(event_loop.now(), DEFAULT_DELAY);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod clock;
pub mod combinator;
pub mod deferred;
pub mod error;
pub mod event_loop;
pub mod producer;
pub mod reaction;
pub mod task_queue;
pub mod timer;

// Re-export main types at crate root
pub use clock::{TimeSource, VirtualClock, WallClock};
pub use combinator::{all, all_settled, All, AllSettled};
pub use deferred::{Deferred, DeferredState, Rejecter, Resolver, Settlement};
pub use error::RuntimeError;
pub use event_loop::{EventLoop, Handle};
pub use producer::{
    always_fulfills, always_rejects, fulfill_after, reject_after, sample_value, DEFAULT_DELAY,
    REJECTION_MESSAGE,
};
pub use reaction::Reactions;
pub use task_queue::TaskId;
pub use timer::{Sleep, TimerId};
