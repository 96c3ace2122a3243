//! Error types for the event loop.

use thiserror::Error;

/// Errors reported by the event loop itself.
///
/// Rejections of deferred values are never runtime errors; they travel as
/// the `Err` side of the awaited value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    /// `block_on` was waiting for a future that nothing can wake any more:
    /// no task is runnable and no timer is pending.
    #[error("event loop stalled: future still pending with {pending_tasks} suspended task(s) and no timers left")]
    Stalled {
        /// Spawned tasks that were still suspended
        pending_tasks: usize,
    },
}
