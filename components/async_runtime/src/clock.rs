//! Time sources for the event loop.
//!
//! The event loop measures time as a [`Duration`] since it was created. A
//! [`TimeSource`] provides that reading and knows how to wait for a future
//! deadline when the loop has nothing else to do.

use std::cell::Cell;
use std::time::{Duration, Instant};

/// Abstraction over the clock driving an event loop.
///
/// This allows the loop to run against wall clock time in production and
/// against virtual time in tests.
pub trait TimeSource {
    /// Returns the time elapsed since the clock's epoch.
    fn now(&self) -> Duration;

    /// Idles until `deadline` has been reached.
    ///
    /// Called by the event loop only when no task is runnable and the
    /// earliest timer is still in the future.
    fn wait_until(&self, deadline: Duration);
}

/// Wall clock time source.
///
/// The epoch is the instant this clock was created. Waiting parks the
/// current thread until the deadline.
#[derive(Debug)]
pub struct WallClock {
    epoch: Instant,
}

impl WallClock {
    /// Creates a new wall clock whose epoch is now.
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Default for WallClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for WallClock {
    fn now(&self) -> Duration {
        self.epoch.elapsed()
    }

    fn wait_until(&self, deadline: Duration) {
        let now = self.now();
        if deadline > now {
            std::thread::sleep(deadline - now);
        }
    }
}

/// Virtual time source.
///
/// Time only moves when the event loop waits for a deadline, and then it
/// jumps straight there. Timing of a whole program becomes exact and free.
///
/// # Examples
///
/// ```
/// use async_runtime::{TimeSource, VirtualClock};
/// use std::time::Duration;
///
/// let clock = VirtualClock::new();
/// assert_eq!(clock.now(), Duration::ZERO);
///
/// clock.wait_until(Duration::from_secs(2));
/// assert_eq!(clock.now(), Duration::from_secs(2));
///
/// // Deadlines in the past never move time backwards.
/// clock.wait_until(Duration::from_secs(1));
/// assert_eq!(clock.now(), Duration::from_secs(2));
/// ```
#[derive(Debug, Default)]
pub struct VirtualClock {
    now: Cell<Duration>,
}

impl VirtualClock {
    /// Creates a virtual clock starting at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances time by `delta`.
    pub fn advance(&self, delta: Duration) {
        self.now.set(self.now.get().saturating_add(delta));
    }
}

impl TimeSource for VirtualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }

    fn wait_until(&self, deadline: Duration) {
        if deadline > self.now.get() {
            self.now.set(deadline);
        }
    }
}
