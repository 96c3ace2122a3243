//! Timer queue and the [`Sleep`] future.
//!
//! Timers are one-shot callbacks keyed by an absolute deadline on the event
//! loop's clock. Expired timers fire in deadline order; timers sharing a
//! deadline fire in registration order.

use std::cell::{Cell, RefCell};
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};
use std::time::Duration;

/// Identifier of a registered timer.
///
/// Ids increase with registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub(crate) u64);

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer#{}", self.0)
    }
}

/// Callback run when a timer fires.
pub(crate) type TimerCallback = Box<dyn FnOnce()>;

struct TimerEntry {
    deadline: Duration,
    id: TimerId,
    callback: TimerCallback,
}

impl PartialEq for TimerEntry {
    fn eq(&self, other: &Self) -> bool {
        self.deadline == other.deadline && self.id == other.id
    }
}

impl Eq for TimerEntry {}

impl PartialOrd for TimerEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// BinaryHeap is a max-heap; reverse so the earliest (deadline, id) is on top.
impl Ord for TimerEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .deadline
            .cmp(&self.deadline)
            .then_with(|| other.id.cmp(&self.id))
    }
}

/// Pending timers ordered by deadline.
#[derive(Default)]
pub(crate) struct TimerQueue {
    heap: BinaryHeap<TimerEntry>,
    next_id: u64,
}

impl TimerQueue {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Registers `callback` to fire once `deadline` is reached.
    pub(crate) fn insert(&mut self, deadline: Duration, callback: TimerCallback) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.heap.push(TimerEntry {
            deadline,
            id,
            callback,
        });
        id
    }

    /// Deadline of the earliest pending timer.
    pub(crate) fn next_deadline(&self) -> Option<Duration> {
        self.heap.peek().map(|entry| entry.deadline)
    }

    /// Removes the earliest timer if its deadline is at or before `now`.
    pub(crate) fn pop_expired(&mut self, now: Duration) -> Option<(TimerId, TimerCallback)> {
        if self.next_deadline()? > now {
            return None;
        }
        self.heap.pop().map(|entry| (entry.id, entry.callback))
    }

    pub(crate) fn len(&self) -> usize {
        self.heap.len()
    }
}

impl fmt::Debug for TimerQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerQueue")
            .field("pending", &self.heap.len())
            .field("next_deadline", &self.next_deadline())
            .finish()
    }
}

#[derive(Debug, Default)]
struct SleepState {
    fired: Cell<bool>,
    waker: RefCell<Option<Waker>>,
}

/// A future that completes once its timer has fired.
///
/// Created by [`Handle::sleep`](crate::Handle::sleep). The timer is armed at
/// creation, not at first poll.
#[derive(Debug)]
pub struct Sleep {
    deadline: Duration,
    state: Rc<SleepState>,
}

impl Sleep {
    /// Returns the sleep and the timer callback that completes it.
    pub(crate) fn arm(deadline: Duration) -> (Self, TimerCallback) {
        let state = Rc::new(SleepState::default());
        let fire: TimerCallback = {
            let state = state.clone();
            Box::new(move || {
                state.fired.set(true);
                if let Some(waker) = state.waker.borrow_mut().take() {
                    waker.wake();
                }
            })
        };
        (Self { deadline, state }, fire)
    }

    /// The deadline on the event loop's clock.
    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    /// Returns true once the timer has fired.
    pub fn is_elapsed(&self) -> bool {
        self.state.fired.get()
    }
}

impl Future for Sleep {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.state.fired.get() {
            return Poll::Ready(());
        }
        *self.state.waker.borrow_mut() = Some(cx.waker().clone());
        Poll::Pending
    }
}
