//! Event loop implementation.
//!
//! This module provides a single-threaded cooperative scheduler. Each turn of
//! the loop:
//! 1. Polls every task that was woken since the previous turn, in wake order
//! 2. Fires every timer whose deadline has been reached, in deadline order
//!
//! When nothing is runnable the loop idles on its [`TimeSource`] until the
//! next timer deadline.

use crate::clock::{TimeSource, VirtualClock, WallClock};
use crate::error::RuntimeError;
use crate::task_queue::{RunQueue, Task, TaskId};
use crate::timer::{Sleep, TimerId, TimerQueue};
use futures::task::{waker_ref, ArcWake};
use futures::FutureExt;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::pin;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;
use tracing::{debug, trace};

struct Shared {
    clock: Box<dyn TimeSource>,
    tasks: RefCell<HashMap<TaskId, Task>>,
    run_queue: RunQueue,
    timers: RefCell<TimerQueue>,
    next_task_id: Cell<u64>,
}

impl Shared {
    fn poll_task(&self, id: TaskId) {
        // The task is taken out while polled so it can spawn new tasks.
        let Some(mut task) = self.tasks.borrow_mut().remove(&id) else {
            trace!(task = %id, "stale wake for finished task");
            return;
        };
        match task.poll() {
            Poll::Ready(()) => trace!(task = %id, "task finished"),
            Poll::Pending => {
                self.tasks.borrow_mut().insert(id, task);
            }
        }
    }

    fn fire_expired_timers(&self) -> usize {
        let now = self.clock.now();
        let mut fired = 0;
        loop {
            let Some((id, callback)) = self.timers.borrow_mut().pop_expired(now) else {
                break;
            };
            trace!(timer = %id, now = ?now, "timer fired");
            callback();
            fired += 1;
        }
        fired
    }

    /// One turn; returns how many tasks were polled plus timers fired.
    fn turn(&self) -> usize {
        let batch = self.run_queue.take_batch();
        let polled = batch.len();
        for id in batch {
            self.poll_task(id);
        }
        polled + self.fire_expired_timers()
    }

    /// Waits for the next timer if nothing else can make progress.
    ///
    /// Returns false when there is no timer to wait for.
    fn idle(&self) -> bool {
        let next = self.timers.borrow().next_deadline();
        match next {
            Some(deadline) => {
                trace!(deadline = ?deadline, "idling until next timer");
                self.clock.wait_until(deadline);
                true
            }
            None => false,
        }
    }
}

/// The event loop.
///
/// Owns spawned tasks, the run queue and the timer queue. Work is added
/// through a [`Handle`], which producers and tasks keep to schedule timers
/// and spawn further tasks.
///
/// # Examples
///
/// ```
/// use async_runtime::EventLoop;
/// use std::time::Duration;
///
/// let mut event_loop = EventLoop::with_virtual_clock();
/// let handle = event_loop.handle();
///
/// let answer = event_loop
///     .block_on(async move {
///         handle.sleep(Duration::from_secs(2)).await;
///         42
///     })
///     .unwrap();
///
/// assert_eq!(answer, 42);
/// assert_eq!(event_loop.now(), Duration::from_secs(2));
/// ```
pub struct EventLoop {
    shared: Rc<Shared>,
}

impl EventLoop {
    /// Creates an event loop running on wall clock time.
    pub fn new() -> Self {
        Self::with_clock(WallClock::new())
    }

    /// Creates an event loop running on a [`VirtualClock`].
    pub fn with_virtual_clock() -> Self {
        Self::with_clock(VirtualClock::new())
    }

    /// Creates an event loop driven by the given time source.
    pub fn with_clock<C: TimeSource + 'static>(clock: C) -> Self {
        Self {
            shared: Rc::new(Shared {
                clock: Box::new(clock),
                tasks: RefCell::new(HashMap::new()),
                run_queue: RunQueue::new(),
                timers: RefCell::new(TimerQueue::new()),
                next_task_id: Cell::new(0),
            }),
        }
    }

    /// Returns a handle for scheduling work on this loop.
    pub fn handle(&self) -> Handle {
        Handle {
            shared: self.shared.clone(),
        }
    }

    /// Time elapsed on this loop's clock since the loop was created.
    pub fn now(&self) -> Duration {
        self.shared.clock.now()
    }

    /// Drives the loop until `future` completes and returns its output.
    ///
    /// Spawned tasks and timers make progress alongside the future. Work that
    /// is still outstanding when the future completes stays queued.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::Stalled`] if the future is still pending while
    /// no task is runnable and no timer is left to fire.
    pub fn block_on<F: Future>(&mut self, future: F) -> Result<F::Output, RuntimeError> {
        let mut future = pin!(future);
        let main = Arc::new(MainWaker {
            woken: AtomicBool::new(true),
        });
        let waker = waker_ref(&main);
        let mut cx = Context::from_waker(&waker);

        loop {
            if main.woken.swap(false, Ordering::AcqRel) {
                if let Poll::Ready(output) = future.as_mut().poll(&mut cx) {
                    return Ok(output);
                }
            }

            self.shared.turn();

            if main.woken.load(Ordering::Acquire) || !self.shared.run_queue.is_empty() {
                continue;
            }
            if !self.shared.idle() {
                let pending_tasks = self.pending_tasks();
                debug!(pending_tasks, "block_on stalled");
                return Err(RuntimeError::Stalled { pending_tasks });
            }
        }
    }

    /// Runs the loop until no task is runnable and no timer is pending.
    ///
    /// Tasks that are suspended on something that will never settle remain
    /// in the loop; see [`EventLoop::pending_tasks`].
    pub fn run_until_done(&mut self) {
        loop {
            self.shared.turn();
            if !self.shared.run_queue.is_empty() {
                continue;
            }
            if !self.shared.idle() {
                break;
            }
        }
        debug!(
            pending_tasks = self.pending_tasks(),
            now = ?self.now(),
            "event loop drained"
        );
    }

    /// Processes one turn: every woken task once, then every expired timer.
    ///
    /// Does not wait for future timers. Returns the number of task polls and
    /// timer callbacks performed.
    pub fn turn(&mut self) -> usize {
        self.shared.turn()
    }

    /// Returns true if no task is waiting to be polled.
    pub fn is_run_queue_empty(&self) -> bool {
        self.shared.run_queue.is_empty()
    }

    /// Number of spawned tasks that have not finished.
    pub fn pending_tasks(&self) -> usize {
        self.shared.tasks.borrow().len()
    }

    /// Number of timers that have not fired.
    pub fn pending_timers(&self) -> usize {
        self.shared.timers.borrow().len()
    }
}

impl Default for EventLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventLoop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventLoop")
            .field("now", &self.now())
            .field("pending_tasks", &self.pending_tasks())
            .field("pending_timers", &self.pending_timers())
            .finish()
    }
}

struct MainWaker {
    woken: AtomicBool,
}

impl ArcWake for MainWaker {
    fn wake_by_ref(arc_self: &Arc<Self>) {
        arc_self.woken.store(true, Ordering::Release);
    }
}

/// A cloneable reference to an [`EventLoop`].
///
/// Handles are single-threaded (`!Send`), like the loop itself.
#[derive(Clone)]
pub struct Handle {
    shared: Rc<Shared>,
}

impl Handle {
    /// Spawns a future as a task on the loop.
    ///
    /// The task is polled for the first time on the next turn.
    pub fn spawn<F>(&self, future: F) -> TaskId
    where
        F: Future<Output = ()> + 'static,
    {
        let id = TaskId(self.shared.next_task_id.get());
        self.shared.next_task_id.set(id.0 + 1);
        let task = Task::new(id, future.boxed_local(), &self.shared.run_queue);
        self.shared.tasks.borrow_mut().insert(id, task);
        debug!(task = %id, "spawned task");
        id
    }

    /// Runs `callback` once `delay` has elapsed on the loop's clock.
    ///
    /// Deadlines saturate at `Duration::MAX`; such a timer never fires.
    pub fn set_timeout<F>(&self, delay: Duration, callback: F) -> TimerId
    where
        F: FnOnce() + 'static,
    {
        let deadline = self.shared.clock.now().saturating_add(delay);
        let id = self
            .shared
            .timers
            .borrow_mut()
            .insert(deadline, Box::new(callback));
        trace!(timer = %id, delay = ?delay, deadline = ?deadline, "timer registered");
        id
    }

    /// Returns a future that completes once `delay` has elapsed.
    pub fn sleep(&self, delay: Duration) -> Sleep {
        let deadline = self.shared.clock.now().saturating_add(delay);
        let (sleep, fire) = Sleep::arm(deadline);
        let id = self.shared.timers.borrow_mut().insert(deadline, fire);
        trace!(timer = %id, delay = ?delay, "sleep registered");
        sleep
    }

    /// Time elapsed on the loop's clock since the loop was created.
    pub fn now(&self) -> Duration {
        self.shared.clock.now()
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle").field("now", &self.now()).finish()
    }
}
