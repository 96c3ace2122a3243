//! Spawned tasks and the run queue feeding the event loop.
//!
//! A task is a boxed future owned by the event loop. Its waker pushes the
//! task id onto the shared [`RunQueue`]; the loop pops ids in FIFO order and
//! polls the matching task once per turn.

use futures::future::LocalBoxFuture;
use futures::task::{waker_ref, ArcWake};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};

/// Identifier of a task spawned on an event loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(pub(crate) u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task#{}", self.0)
    }
}

/// FIFO queue of task ids that are ready to be polled.
///
/// Wakers must be `Send + Sync`, so the queue is shared through an
/// `Arc<Mutex<_>>` even though only one thread ever drains it.
#[derive(Debug, Clone, Default)]
pub(crate) struct RunQueue {
    queue: Arc<Mutex<VecDeque<TaskId>>>,
}

impl RunQueue {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Adds a task id to the end of the queue.
    pub(crate) fn push(&self, id: TaskId) {
        self.queue.lock().push_back(id);
    }

    /// Removes every queued id, preserving order.
    ///
    /// Ids pushed while the caller processes the returned batch land in the
    /// next batch.
    pub(crate) fn take_batch(&self) -> Vec<TaskId> {
        self.queue.lock().drain(..).collect()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.queue.lock().is_empty()
    }
}

/// Waker for a single task.
///
/// `queued` suppresses duplicate entries when a task is woken several times
/// before it is polled again.
struct TaskWaker {
    id: TaskId,
    queued: AtomicBool,
    run_queue: RunQueue,
}

impl ArcWake for TaskWaker {
    fn wake_by_ref(arc_self: &Arc<Self>) {
        if !arc_self.queued.swap(true, Ordering::AcqRel) {
            arc_self.run_queue.push(arc_self.id);
        }
    }
}

/// A future spawned onto the event loop.
pub(crate) struct Task {
    future: LocalBoxFuture<'static, ()>,
    waker: Arc<TaskWaker>,
}

impl Task {
    /// Creates a task and schedules its first poll.
    pub(crate) fn new(
        id: TaskId,
        future: LocalBoxFuture<'static, ()>,
        run_queue: &RunQueue,
    ) -> Self {
        let waker = Arc::new(TaskWaker {
            id,
            queued: AtomicBool::new(true),
            run_queue: run_queue.clone(),
        });
        run_queue.push(id);
        Self { future, waker }
    }

    /// Polls the task once.
    pub(crate) fn poll(&mut self) -> Poll<()> {
        self.waker.queued.store(false, Ordering::Release);
        let waker = waker_ref(&self.waker);
        let mut cx = Context::from_waker(&waker);
        self.future.as_mut().poll(&mut cx)
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Task {{ id: {} }}", self.waker.id)
    }
}
