//! Unit tests for EventLoop

use async_runtime::{EventLoop, RuntimeError};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

#[test]
fn new_event_loop_is_idle() {
    let el = EventLoop::with_virtual_clock();
    assert!(el.is_run_queue_empty());
    assert_eq!(el.pending_tasks(), 0);
    assert_eq!(el.pending_timers(), 0);
    assert_eq!(el.now(), Duration::ZERO);
}

#[test]
fn set_timeout_registers_timer() {
    let el = EventLoop::with_virtual_clock();
    el.handle().set_timeout(Duration::from_secs(1), || {});
    assert_eq!(el.pending_timers(), 1);
}

#[test]
fn turn_does_not_wait_for_future_timers() {
    let mut el = EventLoop::with_virtual_clock();
    let fired = Rc::new(Cell::new(false));
    let f = fired.clone();
    el.handle().set_timeout(Duration::from_secs(1), move || f.set(true));

    assert_eq!(el.turn(), 0);
    assert!(!fired.get());
    assert_eq!(el.now(), Duration::ZERO);
}

#[test]
fn zero_delay_timer_fires_on_first_turn() {
    let mut el = EventLoop::with_virtual_clock();
    let fired = Rc::new(Cell::new(false));
    let f = fired.clone();
    el.handle().set_timeout(Duration::ZERO, move || f.set(true));

    assert_eq!(el.turn(), 1);
    assert!(fired.get());
}

#[test]
fn timers_fire_in_deadline_order() {
    let mut el = EventLoop::with_virtual_clock();
    let handle = el.handle();
    let order = Rc::new(RefCell::new(vec![]));

    for (label, secs) in [('c', 3), ('a', 1), ('b', 2), ('a', 1)] {
        let o = order.clone();
        handle.set_timeout(Duration::from_secs(secs), move || o.borrow_mut().push(label));
    }

    el.run_until_done();
    assert_eq!(*order.borrow(), vec!['a', 'a', 'b', 'c']);
    assert_eq!(el.now(), Duration::from_secs(3));
}

#[test]
fn timer_callbacks_may_schedule_more_timers() {
    let mut el = EventLoop::with_virtual_clock();
    let handle = el.handle();
    let ticks = Rc::new(Cell::new(0));

    let (h, t) = (handle.clone(), ticks.clone());
    handle.set_timeout(Duration::from_secs(1), move || {
        t.set(t.get() + 1);
        let t2 = t.clone();
        h.set_timeout(Duration::from_secs(1), move || t2.set(t2.get() + 1));
    });

    el.run_until_done();
    assert_eq!(ticks.get(), 2);
    assert_eq!(el.now(), Duration::from_secs(2));
}

#[test]
fn tasks_may_spawn_tasks() {
    let mut el = EventLoop::with_virtual_clock();
    let handle = el.handle();
    let ran = Rc::new(Cell::new(0));

    let (h, r) = (handle.clone(), ran.clone());
    handle.spawn(async move {
        r.set(r.get() + 1);
        let r2 = r.clone();
        h.spawn(async move { r2.set(r2.get() + 1) });
    });

    el.run_until_done();
    assert_eq!(ran.get(), 2);
}

#[test]
fn sleeping_tasks_resume_after_delay() {
    let mut el = EventLoop::with_virtual_clock();
    let handle = el.handle();
    let woke_at = Rc::new(Cell::new(None));

    let (h, w) = (handle.clone(), woke_at.clone());
    handle.spawn(async move {
        h.sleep(Duration::from_millis(1500)).await;
        w.set(Some(h.now()));
    });

    el.run_until_done();
    assert_eq!(woke_at.get(), Some(Duration::from_millis(1500)));
}

#[test]
fn block_on_returns_output_while_tasks_progress() {
    let mut el = EventLoop::with_virtual_clock();
    let handle = el.handle();
    let background = Rc::new(Cell::new(false));

    let (h, b) = (handle.clone(), background.clone());
    handle.spawn(async move {
        h.sleep(Duration::from_secs(1)).await;
        b.set(true);
    });

    let output = el
        .block_on(async move {
            handle.sleep(Duration::from_secs(2)).await;
            "main done"
        })
        .unwrap();

    assert_eq!(output, "main done");
    assert!(background.get());
}

#[test]
fn block_on_stalled_counts_suspended_tasks() {
    let mut el = EventLoop::with_virtual_clock();
    el.handle().spawn(futures::future::pending());
    let result = el.block_on(futures::future::pending::<()>());
    assert_eq!(result, Err(RuntimeError::Stalled { pending_tasks: 1 }));
}

#[test]
fn wall_clock_loop_really_waits() {
    let mut el = EventLoop::new();
    let handle = el.handle();
    el.block_on(async move { handle.sleep(Duration::from_millis(20)).await })
        .unwrap();
    assert!(el.now() >= Duration::from_millis(20));
}

#[test]
fn max_delay_saturates_after_time_has_passed() {
    let mut el = EventLoop::with_virtual_clock();
    let handle = el.handle();
    let h = handle.clone();
    el.block_on(async move { h.sleep(Duration::from_secs(1)).await })
        .unwrap();
    assert_eq!(el.now(), Duration::from_secs(1));

    let fired = Rc::new(Cell::new(false));
    let f = fired.clone();
    handle.set_timeout(Duration::MAX, move || f.set(true));
    let _sleep = handle.sleep(Duration::MAX);
    assert_eq!(el.pending_timers(), 2);

    assert_eq!(el.turn(), 0);
    assert!(!fired.get());
}
