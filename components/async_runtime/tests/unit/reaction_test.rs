//! Unit tests for reaction handlers

use async_runtime::{
    always_fulfills, always_rejects, Deferred, EventLoop, Reactions, DEFAULT_DELAY,
};
use core_types::{DeferredError, FutureValue};
use std::cell::RefCell;
use std::rc::Rc;

type Log = Rc<RefCell<Vec<String>>>;

fn log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

fn recording_reactions(log: &Log) -> Reactions<FutureValue, DeferredError> {
    let (ok, err, fin) = (log.clone(), log.clone(), log.clone());
    Reactions::new()
        .on_fulfilled(move |v: &FutureValue| {
            ok.borrow_mut().push(format!("fulfilled {}", v.first_name))
        })
        .on_rejected(move |e: &DeferredError| {
            err.borrow_mut().push(format!("rejected {}", e.message))
        })
        .on_finally(move || fin.borrow_mut().push("finally".to_string()))
}

#[test]
fn fulfilled_runs_fulfillment_then_finally() {
    let mut el = EventLoop::with_virtual_clock();
    let events = log();
    let deferred = Deferred::new(always_fulfills(&el.handle(), DEFAULT_DELAY));
    deferred.react(recording_reactions(&events));

    assert!(events.borrow().is_empty());
    el.run_until_done();
    assert_eq!(*events.borrow(), vec!["fulfilled Nadia", "finally"]);
}

#[test]
fn rejected_runs_rejection_then_finally() {
    let mut el = EventLoop::with_virtual_clock();
    let events = log();
    let deferred = Deferred::new(always_rejects(&el.handle(), DEFAULT_DELAY));
    deferred.react(recording_reactions(&events));

    el.run_until_done();
    assert_eq!(*events.borrow(), vec!["rejected this promise failed", "finally"]);
}

#[test]
fn handlers_attached_after_settlement_still_run() {
    let events = log();
    let deferred: Deferred<FutureValue> = Deferred::resolved(FutureValue::new("Late", "Comer"));
    deferred.react(recording_reactions(&events));
    assert_eq!(*events.borrow(), vec!["fulfilled Late", "finally"]);
}

#[test]
fn handlers_run_once_even_if_signalled_twice() {
    let events = log();
    let (deferred, resolver, rejecter) = Deferred::<FutureValue>::pending();
    deferred.react(recording_reactions(&events));

    resolver.resolve(FutureValue::new("Nadia", "Idris"));
    resolver.resolve(FutureValue::new("Other", "Name"));
    rejecter.reject(DeferredError::producer_failure("late"));

    assert_eq!(*events.borrow(), vec!["fulfilled Nadia", "finally"]);
}

#[test]
fn separate_reaction_sets_run_in_attachment_order() {
    let events = log();
    let (deferred, resolver, _) = Deferred::<u8>::pending();
    for name in ["first", "second", "third"] {
        let e = events.clone();
        deferred.then(move |_| e.borrow_mut().push(name.to_string()));
    }
    resolver.resolve(0);
    assert_eq!(*events.borrow(), vec!["first", "second", "third"]);
}

#[test]
fn then_catch_finally_chain_routes_rejection_to_catch() {
    let mut el = EventLoop::with_virtual_clock();
    let events = log();
    let (ok, err, fin) = (events.clone(), events.clone(), events.clone());

    Deferred::new(always_rejects(&el.handle(), DEFAULT_DELAY))
        .then(move |v| ok.borrow_mut().push(v.to_string()))
        .catch(move |e| err.borrow_mut().push(e.to_string()))
        .finally(move || fin.borrow_mut().push("done".to_string()));

    el.run_until_done();
    assert_eq!(*events.borrow(), vec!["Error: this promise failed", "done"]);
}

#[test]
fn chain_without_rejection_handler_surfaces_error_when_awaited() {
    let mut el = EventLoop::with_virtual_clock();
    let deferred = Deferred::new(always_rejects(&el.handle(), DEFAULT_DELAY));
    let chained = deferred.then(|_| {}).finally(|| {});

    let outcome = el.block_on(chained).unwrap();
    assert_eq!(outcome.unwrap_err().message, "this promise failed");
}

#[test]
fn handler_may_inspect_its_own_deferred() {
    let (deferred, resolver, _) = Deferred::<u8>::pending();
    let inner = deferred.clone();
    let seen = Rc::new(RefCell::new(None));
    let s = seen.clone();
    deferred.then(move |_| *s.borrow_mut() = Some(inner.state()));
    resolver.resolve(1);
    assert_eq!(*seen.borrow(), Some(async_runtime::DeferredState::Fulfilled));
}
