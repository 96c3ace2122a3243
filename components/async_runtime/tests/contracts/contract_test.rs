//! Contract tests for the async_runtime component
//!
//! These tests pin the observable behaviour of deferred values, the
//! demonstration producers and the aggregator.

use async_runtime::{
    all_settled, always_fulfills, always_rejects, Deferred, DeferredState, EventLoop, Reactions,
    Settlement, DEFAULT_DELAY, REJECTION_MESSAGE,
};
use core_types::{DeferredError, ErrorKind, FutureValue};
use std::cell::Cell;
use std::rc::Rc;

fn nadia() -> FutureValue {
    FutureValue::new("Nadia", "Idris")
}

mod producer_contract {
    use super::*;

    #[test]
    fn default_delay_is_two_seconds() {
        assert_eq!(DEFAULT_DELAY, std::time::Duration::from_secs(2));
    }

    #[test]
    fn always_fulfills_yields_nadia_after_delay() {
        let mut el = EventLoop::with_virtual_clock();
        let rejected = Rc::new(Cell::new(false));
        let r = rejected.clone();

        let deferred = Deferred::new(always_fulfills(&el.handle(), DEFAULT_DELAY));
        deferred.catch(move |_| r.set(true));

        let value = el.block_on(deferred.clone()).unwrap().unwrap();
        assert_eq!(value, nadia());
        assert_eq!(el.now(), DEFAULT_DELAY);
        assert!(!rejected.get());
    }

    #[test]
    fn always_rejects_raises_structured_error() {
        let mut el = EventLoop::with_virtual_clock();
        let fulfilled = Rc::new(Cell::new(false));
        let f = fulfilled.clone();

        let deferred = Deferred::new(always_rejects(&el.handle(), DEFAULT_DELAY));
        deferred.react(Reactions::new().on_fulfilled(move |_| f.set(true)).on_rejected(|_| {}));

        let error = el.block_on(deferred).unwrap().unwrap_err();
        assert_eq!(error.kind, ErrorKind::ProducerFailure);
        assert_eq!(error.message, REJECTION_MESSAGE);
        assert_eq!(error.to_string(), "Error: this promise failed");
        assert!(!fulfilled.get());
    }
}

mod reaction_contract {
    use super::*;

    fn count_handlers(deferred: &Deferred<FutureValue>) -> Rc<[Cell<u32>; 3]> {
        let counts = Rc::new([Cell::new(0), Cell::new(0), Cell::new(0)]);
        let (a, b, c) = (counts.clone(), counts.clone(), counts.clone());
        deferred.react(
            Reactions::new()
                .on_fulfilled(move |_| a[0].set(a[0].get() + 1))
                .on_rejected(move |_| b[1].set(b[1].get() + 1))
                .on_finally(move || c[2].set(c[2].get() + 1)),
        );
        counts
    }

    #[test]
    fn exactly_one_outcome_handler_and_one_finally() {
        let mut el = EventLoop::with_virtual_clock();
        let handle = el.handle();
        let ok = Deferred::new(always_fulfills(&handle, DEFAULT_DELAY));
        let err = Deferred::new(always_rejects(&handle, DEFAULT_DELAY));
        let ok_counts = count_handlers(&ok);
        let err_counts = count_handlers(&err);

        el.run_until_done();

        let read = |c: &[Cell<u32>; 3]| [c[0].get(), c[1].get(), c[2].get()];
        assert_eq!(read(&*ok_counts), [1, 0, 1]);
        assert_eq!(read(&*err_counts), [0, 1, 1]);
    }
}

mod aggregator_contract {
    use super::*;

    #[test]
    fn mixed_inputs_settle_in_input_order() {
        let mut el = EventLoop::with_virtual_clock();
        let handle = el.handle();
        let inputs = vec![
            Deferred::new(always_fulfills(&handle, DEFAULT_DELAY)),
            Deferred::new(always_rejects(&handle, DEFAULT_DELAY)),
            Deferred::new(always_fulfills(&handle, DEFAULT_DELAY)),
            Deferred::new(always_rejects(&handle, DEFAULT_DELAY)),
        ];

        let settled = el.block_on(all_settled(inputs)).unwrap();
        let failed = DeferredError::producer_failure(REJECTION_MESSAGE);
        assert_eq!(
            settled,
            vec![
                Settlement::Fulfilled(nadia()),
                Settlement::Rejected(failed.clone()),
                Settlement::Fulfilled(nadia()),
                Settlement::Rejected(failed),
            ]
        );
        assert_eq!(el.now(), DEFAULT_DELAY);
    }

    #[test]
    fn inputs_are_settled_after_aggregation() {
        let mut el = EventLoop::with_virtual_clock();
        let handle = el.handle();
        let inputs = vec![
            Deferred::new(always_fulfills(&handle, DEFAULT_DELAY)),
            Deferred::new(always_rejects(&handle, DEFAULT_DELAY)),
        ];
        let watched = inputs.clone();

        el.block_on(all_settled(inputs)).unwrap();
        assert_eq!(watched[0].state(), DeferredState::Fulfilled);
        assert_eq!(watched[1].state(), DeferredState::Rejected);
    }
}

mod sequential_contract {
    use super::*;

    #[test]
    fn sequential_awaits_take_count_times_delay() {
        let mut el = EventLoop::with_virtual_clock();
        let handle = el.handle();
        let count = 4;

        let values = el
            .block_on(async move {
                let mut values = Vec::new();
                for _ in 0..count {
                    let deferred = Deferred::new(always_fulfills(&handle, DEFAULT_DELAY));
                    values.push(deferred.await);
                }
                values
            })
            .unwrap();

        assert_eq!(values.len(), count as usize);
        assert!(values.iter().all(|v| v.as_ref() == Ok(&nadia())));
        assert_eq!(el.now(), DEFAULT_DELAY * count);
    }
}
