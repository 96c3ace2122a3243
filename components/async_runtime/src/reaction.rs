//! Reaction handlers attached to a deferred value.
//!
//! Reactions are the callback style of consuming a [`Deferred`]: a
//! fulfillment handler, a rejection handler and a finally handler. For one
//! settlement exactly one of the first two runs, then the finally handler.

use crate::deferred::Deferred;
use std::fmt;

type OnFulfilled<T> = Box<dyn FnOnce(&T)>;
type OnRejected<E> = Box<dyn FnOnce(&E)>;
type OnFinally = Box<dyn FnOnce()>;

/// A set of handlers to attach with [`Deferred::react`].
///
/// # Examples
///
/// ```
/// use async_runtime::{Deferred, Reactions};
/// use std::cell::RefCell;
/// use std::rc::Rc;
///
/// let log = Rc::new(RefCell::new(Vec::new()));
/// let (deferred, resolver, _) = Deferred::<u32>::pending();
///
/// let (on_ok, on_done) = (log.clone(), log.clone());
/// deferred.react(
///     Reactions::new()
///         .on_fulfilled(move |v: &u32| on_ok.borrow_mut().push(format!("value {v}")))
///         .on_finally(move || on_done.borrow_mut().push("finally".to_string())),
/// );
///
/// resolver.resolve(7);
/// assert_eq!(*log.borrow(), vec!["value 7", "finally"]);
/// ```
pub struct Reactions<T, E> {
    on_fulfilled: Option<OnFulfilled<T>>,
    on_rejected: Option<OnRejected<E>>,
    on_finally: Option<OnFinally>,
}

impl<T, E> Reactions<T, E> {
    /// An empty set of handlers.
    pub fn new() -> Self {
        Self {
            on_fulfilled: None,
            on_rejected: None,
            on_finally: None,
        }
    }

    /// Sets the handler run with the value on fulfillment.
    pub fn on_fulfilled<F>(mut self, handler: F) -> Self
    where
        F: FnOnce(&T) + 'static,
    {
        self.on_fulfilled = Some(Box::new(handler));
        self
    }

    /// Sets the handler run with the error on rejection.
    ///
    /// Supplying one marks the rejection as handled for the chained value.
    pub fn on_rejected<F>(mut self, handler: F) -> Self
    where
        F: FnOnce(&E) + 'static,
    {
        self.on_rejected = Some(Box::new(handler));
        self
    }

    /// Sets the handler run after either outcome.
    pub fn on_finally<F>(mut self, handler: F) -> Self
    where
        F: FnOnce() + 'static,
    {
        self.on_finally = Some(Box::new(handler));
        self
    }
}

impl<T, E> Default for Reactions<T, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E> fmt::Debug for Reactions<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reactions")
            .field("on_fulfilled", &self.on_fulfilled.is_some())
            .field("on_rejected", &self.on_rejected.is_some())
            .field("on_finally", &self.on_finally.is_some())
            .finish()
    }
}

impl<T: Clone + 'static, E: Clone + 'static> Deferred<T, E> {
    /// Attaches `reactions` and returns a value for the rest of the chain.
    ///
    /// Handlers run when this value settles, or immediately if it already
    /// has. The returned value fulfills with `()` after the handlers ran,
    /// except when this value rejects and no rejection handler was given:
    /// then it rejects with the same error, so the failure surfaces wherever
    /// the chain is awaited or caught.
    pub fn react(&self, reactions: Reactions<T, E>) -> Deferred<(), E> {
        let (chained, resolver, rejecter) = Deferred::<(), E>::pending();
        let Reactions {
            on_fulfilled,
            on_rejected,
            on_finally,
        } = reactions;

        self.on_settled(Box::new(move |outcome: &Result<T, E>| {
            let unhandled = match outcome {
                Ok(value) => {
                    if let Some(handler) = on_fulfilled {
                        handler(value);
                    }
                    None
                }
                Err(error) => match on_rejected {
                    Some(handler) => {
                        handler(error);
                        None
                    }
                    None => Some(error.clone()),
                },
            };
            if let Some(handler) = on_finally {
                handler();
            }
            match unhandled {
                Some(error) => rejecter.reject(error),
                None => resolver.resolve(()),
            };
        }));

        chained
    }

    /// Attaches a fulfillment handler.
    pub fn then<F>(&self, handler: F) -> Deferred<(), E>
    where
        F: FnOnce(&T) + 'static,
    {
        self.react(Reactions::new().on_fulfilled(handler))
    }

    /// Attaches a rejection handler.
    pub fn catch<F>(&self, handler: F) -> Deferred<(), E>
    where
        F: FnOnce(&E) + 'static,
    {
        self.react(Reactions::new().on_rejected(handler))
    }

    /// Attaches a handler that runs after either outcome.
    pub fn finally<F>(&self, handler: F) -> Deferred<(), E>
    where
        F: FnOnce() + 'static,
    {
        self.react(Reactions::new().on_finally(handler))
    }
}
