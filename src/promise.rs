// src/promise.rs

//! One-shot promise with synchronous continuations.
//!
//! A [`Promise`] starts out pending and settles at most once, either with a
//! value ([`Promise::resolve`]) or by being given up on
//! ([`Promise::abandon`]). Continuations registered with [`Promise::then`]
//! run synchronously:
//!
//! - on an already-resolved promise, before `then` returns;
//! - on a pending promise, from inside `resolve`, in registration order.
//!
//! Each continuation produces a downstream promise, so resolution cascades
//! depth-first through a `then` chain. There is no error channel; an action
//! that can fail should resolve with a `Result`.
//!
//! Handles are cheap clones of one shared state. The state lock is never
//! held while a continuation runs, so continuations are free to touch any
//! promise (including the one that triggered them).

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::oneshot;
use tracing::{debug, error, trace, warn};

use crate::errors::{Result, TickQueueError};

/// Continuation stored on a pending promise.
///
/// Called with `Some(value)` on resolution and `None` on abandonment.
type Waiter<T> = Box<dyn FnOnce(Option<T>) + Send + 'static>;

enum State<T> {
    Pending(Vec<Waiter<T>>),
    Resolved(T),
    Abandoned,
}

/// A one-shot container for a value that may not exist yet.
pub struct Promise<T> {
    state: Arc<Mutex<State<T>>>,
}

impl<T> Promise<T> {
    /// Create a new, pending promise.
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(State::Pending(Vec::new()))),
        }
    }

    /// Create a promise that is already resolved with `value`.
    pub fn resolved(value: T) -> Self {
        Self {
            state: Arc::new(Mutex::new(State::Resolved(value))),
        }
    }

    /// True once the promise holds a value.
    pub fn is_settled(&self) -> bool {
        matches!(*self.lock(), State::Resolved(_))
    }

    /// True if the promise was abandoned and will never hold a value.
    pub fn is_abandoned(&self) -> bool {
        matches!(*self.lock(), State::Abandoned)
    }

    fn lock(&self) -> MutexGuard<'_, State<T>> {
        // Continuations run outside the lock, so poisoning can only come
        // from a panicking `Clone`/`Debug` impl; the state is still valid.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> Promise<T>
where
    T: Clone + Send + 'static,
{
    /// Current value, if resolved.
    pub fn value(&self) -> Option<T> {
        match &*self.lock() {
            State::Resolved(value) => Some(value.clone()),
            _ => None,
        }
    }

    /// Settle the promise with `value` and run every stored continuation.
    ///
    /// Resolving a promise that has already settled is a scheduling bug: it
    /// is logged and reported as [`TickQueueError::AlreadySettled`], and the
    /// stored value is left untouched.
    pub fn resolve(&self, value: T) -> Result<()> {
        let waiters = {
            let mut state = self.lock();
            match std::mem::replace(&mut *state, State::Resolved(value.clone())) {
                State::Pending(waiters) => waiters,
                previous => {
                    *state = previous;
                    error!("attempted to resolve a promise that has already settled");
                    return Err(TickQueueError::AlreadySettled);
                }
            }
        };

        trace!(waiters = waiters.len(), "promise resolved; running continuations");
        for waiter in waiters {
            waiter(Some(value.clone()));
        }
        Ok(())
    }

    /// Give up on a pending promise.
    ///
    /// Stored continuations are dropped without running and their downstream
    /// promises are abandoned in turn. Has no effect on a settled promise.
    pub fn abandon(&self) {
        let waiters = {
            let mut state = self.lock();
            match &mut *state {
                State::Pending(waiters) => {
                    let waiters = std::mem::take(waiters);
                    *state = State::Abandoned;
                    waiters
                }
                _ => return,
            }
        };

        debug!(waiters = waiters.len(), "promise abandoned");
        for waiter in waiters {
            waiter(None);
        }
    }

    /// Register a continuation and return the promise of its result.
    ///
    /// If this promise is already resolved, `callback` runs before `then`
    /// returns. If it is pending, `callback` runs later from inside
    /// [`Promise::resolve`]. If it was abandoned, `callback` is dropped and
    /// the returned promise is abandoned too.
    ///
    /// A panicking callback is caught and logged; its downstream promise is
    /// abandoned and the remaining continuations still run.
    pub fn then<U, F>(&self, callback: F) -> Promise<U>
    where
        U: Clone + Send + 'static,
        F: FnOnce(T) -> U + Send + 'static,
    {
        let downstream = Promise::new();
        let next = downstream.clone();
        let waiter: Waiter<T> = Box::new(move |outcome| match outcome {
            Some(value) => run_continuation(callback, value, &next),
            None => next.abandon(),
        });

        let outcome = {
            let mut state = self.lock();
            match &mut *state {
                State::Pending(waiters) => {
                    waiters.push(waiter);
                    return downstream;
                }
                State::Resolved(value) => Some(value.clone()),
                State::Abandoned => None,
            }
        };

        waiter(outcome);
        downstream
    }

    /// Wait asynchronously for the value.
    ///
    /// Returns [`TickQueueError::Abandoned`] if the promise is abandoned
    /// instead of resolved.
    pub async fn wait(&self) -> Result<T> {
        let (tx, rx) = oneshot::channel();
        let _ = self.then(move |value| {
            let _ = tx.send(value);
        });
        rx.await.map_err(|_| TickQueueError::Abandoned)
    }
}

impl<T> Clone for Promise<T> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

impl<T> Default for Promise<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for Promise<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        let mut out = f.debug_struct("Promise");
        match &*state {
            State::Pending(waiters) => out.field("state", &"pending").field("waiters", &waiters.len()),
            State::Resolved(value) => out.field("state", &"resolved").field("value", value),
            State::Abandoned => out.field("state", &"abandoned"),
        };
        out.finish()
    }
}

fn run_continuation<T, U, F>(callback: F, value: T, next: &Promise<U>)
where
    U: Clone + Send + 'static,
    F: FnOnce(T) -> U,
{
    match panic::catch_unwind(AssertUnwindSafe(move || callback(value))) {
        Ok(result) => {
            if next.resolve(result).is_err() {
                warn!("downstream promise was settled elsewhere; continuation result dropped");
            }
        }
        Err(payload) => {
            error!(
                panic = %panic_message(payload.as_ref()),
                "promise continuation panicked; abandoning downstream promise"
            );
            next.abandon();
        }
    }
}

/// Best-effort text of a caught panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        msg
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.as_str()
    } else {
        "non-string panic payload"
    }
}
