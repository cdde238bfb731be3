// src/engine/backlog.rs

use std::collections::VecDeque;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, error, warn};

use crate::errors::{Result, TickQueueError};
use crate::promise::{panic_message, Promise};
use crate::types::OverflowBehaviour;

use super::{TaskId, TickOutcome};

type RunFn<C> = Box<dyn FnOnce(&mut C) + Send + 'static>;
type AbandonFn = Box<dyn FnOnce() + Send + 'static>;

/// A submitted action paired with the promise handed back to its submitter.
///
/// The action's return type is erased: `run` executes the action and
/// resolves the promise with its result, `abandon` gives up on the promise.
/// At most one of the two is ever called. A task dropped without running
/// abandons its promise, so no submitter is left waiting forever.
pub struct PendingTask<C> {
    id: TaskId,
    run: Option<RunFn<C>>,
    abandon: Option<AbandonFn>,
}

impl<C> PendingTask<C> {
    /// Wrap `action` into a task and return the promise of its result.
    pub fn new<R, F>(id: TaskId, action: F) -> (Self, Promise<R>)
    where
        R: Clone + Send + 'static,
        F: FnOnce(&mut C) -> R + Send + 'static,
    {
        let promise = Promise::new();
        let on_run = promise.clone();
        let on_abandon = promise.clone();

        let task = Self {
            id,
            run: Some(Box::new(move |context: &mut C| {
                let value = action(context);
                if on_run.resolve(value).is_err() {
                    warn!(task_id = id, "task promise settled before its action finished");
                }
            })),
            abandon: Some(Box::new(move || on_abandon.abandon())),
        };

        (task, promise)
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Run the action against `context` and resolve the task's promise.
    ///
    /// A panicking action is isolated: the panic is logged, the promise is
    /// abandoned and the caller can carry on with the next task.
    pub fn execute(mut self, context: &mut C) -> TickOutcome {
        let id = self.id;
        let abandon = self.abandon.take();
        let Some(run) = self.run.take() else {
            return TickOutcome::Idle;
        };
        debug!(task_id = id, "running task");

        match panic::catch_unwind(AssertUnwindSafe(move || run(context))) {
            Ok(()) => TickOutcome::Completed(id),
            Err(payload) => {
                error!(
                    task_id = id,
                    panic = %panic_message(payload.as_ref()),
                    "task action panicked; continuing with the next task"
                );
                if let Some(abandon) = abandon {
                    abandon();
                }
                TickOutcome::Panicked(id)
            }
        }
    }

    /// Drop the task without running it, abandoning its promise.
    pub fn abandon(mut self) {
        self.give_up();
    }

    fn give_up(&mut self) {
        self.run = None;
        if let Some(abandon) = self.abandon.take() {
            debug!(task_id = self.id, "abandoning task without running it");
            abandon();
        }
    }
}

impl<C> Drop for PendingTask<C> {
    fn drop(&mut self) {
        self.give_up();
    }
}

impl<C> fmt::Debug for PendingTask<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingTask")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

/// FIFO backlog of deferred tasks.
///
/// Semantics:
/// - Tasks leave the backlog in exactly the order they were pushed.
/// - `max_len` (if set) bounds the number of pending tasks. What happens at
///   the bound is decided by [`OverflowBehaviour`].
/// - Once closed, every pending task is abandoned and further pushes fail
///   with [`TickQueueError::Stopped`]. Dropping the backlog abandons its
///   tasks as well.
pub struct Backlog<C> {
    tasks: VecDeque<PendingTask<C>>,
    max_len: Option<usize>,
    overflow: OverflowBehaviour,
    next_id: TaskId,
    closed: bool,
}

impl<C> Backlog<C> {
    /// Create an empty backlog.
    ///
    /// A `max_len` of zero is clamped to 1, as a backlog that can hold
    /// nothing would reject (or drop) every task.
    pub fn new(max_len: Option<usize>, overflow: OverflowBehaviour) -> Self {
        Self {
            tasks: VecDeque::new(),
            max_len: max_len.map(|n| n.max(1)),
            overflow,
            next_id: 0,
            closed: false,
        }
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Allocate the next task id.
    ///
    /// Immediate submissions never enter the backlog but still draw their id
    /// from here so ids stay unique per queue.
    pub fn next_task_id(&mut self) -> TaskId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Append a deferred task and return the promise of its result.
    pub fn push<R, F>(&mut self, action: F) -> Result<Promise<R>>
    where
        R: Clone + Send + 'static,
        F: FnOnce(&mut C) -> R + Send + 'static,
    {
        if self.closed {
            return Err(TickQueueError::Stopped);
        }

        if let Some(capacity) = self.max_len {
            self.make_room(capacity)?;
        }

        let id = self.next_task_id();
        let (task, promise) = PendingTask::new(id, action);
        self.tasks.push_back(task);
        debug!(task_id = id, pending = self.tasks.len(), "task queued");

        Ok(promise)
    }

    fn make_room(&mut self, capacity: usize) -> Result<()> {
        if self.tasks.len() < capacity {
            return Ok(());
        }

        match self.overflow {
            OverflowBehaviour::Reject => {
                warn!(capacity, "backlog full; rejecting task");
                Err(TickQueueError::BacklogFull { capacity })
            }
            OverflowBehaviour::DropOldest => {
                while self.tasks.len() >= capacity {
                    let Some(oldest) = self.tasks.pop_front() else {
                        break;
                    };
                    warn!(
                        task_id = oldest.id(),
                        capacity,
                        "backlog full; dropping oldest pending task"
                    );
                    oldest.abandon();
                }
                Ok(())
            }
        }
    }

    /// Remove the head of the backlog, if any.
    pub fn pop_front(&mut self) -> Option<PendingTask<C>> {
        self.tasks.pop_front()
    }

    /// Close the backlog and abandon every pending task.
    ///
    /// Returns how many tasks were abandoned.
    pub fn close(&mut self) -> usize {
        self.closed = true;
        let abandoned = self.tasks.len();
        for task in self.tasks.drain(..) {
            task.abandon();
        }
        abandoned
    }
}

impl<C> fmt::Debug for Backlog<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Backlog")
            .field("pending", &self.tasks.len())
            .field("max_len", &self.max_len)
            .field("overflow", &self.overflow)
            .field("closed", &self.closed)
            .finish()
    }
}

/// Lock a shared backlog.
///
/// Actions never run while the lock is held, so a poisoned lock still
/// guards a consistent backlog.
pub(crate) fn lock_backlog<C>(backlog: &Mutex<Backlog<C>>) -> MutexGuard<'_, Backlog<C>> {
    backlog.lock().unwrap_or_else(PoisonError::into_inner)
}
