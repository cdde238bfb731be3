// src/engine/core.rs

//! Pure, tick-driven task queue.
//!
//! [`ManualQueue`] owns its context and backlog and runs nothing on its own:
//! each call to [`ManualQueue::tick`] drains at most one task. It has no
//! channels, no Tokio types and no timers, so queue semantics can be tested
//! deterministically. The async [`TaskQueue`](super::TaskQueue) drives the
//! same [`Backlog`] from a timer.

use std::fmt;

use tracing::debug;

use crate::errors::{Result, TickQueueError};
use crate::promise::Promise;

use super::backlog::{Backlog, PendingTask};
use super::{QueueOptions, TickOutcome};

/// A task queue drained by explicit ticks.
pub struct ManualQueue<C> {
    context: C,
    backlog: Backlog<C>,
}

impl<C> ManualQueue<C> {
    /// Create a queue with an unbounded backlog.
    pub fn new(context: C) -> Self {
        Self::with_options(context, &QueueOptions::default())
    }

    /// Create a queue using the backlog limits from `options`.
    ///
    /// `options.interval` is ignored; the caller decides when to tick.
    pub fn with_options(context: C, options: &QueueOptions) -> Self {
        Self {
            context,
            backlog: Backlog::new(options.max_backlog, options.overflow),
        }
    }

    /// Queue `action` for a later tick.
    pub fn submit<R, F>(&mut self, action: F) -> Result<Promise<R>>
    where
        R: Clone + Send + 'static,
        F: FnOnce(&mut C) -> R + Send + 'static,
    {
        self.backlog.push(action)
    }

    /// Run `action` right now, ahead of anything in the backlog.
    ///
    /// The returned promise is already resolved. If the action panics, its
    /// promise is abandoned and [`TickQueueError::Abandoned`] is returned.
    pub fn submit_immediate<R, F>(&mut self, action: F) -> Result<Promise<R>>
    where
        R: Clone + Send + 'static,
        F: FnOnce(&mut C) -> R + Send + 'static,
    {
        let id = self.backlog.next_task_id();
        let (task, promise) = PendingTask::new(id, action);
        debug!(task_id = id, "running immediate task");

        match task.execute(&mut self.context) {
            TickOutcome::Panicked(_) => Err(TickQueueError::Abandoned),
            _ => Ok(promise),
        }
    }

    /// Drain step: run the task at the head of the backlog, if any.
    pub fn tick(&mut self) -> TickOutcome {
        match self.backlog.pop_front() {
            Some(task) => task.execute(&mut self.context),
            None => TickOutcome::Idle,
        }
    }

    /// Tick until the backlog is empty. Returns how many tasks ran.
    pub fn run_until_idle(&mut self) -> usize {
        let mut ran = 0;
        while self.tick() != TickOutcome::Idle {
            ran += 1;
        }
        ran
    }

    /// Number of deferred tasks still waiting.
    pub fn pending(&self) -> usize {
        self.backlog.len()
    }

    /// Read-only view of the context.
    pub fn context(&self) -> &C {
        &self.context
    }

    /// Tear the queue down, abandoning pending tasks, and hand back the
    /// context.
    pub fn into_context(mut self) -> C {
        let abandoned = self.backlog.close();
        if abandoned > 0 {
            debug!(abandoned, "manual queue dropped with pending tasks");
        }
        self.context
    }
}

impl<C: fmt::Debug> fmt::Debug for ManualQueue<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManualQueue")
            .field("context", &self.context)
            .field("backlog", &self.backlog)
            .finish()
    }
}
