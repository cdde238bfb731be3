// src/engine/mod.rs

//! Serialized task queue engine.
//!
//! This module ties together:
//! - the FIFO backlog of pending tasks and its overflow policy ([`backlog`])
//! - a pure, tick-driven queue that owns its context ([`core`])
//! - the async worker that drains the backlog on a fixed cadence and runs
//!   immediate submissions on the same serialization point ([`worker`])
//!
//! Every action runs against one shared context, one at a time. Callers
//! observe completion only through the [`Promise`](crate::promise::Promise)
//! returned at submission.

use std::time::Duration;

/// Monotonic identifier assigned to every submitted task (used for logs).
pub type TaskId = u64;

/// Drain cadence used when none is configured.
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(200);

/// Result of a single drain step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The backlog was empty; nothing ran.
    Idle,
    /// The task ran and its promise was resolved.
    Completed(TaskId),
    /// The task's action panicked; its promise was abandoned.
    Panicked(TaskId),
}

/// Options shared by [`ManualQueue`] and [`TaskQueue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueOptions {
    /// Time between drain ticks (ignored by [`ManualQueue`]).
    pub interval: Duration,
    /// Maximum number of pending deferred tasks. `None` means unbounded.
    pub max_backlog: Option<usize>,
    /// What to do when a deferred task arrives at a full backlog.
    pub overflow: OverflowBehaviour,
}

impl Default for QueueOptions {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            max_backlog: None,
            overflow: OverflowBehaviour::default(),
        }
    }
}

pub mod backlog;
pub mod core;
pub mod worker;

pub use backlog::{Backlog, PendingTask};
pub use self::core::ManualQueue;
pub use crate::types::OverflowBehaviour;
pub use worker::TaskQueue;
