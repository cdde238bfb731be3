// src/script.rs

//! Script driver: feeds `[[step]]` entries through a [`TaskQueue`].
//!
//! Each step becomes one action that appends its label to a shared
//! [`Journal`]. The journal is the queue's context, so the finished journal
//! shows the order in which the queue actually ran the steps.

use tracing::{debug, info, warn};

use crate::config::ConfigFile;
use crate::engine::TaskQueue;
use crate::errors::{Result, TickQueueError};
use crate::promise::Promise;

/// Context mutated by script steps.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Journal {
    entries: Vec<String>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `label` and return its zero-based position.
    pub fn record(&mut self, label: impl Into<String>) -> usize {
        self.entries.push(label.into());
        self.entries.len() - 1
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Run every step of `cfg` through a fresh queue and return the journal.
///
/// Steps are submitted in file order. Deferred steps are queued without
/// waiting; immediate steps run on the worker before the next submission.
/// When a `reject` backlog is full, the driver waits for earlier steps to
/// finish before queueing the next one. Steps dropped by a `drop_oldest`
/// backlog are logged and skipped.
pub async fn run_script(cfg: &ConfigFile) -> Result<Journal> {
    let queue = TaskQueue::start(Journal::new(), cfg.queue.options());
    info!(
        steps = cfg.step.len(),
        interval_ms = cfg.queue.interval_ms,
        "running script"
    );

    let mut submitted: Vec<(&str, Promise<usize>)> = Vec::with_capacity(cfg.step.len());
    for step in &cfg.step {
        let promise = if step.immediate {
            queue.submit_immediate(record(step.label.clone())).await?
        } else {
            submit_when_room(&queue, &step.label, &submitted).await?
        };

        let label = step.label.clone();
        let finished = promise.then(move |position| {
            debug!(step = %label, position, "step finished");
            position
        });
        submitted.push((step.label.as_str(), finished));
    }

    for (label, finished) in submitted {
        match finished.wait().await {
            Ok(_) => {}
            Err(TickQueueError::Abandoned) => {
                warn!(step = %label, "step was dropped before it ran");
            }
            Err(e) => return Err(e),
        }
    }

    queue.shutdown().await
}

/// Action that appends `label` to the journal.
fn record(label: String) -> impl FnOnce(&mut Journal) -> usize + Send + 'static {
    move |journal: &mut Journal| journal.record(label)
}

/// Queue a deferred step, waiting on earlier steps while the backlog is
/// full. Gives up with `BacklogFull` once every earlier step has finished
/// and there is still no room.
async fn submit_when_room(
    queue: &TaskQueue<Journal>,
    label: &str,
    earlier: &[(&str, Promise<usize>)],
) -> Result<Promise<usize>> {
    let mut next_to_wait = 0;
    loop {
        match queue.submit(record(label.to_string())) {
            Err(TickQueueError::BacklogFull { capacity }) if next_to_wait < earlier.len() => {
                let (blocking, finished) = &earlier[next_to_wait];
                debug!(step = %label, capacity, waiting_on = %blocking, "backlog full; waiting for an earlier step");
                // Abandoned steps free their slot just the same.
                let _ = finished.wait().await;
                next_to_wait += 1;
            }
            other => return other,
        }
    }
}
