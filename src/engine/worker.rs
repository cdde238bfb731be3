// src/engine/worker.rs

use std::fmt;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::errors::{Result, TickQueueError};
use crate::promise::Promise;

use super::backlog::{lock_backlog, Backlog, PendingTask};
use super::QueueOptions;

/// Shortest drain interval accepted; `tokio::time::interval` rejects zero.
const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Timer-driven task queue bound to one context.
///
/// A single Tokio task (the worker) owns the context. It drains one
/// deferred task per `interval` tick and runs immediate submissions between
/// ticks, so no two actions ever touch the context at the same time.
///
/// - [`TaskQueue::submit`] appends to the backlog and returns at once.
/// - [`TaskQueue::submit_immediate`] hands the action to the worker and
///   waits for it, so it runs ahead of the backlog without racing a drain.
/// - [`TaskQueue::shutdown`] stops the worker, abandons whatever is still
///   pending and returns the context. Dropping the queue also stops the
///   worker, but the context is lost.
pub struct TaskQueue<C> {
    backlog: Arc<Mutex<Backlog<C>>>,
    immediate_tx: mpsc::UnboundedSender<PendingTask<C>>,
    stop_tx: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<C>>,
    interval: Duration,
}

impl<C> fmt::Debug for TaskQueue<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskQueue")
            .field("backlog", &*lock_backlog(&self.backlog))
            .field("interval", &self.interval)
            .finish_non_exhaustive()
    }
}

impl<C> TaskQueue<C>
where
    C: Send + 'static,
{
    /// Spawn the worker and start draining.
    ///
    /// Must be called from within a Tokio runtime. The first drain happens
    /// one interval after start.
    pub fn start(context: C, options: QueueOptions) -> Self {
        let interval = options.interval.max(MIN_INTERVAL);
        let backlog = Arc::new(Mutex::new(Backlog::new(
            options.max_backlog,
            options.overflow,
        )));
        let (immediate_tx, immediate_rx) = mpsc::unbounded_channel();
        let (stop_tx, stop_rx) = oneshot::channel();

        let worker = Worker {
            context,
            backlog: BacklogGuard {
                backlog: Arc::clone(&backlog),
            },
            immediate_rx,
            stop_rx,
            interval,
        };
        let handle = tokio::spawn(worker.run());

        Self {
            backlog,
            immediate_tx,
            stop_tx: Some(stop_tx),
            handle: Some(handle),
            interval,
        }
    }

    /// Queue `action` behind everything already pending.
    ///
    /// Never blocks on the worker. Fails with
    /// [`TickQueueError::BacklogFull`] when the backlog is full under the
    /// `reject` policy. Fails with [`TickQueueError::Stopped`] once the
    /// worker is gone without a `shutdown`, e.g. because the runtime that
    /// owned it was dropped.
    pub fn submit<R, F>(&self, action: F) -> Result<Promise<R>>
    where
        R: Clone + Send + 'static,
        F: FnOnce(&mut C) -> R + Send + 'static,
    {
        lock_backlog(&self.backlog).push(action)
    }

    /// Run `action` on the worker ahead of the backlog and wait for it.
    ///
    /// The returned promise is already resolved, so continuations attached
    /// to it run synchronously. Fails with [`TickQueueError::Abandoned`] if
    /// the action panicked or the worker stopped before running it, and with
    /// [`TickQueueError::Stopped`] if the worker is already gone.
    pub async fn submit_immediate<R, F>(&self, action: F) -> Result<Promise<R>>
    where
        R: Clone + Send + 'static,
        F: FnOnce(&mut C) -> R + Send + 'static,
    {
        let id = lock_backlog(&self.backlog).next_task_id();
        let (task, promise) = PendingTask::new(id, action);

        if self.immediate_tx.send(task).is_err() {
            return Err(TickQueueError::Stopped);
        }
        debug!(task_id = id, "immediate task handed to worker");

        promise.wait().await?;
        Ok(promise)
    }

    /// Number of deferred tasks still waiting.
    pub fn pending(&self) -> usize {
        lock_backlog(&self.backlog).len()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// True while the worker task is alive.
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stop the worker and return the context.
    ///
    /// A task that is running when shutdown is requested finishes first.
    /// Tasks still in the backlog are abandoned.
    pub async fn shutdown(mut self) -> Result<C> {
        if let Some(stop) = self.stop_tx.take() {
            // The worker may already be gone; the join below reports why.
            let _ = stop.send(());
        }

        let handle = self.handle.take().ok_or(TickQueueError::Stopped)?;
        let context = handle.await.map_err(anyhow::Error::from)?;
        Ok(context)
    }
}

/// The worker's handle on the shared backlog.
///
/// Closes the backlog when dropped, so pending tasks are abandoned however
/// the worker ends: a stop signal, a dropped `TaskQueue`, or the runtime
/// dropping the worker future (polled or not).
struct BacklogGuard<C> {
    backlog: Arc<Mutex<Backlog<C>>>,
}

impl<C> Drop for BacklogGuard<C> {
    fn drop(&mut self) {
        let abandoned = lock_backlog(&self.backlog).close();
        if abandoned > 0 {
            debug!(abandoned, "worker dropped; abandoned pending tasks");
        }
    }
}

/// State moved into the spawned worker task.
struct Worker<C> {
    context: C,
    backlog: BacklogGuard<C>,
    immediate_rx: mpsc::UnboundedReceiver<PendingTask<C>>,
    stop_rx: oneshot::Receiver<()>,
    interval: Duration,
}

impl<C> Worker<C>
where
    C: Send + 'static,
{
    /// Main worker loop.
    ///
    /// - Stops when asked to, or when the owning `TaskQueue` is dropped.
    /// - Runs immediate tasks as soon as they arrive.
    /// - Drains one deferred task per tick.
    async fn run(self) -> C {
        let Worker {
            mut context,
            backlog,
            mut immediate_rx,
            mut stop_rx,
            interval,
        } = self;

        info!(interval_ms = interval.as_millis() as u64, "task queue worker started");

        let mut ticker = time::interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;

                _ = &mut stop_rx => {
                    debug!("task queue worker received stop signal");
                    break;
                }
                Some(task) = immediate_rx.recv() => {
                    task.execute(&mut context);
                }
                _ = ticker.tick() => {
                    let next = lock_backlog(&backlog.backlog).pop_front();
                    if let Some(task) = next {
                        task.execute(&mut context);
                    }
                }
            }
        }

        // Refuse new immediate tasks, then abandon anything already sent.
        immediate_rx.close();
        let mut abandoned = 0;
        while let Ok(task) = immediate_rx.try_recv() {
            task.abandon();
            abandoned += 1;
        }
        abandoned += lock_backlog(&backlog.backlog).close();

        info!(abandoned, "task queue worker stopped");
        context
    }
}
