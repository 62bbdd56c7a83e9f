//! Consolidation Queue: deferred, best-effort linking after each write.
//!
//! Writes enqueue a task and return immediately. A single background task
//! drains the queue in FIFO order, running each consolidation pass once its
//! delay has elapsed:
//!
//! ```text
//! record_interaction ──schedule(id)──▶ [ channel ] ──▶ worker ──▶ consolidate(id)
//!                                                       │
//!                                  flush() ─────────────┘ (run everything now)
//! ```
//!
//! Store calls run on tokio's blocking pool. Failures are logged and counted,
//! never surfaced to the writer. Tasks are at-most-once: anything still
//! queued when the process dies is lost.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::config::ConsolidationConfig;
use crate::consolidation::{self, ConsolidationOutcome};
use crate::store::RecordStore;
use crate::types::RecordId;

/// A scheduled consolidation pass.
#[derive(Debug, Clone, Copy)]
struct Task {
    id: RecordId,
    due: Instant,
}

enum Command {
    Consolidate(Task),
    Flush(oneshot::Sender<()>),
    Shutdown(oneshot::Sender<()>),
}

#[derive(Debug, Default)]
struct QueueCounters {
    scheduled: AtomicU64,
    completed: AtomicU64,
    failed: AtomicU64,
    dropped: AtomicU64,
}

/// Snapshot of queue activity since startup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueStats {
    /// Tasks accepted by [`ConsolidationQueue::schedule`].
    pub scheduled: u64,
    /// Passes that ran to completion (including no-op passes).
    pub completed: u64,
    /// Passes that hit a store error or panicked.
    pub failed: u64,
    /// Tasks rejected because the worker had stopped.
    pub dropped: u64,
}

/// Handle to the background consolidation worker.
///
/// Cloning is not supported; share it behind the owning
/// [`MemoryManager`](crate::MemoryManager).
pub struct ConsolidationQueue {
    tx: mpsc::UnboundedSender<Command>,
    counters: Arc<QueueCounters>,
    delay: Duration,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl std::fmt::Debug for ConsolidationQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsolidationQueue")
            .field("delay", &self.delay)
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

impl ConsolidationQueue {
    /// Spawn the worker on the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    #[must_use]
    pub fn spawn(store: Arc<dyn RecordStore>, config: ConsolidationConfig) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let counters = Arc::new(QueueCounters::default());
        let delay = Duration::from_millis(config.delay_ms);

        let handle = tokio::spawn(Self::drain_loop(
            store,
            Arc::new(config),
            rx,
            Arc::clone(&counters),
        ));

        Self {
            tx,
            counters,
            delay,
            handle: Mutex::new(Some(handle)),
        }
    }

    /// Queue a consolidation pass for `id`. Returns immediately.
    ///
    /// Returns `false` if the worker has stopped and the task was dropped.
    pub fn schedule(&self, id: RecordId) -> bool {
        let task = Task {
            id,
            due: Instant::now() + self.delay,
        };
        if self.tx.send(Command::Consolidate(task)).is_ok() {
            self.counters.scheduled.fetch_add(1, Ordering::Relaxed);
            true
        } else {
            self.counters.dropped.fetch_add(1, Ordering::Relaxed);
            warn!(%id, "Consolidation worker stopped, task dropped");
            false
        }
    }

    /// Run every pending task now, ignoring delays, and wait for them.
    pub async fn flush(&self) {
        let (ack, done) = oneshot::channel();
        if self.tx.send(Command::Flush(ack)).is_ok() {
            let _ = done.await;
        }
    }

    /// Run every pending task, then stop the worker.
    ///
    /// Tasks scheduled afterwards are dropped.
    pub async fn shutdown(&self) {
        let (ack, done) = oneshot::channel();
        if self.tx.send(Command::Shutdown(ack)).is_ok() {
            let _ = done.await;
        }
        let handle = self.handle.lock().take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                warn!(error = %e, "Consolidation worker ended abnormally");
            }
        }
    }

    /// Current counters.
    #[must_use]
    pub fn stats(&self) -> QueueStats {
        QueueStats {
            scheduled: self.counters.scheduled.load(Ordering::Relaxed),
            completed: self.counters.completed.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
            dropped: self.counters.dropped.load(Ordering::Relaxed),
        }
    }

    /// Background loop: hold tasks until due, run them in order.
    async fn drain_loop(
        store: Arc<dyn RecordStore>,
        config: Arc<ConsolidationConfig>,
        mut rx: mpsc::UnboundedReceiver<Command>,
        counters: Arc<QueueCounters>,
    ) {
        let mut pending: VecDeque<Task> = VecDeque::new();

        loop {
            let next_due = pending.front().map(|t| t.due);

            tokio::select! {
                cmd = rx.recv() => match cmd {
                    Some(Command::Consolidate(task)) => pending.push_back(task),
                    Some(Command::Flush(ack)) => {
                        Self::run_all(&store, &config, &counters, &mut pending).await;
                        let _ = ack.send(());
                    }
                    Some(Command::Shutdown(ack)) => {
                        Self::run_all(&store, &config, &counters, &mut pending).await;
                        let _ = ack.send(());
                        break;
                    }
                    None => {
                        Self::run_all(&store, &config, &counters, &mut pending).await;
                        break;
                    }
                },
                () = tokio::time::sleep_until(next_due.unwrap_or_else(Instant::now)), if next_due.is_some() => {
                    let now = Instant::now();
                    while pending.front().is_some_and(|t| t.due <= now) {
                        if let Some(task) = pending.pop_front() {
                            Self::run_one(&store, &config, &counters, task.id).await;
                        }
                    }
                }
            }
        }

        info!("Consolidation worker shutting down");
    }

    async fn run_all(
        store: &Arc<dyn RecordStore>,
        config: &Arc<ConsolidationConfig>,
        counters: &QueueCounters,
        pending: &mut VecDeque<Task>,
    ) {
        while let Some(task) = pending.pop_front() {
            Self::run_one(store, config, counters, task.id).await;
        }
    }

    async fn run_one(
        store: &Arc<dyn RecordStore>,
        config: &Arc<ConsolidationConfig>,
        counters: &QueueCounters,
        id: RecordId,
    ) {
        let store = Arc::clone(store);
        let config = Arc::clone(config);
        let result =
            tokio::task::spawn_blocking(move || consolidation::consolidate(store.as_ref(), id, &config))
                .await;

        match result {
            Ok(Ok(outcome)) => {
                counters.completed.fetch_add(1, Ordering::Relaxed);
                if let ConsolidationOutcome::Linked { count } = outcome {
                    debug!(%id, linked = count, "Consolidation pass linked records");
                }
            }
            Ok(Err(e)) => {
                counters.failed.fetch_add(1, Ordering::Relaxed);
                warn!(%id, error = %e, "Consolidation pass failed");
            }
            Err(e) => {
                counters.failed.fetch_add(1, Ordering::Relaxed);
                warn!(%id, error = %e, "Consolidation pass panicked");
            }
        }
    }
}
