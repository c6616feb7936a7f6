//! Bounded pool for detached fire-and-forget work.
//!
//! Cache population and click emission run here instead of on the request
//! task. Callers never wait for a task and never see its outcome: failures
//! end up in the log, and a full queue drops the task with a warning.
//!
//! ```rust,ignore
//! let (tasks, worker) = BackgroundTasks::new(10_000, 16);
//! tokio::spawn(worker.run());
//!
//! tasks.spawn("cache.populate", async move { cache_record(...).await });
//!
//! // at shutdown
//! tasks.flush().await;
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::{Notify, Semaphore, mpsc};
use tracing::{debug, error, warn};

use crate::error::AppError;

type TaskFuture = Pin<Box<dyn Future<Output = Result<(), AppError>> + Send + 'static>>;

struct Task {
    label: &'static str,
    future: TaskFuture,
}

/// Counts accepted-but-unfinished tasks so callers can wait for quiescence.
#[derive(Default)]
struct Tracker {
    pending: AtomicUsize,
    idle: Notify,
}

impl Tracker {
    fn finish(&self) {
        if self.pending.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.idle.notify_waiters();
        }
    }
}

/// Marks a task finished even if it panics.
struct Completion(Arc<Tracker>);

impl Drop for Completion {
    fn drop(&mut self) {
        self.0.finish();
    }
}

/// Cloneable handle for dispatching detached tasks.
#[derive(Clone)]
pub struct BackgroundTasks {
    tx: mpsc::Sender<Task>,
    tracker: Arc<Tracker>,
}

/// Consumer side of [`BackgroundTasks`]; drive it with [`TaskWorker::run`].
pub struct TaskWorker {
    rx: mpsc::Receiver<Task>,
    tracker: Arc<Tracker>,
    concurrency: usize,
}

impl BackgroundTasks {
    /// Creates a pool whose queue holds `capacity` tasks and which runs at
    /// most `concurrency` of them at once.
    pub fn new(capacity: usize, concurrency: usize) -> (Self, TaskWorker) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let tracker = Arc::new(Tracker::default());

        let handle = Self {
            tx,
            tracker: tracker.clone(),
        };
        let worker = TaskWorker {
            rx,
            tracker,
            concurrency: concurrency.max(1),
        };

        (handle, worker)
    }

    /// Creates a pool and spawns its worker on the current runtime.
    pub fn start(capacity: usize, concurrency: usize) -> Self {
        let (tasks, worker) = Self::new(capacity, concurrency);
        tokio::spawn(worker.run());
        tasks
    }

    /// Queues `future` without waiting for it.
    ///
    /// Returns `false` if the task was dropped because the queue is full or
    /// the worker is gone.
    pub fn spawn<F>(&self, label: &'static str, future: F) -> bool
    where
        F: Future<Output = Result<(), AppError>> + Send + 'static,
    {
        self.tracker.pending.fetch_add(1, Ordering::AcqRel);

        let task = Task {
            label,
            future: Box::pin(future),
        };

        match self.tx.try_send(task) {
            Ok(()) => true,
            Err(e) => {
                self.tracker.finish();
                metrics::counter!("shortener_background_tasks_dropped_total").increment(1);
                let reason = match e {
                    mpsc::error::TrySendError::Full(_) => "queue full",
                    mpsc::error::TrySendError::Closed(_) => "worker stopped",
                };
                warn!(task = label, reason, "Dropping background task");
                false
            }
        }
    }

    /// Waits until every accepted task has finished.
    pub async fn flush(&self) {
        loop {
            let notified = self.tracker.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.tracker.pending.load(Ordering::Acquire) == 0 {
                return;
            }

            notified.await;
        }
    }

    /// Number of tasks queued or running.
    pub fn pending(&self) -> usize {
        self.tracker.pending.load(Ordering::Acquire)
    }

    /// Remaining queue slots.
    pub fn capacity(&self) -> usize {
        self.tx.capacity()
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

impl TaskWorker {
    /// Runs queued tasks until every [`BackgroundTasks`] handle is dropped.
    pub async fn run(mut self) {
        let limiter = Arc::new(Semaphore::new(self.concurrency));

        while let Some(task) = self.rx.recv().await {
            let Ok(permit) = limiter.clone().acquire_owned().await else {
                break;
            };
            let completion = Completion(self.tracker.clone());

            tokio::spawn(async move {
                let _completion = completion;
                let _permit = permit;

                if let Err(e) = task.future.await {
                    metrics::counter!("shortener_background_task_failures_total").increment(1);
                    error!(task = task.label, error = %e, "Background task failed");
                }
            });
        }

        debug!("Background task worker stopped");
    }
}
