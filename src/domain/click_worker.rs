//! In-process click aggregation pipeline.
//!
//! Consumes [`ClickEvent`]s queued by
//! [`crate::infrastructure::clicks::QueueClickEmitter`] and increments the
//! `clicks` counter in the record store. Used when no external aggregation
//! pipeline is configured.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{Semaphore, mpsc};
use tokio_retry::RetryIf;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{debug, error, warn};

use crate::domain::click_event::ClickEvent;
use crate::domain::repositories::RecordStore;
use crate::error::{AppError, ErrorKind};

const MAX_RETRIES: usize = 3;

/// Runs until every sender of `rx` has been dropped and all in-flight
/// increments have finished.
///
/// At most `concurrency` increments run at the same time. Transient store
/// failures are retried with jittered exponential backoff; an identifier that
/// no longer exists is logged and skipped.
pub async fn run_click_worker(
    mut rx: mpsc::Receiver<ClickEvent>,
    store: Arc<dyn RecordStore>,
    concurrency: usize,
) {
    let limiter = Arc::new(Semaphore::new(concurrency.max(1)));

    while let Some(event) = rx.recv().await {
        let Ok(permit) = limiter.clone().acquire_owned().await else {
            break;
        };
        let store = store.clone();

        tokio::spawn(async move {
            if let Err(e) = increment_with_retry(store.as_ref(), &event.id).await {
                match e.kind() {
                    ErrorKind::NotFound => {
                        warn!(id = %event.id, "Dropping click for unknown short URL")
                    }
                    _ => error!(id = %event.id, error = %e, "Failed to record click"),
                }
            } else {
                let lag_ms = (Utc::now() - event.occurred_at).num_milliseconds();
                debug!(id = %event.id, lag_ms, "Click recorded");
            }
            drop(permit);
        });
    }

    // Wait for in-flight increments before returning.
    let _ = limiter.acquire_many(concurrency.max(1) as u32).await;
    debug!("Click worker stopped");
}

async fn increment_with_retry(store: &dyn RecordStore, id: &str) -> Result<(), AppError> {
    let strategy = ExponentialBackoff::from_millis(10)
        .map(jitter)
        .take(MAX_RETRIES);

    RetryIf::start(
        strategy,
        || store.increment_clicks(id, 1),
        |e: &AppError| e.kind() == ErrorKind::TransientFailure,
    )
    .await
}
