//! Click emitter feeding the in-process aggregation worker.

use async_trait::async_trait;
use serde_json::json;
use tokio::sync::mpsc;

use super::service::ClickEmitter;
use crate::domain::click_event::ClickEvent;
use crate::error::AppError;

/// Pushes [`ClickEvent`]s onto a bounded queue without waiting for space.
pub struct QueueClickEmitter {
    tx: mpsc::Sender<ClickEvent>,
}

impl QueueClickEmitter {
    pub fn new(tx: mpsc::Sender<ClickEvent>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl ClickEmitter for QueueClickEmitter {
    async fn record_access(&self, id: &str) -> Result<String, AppError> {
        self.tx.try_send(ClickEvent::new(id)).map_err(|e| {
            let reason = match e {
                mpsc::error::TrySendError::Full(_) => "queue full",
                mpsc::error::TrySendError::Closed(_) => "queue closed",
            };
            AppError::transient(
                "Failed to enqueue click event",
                json!({ "id": id, "reason": reason }),
            )
        })?;

        Ok(format!("queued, {} slots left", self.tx.capacity()))
    }

    fn is_healthy(&self) -> bool {
        !self.tx.is_closed()
    }

    fn transport(&self) -> &'static str {
        "queue"
    }
}
