//! Click emitter trait.

use async_trait::async_trait;

use crate::error::AppError;

/// Notifies an aggregation pipeline that a short URL was accessed.
///
/// Delivery is at-least-once at best; callers run this on a background task
/// and only log the outcome.
///
/// # Implementations
///
/// - [`crate::infrastructure::clicks::RedisClickPublisher`] - Redis pub/sub
/// - [`crate::infrastructure::clicks::QueueClickEmitter`] - In-process queue
///   drained by [`crate::domain::click_worker::run_click_worker`]
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClickEmitter: Send + Sync {
    /// Publishes one access event for `id`.
    ///
    /// Returns a short publish confirmation, used for logging only.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::TransientFailure`] if the event could not be published.
    async fn record_access(&self, id: &str) -> Result<String, AppError>;

    /// Whether the emitter can still accept events.
    fn is_healthy(&self) -> bool;

    /// Short transport name for health reporting.
    fn transport(&self) -> &'static str;
}
