//! Click event model for asynchronous click aggregation.

use chrono::{DateTime, Utc};

/// An access to a short URL, queued for out-of-band counting.
///
/// Created by [`crate::infrastructure::clicks::QueueClickEmitter`] and
/// consumed by [`crate::domain::click_worker::run_click_worker`]. The
/// resolution service itself never touches the `clicks` counter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickEvent {
    pub id: String,
    pub occurred_at: DateTime<Utc>,
}

impl ClickEvent {
    /// Creates an event for `id` stamped with the current time.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            occurred_at: Utc::now(),
        }
    }
}
