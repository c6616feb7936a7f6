//! Click emitter publishing identifiers on a Redis pub/sub channel.

use async_trait::async_trait;
use redis::{AsyncCommands, aio::ConnectionManager};
use serde_json::json;

use super::service::ClickEmitter;
use crate::error::AppError;

/// Publishes each accessed identifier as a plain-text message.
///
/// An external consumer subscribed to the channel owns the counting.
pub struct RedisClickPublisher {
    conn: ConnectionManager,
    channel: String,
}

impl RedisClickPublisher {
    pub fn new(conn: ConnectionManager, channel: impl Into<String>) -> Self {
        Self {
            conn,
            channel: channel.into(),
        }
    }
}

#[async_trait]
impl ClickEmitter for RedisClickPublisher {
    async fn record_access(&self, id: &str) -> Result<String, AppError> {
        let mut conn = self.conn.clone();

        let receivers: i64 = conn.publish(&self.channel, id).await.map_err(|e| {
            AppError::transient(
                "Failed to publish click event",
                json!({ "id": id, "channel": self.channel, "reason": e.to_string() }),
            )
        })?;

        Ok(format!(
            "published on '{}' to {} subscribers",
            self.channel, receivers
        ))
    }

    fn is_healthy(&self) -> bool {
        true
    }

    fn transport(&self) -> &'static str {
        "redis"
    }
}
