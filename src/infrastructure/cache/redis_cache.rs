//! Redis-backed cache implementation.

use super::codec::{cache_key, decode_record, encode_record};
use super::service::{CacheError, CacheResult, CacheService};
use crate::domain::entities::ShortUrlRecord;
use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use tracing::{debug, info};

/// Redis cache for record lookups.
///
/// Uses `ConnectionManager` for automatic reconnection and cheap clones.
/// Unlike a fail-open cache, errors are returned to the caller; the
/// cache-aside repository decides how to degrade.
pub struct RedisCache {
    client: ConnectionManager,
    ttl_seconds: u64,
}

impl RedisCache {
    /// Wraps an existing connection, sharing it with other Redis users.
    pub fn from_manager(manager: ConnectionManager, ttl_seconds: u64) -> Self {
        Self {
            client: manager,
            ttl_seconds,
        }
    }
}

/// Opens a `ConnectionManager` and verifies it with a PING.
///
/// The manager is shared by [`RedisCache`] and
/// [`crate::infrastructure::clicks::RedisClickPublisher`].
///
/// # Errors
///
/// Returns [`CacheError::Connection`] if the URL is invalid, the connection
/// cannot be established, or the PING fails.
pub async fn connect_manager(redis_url: &str) -> CacheResult<ConnectionManager> {
    info!("Connecting to Redis at {}", crate::config::mask_connection_string(redis_url));

    let client = Client::open(redis_url)
        .map_err(|e| CacheError::Connection(format!("Failed to create Redis client: {}", e)))?;

    let manager = ConnectionManager::new(client)
        .await
        .map_err(|e| CacheError::Connection(format!("Failed to connect to Redis: {}", e)))?;

    let mut test_conn = manager.clone();
    test_conn
        .ping::<()>()
        .await
        .map_err(|e| CacheError::Connection(format!("Redis PING failed: {}", e)))?;

    Ok(manager)
}

#[async_trait]
impl CacheService for RedisCache {
    async fn get(&self, id: &str) -> CacheResult<Option<ShortUrlRecord>> {
        let mut conn = self.client.clone();

        match conn.get::<_, Option<String>>(cache_key(id)).await? {
            Some(blob) => {
                debug!("Cache HIT: {}", id);
                decode_record(&blob).map(Some)
            }
            None => {
                debug!("Cache MISS: {}", id);
                Ok(None)
            }
        }
    }

    async fn set(&self, record: &ShortUrlRecord) -> CacheResult<()> {
        let blob = encode_record(record)?;
        let mut conn = self.client.clone();

        conn.set_ex::<_, _, ()>(cache_key(&record.id), blob, self.ttl_seconds)
            .await?;

        debug!("Cache SET: {} (TTL: {}s)", record.id, self.ttl_seconds);
        Ok(())
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.client.clone();
        conn.ping::<()>().await.is_ok()
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}
