//! Cache service trait and error types.

use async_trait::async_trait;

use crate::domain::entities::ShortUrlRecord;

/// Errors that can occur during cache operations.
///
/// These never leave the cache-aside repository: reads degrade to a store
/// lookup and writes are logged and dropped.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache connection error: {0}")]
    Connection(String),
    #[error("Cache operation error: {0}")]
    Operation(String),
    #[error("Cache codec error: {0}")]
    Codec(String),
}

impl From<redis::RedisError> for CacheError {
    fn from(e: redis::RedisError) -> Self {
        Self::Operation(e.to_string())
    }
}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// TTL-bounded key-value mirror of record store entries.
///
/// Entries are always complete records serialized with
/// [`crate::infrastructure::cache::codec`], never partial fields. The TTL is
/// fixed per implementation at construction time.
///
/// # Implementations
///
/// - [`crate::infrastructure::cache::RedisCache`] - Redis-backed
/// - [`crate::infrastructure::cache::MemoryCache`] - In-process (moka)
/// - [`crate::infrastructure::cache::NullCache`] - Always misses
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CacheService: Send + Sync {
    /// Looks up a record.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(record))` on cache hit
    /// - `Ok(None)` on cache miss (absence is never an error)
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] on backend or decoding failure.
    async fn get(&self, id: &str) -> CacheResult<Option<ShortUrlRecord>>;

    /// Stores a complete record under its identifier with the configured TTL.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] on backend or encoding failure.
    async fn set(&self, record: &ShortUrlRecord) -> CacheResult<()>;

    /// Checks if the cache backend is healthy.
    async fn health_check(&self) -> bool;

    /// Short backend name for health reporting.
    fn backend(&self) -> &'static str;
}
