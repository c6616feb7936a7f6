//! No-op cache implementation for disabled caching.

use super::service::{CacheResult, CacheService};
use crate::domain::entities::ShortUrlRecord;
use async_trait::async_trait;
use tracing::debug;

/// A cache that never stores anything.
///
/// Every lookup is a miss, so every read goes to the record store.
///
/// # Use Cases
///
/// - Development environments without Redis
/// - Fallback when Redis connection fails at startup
pub struct NullCache;

impl NullCache {
    pub fn new() -> Self {
        debug!("Using NullCache (caching disabled)");
        Self
    }
}

impl Default for NullCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheService for NullCache {
    async fn get(&self, _id: &str) -> CacheResult<Option<ShortUrlRecord>> {
        Ok(None)
    }

    async fn set(&self, _record: &ShortUrlRecord) -> CacheResult<()> {
        Ok(())
    }

    async fn health_check(&self) -> bool {
        true
    }

    fn backend(&self) -> &'static str {
        "none"
    }
}
