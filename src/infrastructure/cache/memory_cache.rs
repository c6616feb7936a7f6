//! In-process cache implementation backed by moka.

use std::time::Duration;

use super::codec::{cache_key, decode_record, encode_record};
use super::service::{CacheResult, CacheService};
use crate::domain::entities::ShortUrlRecord;
use async_trait::async_trait;
use moka::future::Cache;
use tracing::debug;

const DEFAULT_MAX_CAPACITY: u64 = 100_000;

/// Single-process cache with a hard time-to-live.
///
/// Values are stored in the same JSON wire format as [`super::RedisCache`],
/// so both backends behave identically from the repository's point of view.
#[derive(Clone)]
pub struct MemoryCache {
    inner: Cache<String, String>,
}

impl MemoryCache {
    pub fn new(ttl: Duration) -> Self {
        Self::with_capacity(ttl, DEFAULT_MAX_CAPACITY)
    }

    pub fn with_capacity(ttl: Duration, max_capacity: u64) -> Self {
        debug!(ttl_secs = ttl.as_secs(), max_capacity, "Using in-memory cache");
        Self {
            inner: Cache::builder()
                .max_capacity(max_capacity)
                .time_to_live(ttl)
                .build(),
        }
    }
}

#[async_trait]
impl CacheService for MemoryCache {
    async fn get(&self, id: &str) -> CacheResult<Option<ShortUrlRecord>> {
        match self.inner.get(&cache_key(id)).await {
            Some(blob) => decode_record(&blob).map(Some),
            None => Ok(None),
        }
    }

    async fn set(&self, record: &ShortUrlRecord) -> CacheResult<()> {
        let blob = encode_record(record)?;
        self.inner.insert(cache_key(&record.id), blob).await;
        Ok(())
    }

    async fn health_check(&self) -> bool {
        true
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
