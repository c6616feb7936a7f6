//! Cache-aside repository combining the record store with the cache layer.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value, json};
use tracing::{debug, trace, warn};

use crate::application::background::BackgroundTasks;
use crate::domain::entities::{NewShortUrl, ShortUrlPatch, ShortUrlRecord};
use crate::domain::repositories::{RecordStore, ShortUrlRepository};
use crate::error::AppError;
use crate::infrastructure::cache::CacheService;

/// [`ShortUrlRepository`] reading through the cache and writing to the store.
///
/// Cache population always runs on [`BackgroundTasks`] and only ever writes a
/// complete record that the store just returned. Cache failures are logged
/// and never reach the caller.
pub struct CachedShortUrlRepository {
    store: Arc<dyn RecordStore>,
    cache: Arc<dyn CacheService>,
    tasks: BackgroundTasks,
}

impl CachedShortUrlRepository {
    pub fn new(
        store: Arc<dyn RecordStore>,
        cache: Arc<dyn CacheService>,
        tasks: BackgroundTasks,
    ) -> Self {
        Self {
            store,
            cache,
            tasks,
        }
    }

    fn populate_cache(&self, record: ShortUrlRecord) {
        let cache = self.cache.clone();

        self.tasks.spawn("cache.populate", async move {
            cache.set(&record).await.map_err(|e| {
                AppError::transient(
                    "Failed to populate cache",
                    json!({ "id": record.id, "reason": e.to_string() }),
                )
            })
        });
    }

    /// Re-reads the record after a write so the cache only ever holds what
    /// the store confirmed.
    fn refresh_cache(&self, id: &str) {
        let store = self.store.clone();
        let cache = self.cache.clone();
        let id = id.to_string();

        self.tasks.spawn("cache.refresh", async move {
            let Some(record) = store.find_by_id(&id).await? else {
                debug!(id = %id, "Record vanished before cache refresh");
                return Ok(());
            };

            cache.set(&record).await.map_err(|e| {
                AppError::transient(
                    "Failed to refresh cache",
                    json!({ "id": id, "reason": e.to_string() }),
                )
            })
        });
    }
}

#[async_trait]
impl ShortUrlRepository for CachedShortUrlRepository {
    async fn save(&self, id: &str, url: &str, enabled: bool) -> Result<(), AppError> {
        let record = self
            .store
            .create_if_absent(NewShortUrl {
                id: id.to_string(),
                url: url.to_string(),
                enabled,
            })
            .await?;

        self.populate_cache(record);
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<ShortUrlRecord, AppError> {
        match self.cache.get(id).await {
            Ok(Some(record)) => {
                metrics::counter!("shortener_cache_hits_total").increment(1);
                trace!(id = %id, "Cache hit");
                return Ok(record);
            }
            Ok(None) => {
                metrics::counter!("shortener_cache_misses_total").increment(1);
                trace!(id = %id, "Cache miss");
            }
            Err(e) => {
                metrics::counter!("shortener_cache_misses_total").increment(1);
                warn!(id = %id, error = %e, "Cache read failed, falling back to store");
            }
        }

        match self.store.find_by_id(id).await? {
            Some(record) => {
                self.populate_cache(record.clone());
                Ok(record)
            }
            None => Ok(ShortUrlRecord::default()),
        }
    }

    async fn update(&self, id: &str, fields: Map<String, Value>) -> Result<(), AppError> {
        let patch = ShortUrlPatch::from_fields(&fields)?;

        if patch.is_empty() {
            debug!(id = %id, "No recognized fields to update");
            return Ok(());
        }

        self.store.update_fields(id, patch).await?;
        self.refresh_cache(id);
        Ok(())
    }

    async fn get_stats(&self, limit: i64) -> Result<Vec<ShortUrlRecord>, AppError> {
        self.store.top_by_clicks(limit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockRecordStore;
    use crate::error::ErrorKind;
    use crate::infrastructure::cache::{CacheError, MemoryCache, MockCacheService, NullCache};
    use crate::infrastructure::persistence::InMemoryRecordStore;
    use chrono::Utc;
    use std::time::Duration;

    fn stored(id: &str, url: &str) -> ShortUrlRecord {
        ShortUrlRecord::new(id.to_string(), url.to_string(), Utc::now(), true, 0)
    }

    fn fields(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    fn memory_repository() -> (
        CachedShortUrlRepository,
        Arc<InMemoryRecordStore>,
        Arc<MemoryCache>,
        BackgroundTasks,
    ) {
        let store = Arc::new(InMemoryRecordStore::new());
        let cache = Arc::new(MemoryCache::new(Duration::from_secs(60)));
        let tasks = BackgroundTasks::start(64, 4);
        let repo = CachedShortUrlRepository::new(store.clone(), cache.clone(), tasks.clone());
        (repo, store, cache, tasks)
    }

    #[tokio::test]
    async fn test_save_populates_cache() {
        let (repo, _, cache, tasks) = memory_repository();

        repo.save("abc1234", "https://example.com", true).await.unwrap();
        tasks.flush().await;

        let cached = cache.get("abc1234").await.unwrap().unwrap();
        assert_eq!(cached.url, "https://example.com");
        assert_eq!(cached.clicks, 0);
    }

    #[tokio::test]
    async fn test_save_collision_propagates() {
        let (repo, _, _, _) = memory_repository();

        repo.save("abc1234", "https://example.com", true).await.unwrap();
        let err = repo
            .save("abc1234", "https://other.example", true)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::AlreadyExists);
    }

    #[tokio::test]
    async fn test_find_by_id_cache_hit_skips_store() {
        let mut store = MockRecordStore::new();
        store.expect_find_by_id().never();

        let mut cache = MockCacheService::new();
        cache
            .expect_get()
            .returning(|id| Ok(Some(stored(id, "https://cached.example"))));

        let repo = CachedShortUrlRepository::new(
            Arc::new(store),
            Arc::new(cache),
            BackgroundTasks::start(4, 1),
        );

        let record = repo.find_by_id("abc1234").await.unwrap();
        assert_eq!(record.url, "https://cached.example");
    }

    #[tokio::test]
    async fn test_find_by_id_cache_error_falls_back_to_store() {
        let mut store = MockRecordStore::new();
        store
            .expect_find_by_id()
            .times(1)
            .returning(|id| Ok(Some(stored(id, "https://stored.example"))));

        let mut cache = MockCacheService::new();
        cache
            .expect_get()
            .returning(|_| Err(CacheError::Connection("refused".to_string())));
        cache
            .expect_set()
            .returning(|_| Err(CacheError::Connection("refused".to_string())));

        let tasks = BackgroundTasks::start(4, 1);
        let repo = CachedShortUrlRepository::new(Arc::new(store), Arc::new(cache), tasks.clone());

        let record = repo.find_by_id("abc1234").await.unwrap();
        tasks.flush().await;

        assert_eq!(record.url, "https://stored.example");
    }

    #[tokio::test]
    async fn test_find_by_id_miss_populates_cache() {
        let (repo, store, cache, tasks) = memory_repository();
        store
            .create_if_absent(NewShortUrl {
                id: "abc1234".to_string(),
                url: "https://example.com".to_string(),
                enabled: true,
            })
            .await
            .unwrap();

        let record = repo.find_by_id("abc1234").await.unwrap();
        tasks.flush().await;

        assert_eq!(cache.get("abc1234").await.unwrap(), Some(record));
    }

    #[tokio::test]
    async fn test_find_by_id_absent_returns_empty_record() {
        let store = Arc::new(InMemoryRecordStore::new());
        let tasks = BackgroundTasks::start(4, 1);
        let repo = CachedShortUrlRepository::new(store, Arc::new(NullCache::new()), tasks);

        let record = repo.find_by_id("missing").await.unwrap();
        assert!(record.is_empty());
    }

    #[tokio::test]
    async fn test_find_by_id_absent_with_failing_cache_returns_empty_record() {
        let mut store = MockRecordStore::new();
        store.expect_find_by_id().times(1).returning(|_| Ok(None));

        let mut cache = MockCacheService::new();
        cache
            .expect_get()
            .returning(|_| Err(CacheError::Connection("refused".to_string())));
        cache.expect_set().never();

        let tasks = BackgroundTasks::start(4, 1);
        let repo = CachedShortUrlRepository::new(Arc::new(store), Arc::new(cache), tasks.clone());

        let record = repo.find_by_id("missing").await.unwrap();
        tasks.flush().await;

        assert!(record.is_empty());
    }

    #[tokio::test]
    async fn test_find_by_id_store_error_propagates() {
        let mut store = MockRecordStore::new();
        store
            .expect_find_by_id()
            .returning(|_| Err(AppError::transient("connection reset", json!({}))));

        let repo = CachedShortUrlRepository::new(
            Arc::new(store),
            Arc::new(NullCache::new()),
            BackgroundTasks::start(4, 1),
        );

        let err = repo.find_by_id("abc1234").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TransientFailure);
    }

    #[tokio::test]
    async fn test_update_with_unknown_fields_skips_store() {
        let mut store = MockRecordStore::new();
        store.expect_update_fields().never();
        store.expect_find_by_id().never();

        let repo = CachedShortUrlRepository::new(
            Arc::new(store),
            Arc::new(NullCache::new()),
            BackgroundTasks::start(4, 1),
        );

        repo.update("abc1234", fields(json!({ "clicks": 99, "id": "x" })))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_update_changes_only_url_and_refreshes_cache() {
        let (repo, store, cache, tasks) = memory_repository();
        repo.save("abc1234", "https://old.example", true).await.unwrap();
        store.increment_clicks("abc1234", 3).await.unwrap();
        tasks.flush().await;

        repo.update("abc1234", fields(json!({ "url": "https://new.example" })))
            .await
            .unwrap();
        tasks.flush().await;

        let cached = cache.get("abc1234").await.unwrap().unwrap();
        assert_eq!(cached.url, "https://new.example");
        assert!(cached.enabled);
        assert_eq!(cached.clicks, 3);
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let (repo, _, _, _) = memory_repository();

        let err = repo
            .update("missing", fields(json!({ "enabled": false })))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_get_stats_reads_store_directly() {
        let mut store = MockRecordStore::new();
        store
            .expect_top_by_clicks()
            .withf(|limit| *limit == 5)
            .times(1)
            .returning(|_| Ok(vec![]));

        let mut cache = MockCacheService::new();
        cache.expect_get().never();

        let repo = CachedShortUrlRepository::new(
            Arc::new(store),
            Arc::new(cache),
            BackgroundTasks::start(4, 1),
        );

        assert!(repo.get_stats(5).await.unwrap().is_empty());
    }
}
