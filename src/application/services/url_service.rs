//! Short URL resolution service.

use std::sync::Arc;

use serde_json::{Map, Value, json};
use tracing::{debug, info, warn};

use crate::application::background::BackgroundTasks;
use crate::domain::entities::ShortUrlRecord;
use crate::domain::repositories::ShortUrlRepository;
use crate::error::{AppError, ErrorKind};
use crate::infrastructure::clicks::ClickEmitter;
use crate::utils::id_generator::IdGenerator;

/// Attempts made before a run of collisions is reported to the caller.
pub const MAX_ID_ATTEMPTS: usize = 3;

/// Limit used by [`UrlService::get_stats`] when the caller passes a
/// non-positive one.
pub const DEFAULT_STATS_LIMIT: i64 = 10;

/// Orchestrates identifier generation, cache-aside reads, updates and click
/// emission.
///
/// URLs are expected to be validated by the caller before they reach this
/// service.
pub struct UrlService {
    repository: Arc<dyn ShortUrlRepository>,
    id_generator: Arc<dyn IdGenerator>,
    click_emitter: Arc<dyn ClickEmitter>,
    tasks: BackgroundTasks,
}

impl UrlService {
    pub fn new(
        repository: Arc<dyn ShortUrlRepository>,
        id_generator: Arc<dyn IdGenerator>,
        click_emitter: Arc<dyn ClickEmitter>,
        tasks: BackgroundTasks,
    ) -> Self {
        Self {
            repository,
            id_generator,
            click_emitter,
            tasks,
        }
    }

    /// Stores `url` under a fresh identifier and returns the identifier.
    ///
    /// # Collision Retry
    ///
    /// Up to [`MAX_ID_ATTEMPTS`] identifiers are tried back to back. Only an
    /// [`AppError::AlreadyExists`] from the store triggers another attempt.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::AlreadyExists`] if every attempt collided.
    /// Returns [`AppError::TransientFailure`] if the generator or the store fails.
    pub async fn generate_id(&self, url: &str) -> Result<String, AppError> {
        let mut last_collision = None;

        for attempt in 1..=MAX_ID_ATTEMPTS {
            let id = self
                .id_generator
                .generate()
                .map_err(|e| e.context("GenerateId error generating identifier"))?;

            match self.repository.save(&id, url, true).await {
                Ok(()) => {
                    debug!(id = %id, attempt, "Short URL created");
                    return Ok(id);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    metrics::counter!("shortener_id_collisions_total").increment(1);
                    info!(id = %id, attempt, "Identifier collision, retrying");
                    last_collision = Some(e);
                }
                Err(e) => return Err(e.context(format!("GenerateId error saving id {id}"))),
            }
        }

        let err = last_collision.unwrap_or_else(|| {
            AppError::already_exists("Identifier collision", json!({}))
        });
        warn!(attempts = MAX_ID_ATTEMPTS, "Identifier generation exhausted");
        Err(err.context(format!(
            "GenerateId gave up after {MAX_ID_ATTEMPTS} colliding attempts"
        )))
    }

    /// Reads a record; the empty record means the identifier is unknown.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::TransientFailure`] on store errors.
    pub async fn get_url(&self, id: &str) -> Result<ShortUrlRecord, AppError> {
        self.repository
            .find_by_id(id)
            .await
            .map_err(|e| e.context(format!("GetUrl error for id {id}")))
    }

    /// Resolves the redirect target and the enabled flag for `id`.
    ///
    /// An empty URL means the identifier is unknown. When the record exists a
    /// click is emitted in the background, whether or not it is enabled.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::TransientFailure`] on store errors.
    pub async fn get_url_to_redirect(&self, id: &str) -> Result<(String, bool), AppError> {
        let record = self
            .repository
            .find_by_id(id)
            .await
            .map_err(|e| e.context(format!("GetUrlToRedirect error for id {id}")))?;

        if !record.is_empty() {
            self.emit_click(&record.id);
        }

        Ok((record.url, record.enabled))
    }

    /// Applies the recognized fields of `fields` to the record.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the identifier is unknown.
    /// Returns [`AppError::InvalidInput`] if a recognized field has the wrong type.
    /// Returns [`AppError::TransientFailure`] on store errors.
    pub async fn update_url(&self, id: &str, fields: Map<String, Value>) -> Result<(), AppError> {
        self.repository
            .update(id, fields)
            .await
            .map_err(|e| e.context(format!("UpdateUrl error for id {id}")))
    }

    /// Returns the most clicked records, at most `limit` of them.
    ///
    /// A non-positive limit falls back to [`DEFAULT_STATS_LIMIT`].
    ///
    /// # Errors
    ///
    /// Returns [`AppError::TransientFailure`] on store errors.
    pub async fn get_stats(&self, limit: i64) -> Result<Vec<ShortUrlRecord>, AppError> {
        let limit = if limit <= 0 { DEFAULT_STATS_LIMIT } else { limit };

        self.repository
            .get_stats(limit)
            .await
            .map_err(|e| e.context("GetStats error"))
    }

    fn emit_click(&self, id: &str) {
        let emitter = self.click_emitter.clone();
        let id = id.to_string();

        self.tasks.spawn("click.emit", async move {
            let confirmation = emitter
                .record_access(&id)
                .await
                .map_err(|e| e.context(format!("Click emission failed for id {id}")))?;
            debug!(id = %id, %confirmation, "Click emitted");
            Ok(())
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockShortUrlRepository;
    use crate::infrastructure::clicks::MockClickEmitter;
    use crate::utils::id_generator::MockIdGenerator;
    use chrono::Utc;
    use mockall::Sequence;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn record(id: &str, url: &str, enabled: bool, clicks: i64) -> ShortUrlRecord {
        ShortUrlRecord::new(id.to_string(), url.to_string(), Utc::now(), enabled, clicks)
    }

    fn sequential_ids() -> MockIdGenerator {
        let counter = AtomicUsize::new(0);
        let mut generator = MockIdGenerator::new();
        generator
            .expect_generate()
            .returning(move || Ok(format!("id{}", counter.fetch_add(1, Ordering::SeqCst))));
        generator
    }

    fn idle_emitter() -> MockClickEmitter {
        let mut emitter = MockClickEmitter::new();
        emitter.expect_record_access().never();
        emitter
    }

    fn build_service(
        repository: MockShortUrlRepository,
        generator: MockIdGenerator,
        emitter: MockClickEmitter,
    ) -> (UrlService, BackgroundTasks) {
        let tasks = BackgroundTasks::start(16, 2);
        let service = UrlService::new(
            Arc::new(repository),
            Arc::new(generator),
            Arc::new(emitter),
            tasks.clone(),
        );
        (service, tasks)
    }

    fn collision() -> AppError {
        AppError::already_exists("Short URL already exists", json!({}))
    }

    #[tokio::test]
    async fn test_generate_id_first_attempt() {
        let mut repo = MockShortUrlRepository::new();
        repo.expect_save()
            .withf(|id, url, enabled| id == "id0" && url == "https://example.com" && *enabled)
            .times(1)
            .returning(|_, _, _| Ok(()));

        let (service, _) = build_service(repo, sequential_ids(), idle_emitter());

        let id = service.generate_id("https://example.com").await.unwrap();
        assert_eq!(id, "id0");
    }

    #[tokio::test]
    async fn test_generate_id_retries_collisions() {
        let mut seq = Sequence::new();
        let mut repo = MockShortUrlRepository::new();
        repo.expect_save()
            .withf(|id, _, _| id == "id0")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Err(collision()));
        repo.expect_save()
            .withf(|id, _, _| id == "id1")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Err(collision()));
        repo.expect_save()
            .withf(|id, _, _| id == "id2")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok(()));

        let (service, _) = build_service(repo, sequential_ids(), idle_emitter());

        let id = service.generate_id("https://example.com").await.unwrap();
        assert_eq!(id, "id2");
    }

    #[tokio::test]
    async fn test_generate_id_exhausted() {
        let mut repo = MockShortUrlRepository::new();
        repo.expect_save()
            .times(MAX_ID_ATTEMPTS)
            .returning(|_, _, _| Err(collision()));

        let (service, _) = build_service(repo, sequential_ids(), idle_emitter());

        let err = service.generate_id("https://example.com").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);
    }

    #[tokio::test]
    async fn test_generate_id_store_error_is_not_retried() {
        let mut repo = MockShortUrlRepository::new();
        repo.expect_save()
            .times(1)
            .returning(|_, _, _| Err(AppError::transient("connection refused", json!({}))));

        let (service, _) = build_service(repo, sequential_ids(), idle_emitter());

        let err = service.generate_id("https://example.com").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TransientFailure);
    }

    #[tokio::test]
    async fn test_generate_id_generator_error_aborts() {
        let mut generator = MockIdGenerator::new();
        generator
            .expect_generate()
            .times(1)
            .returning(|| Err(AppError::transient("entropy exhausted", json!({}))));

        let mut repo = MockShortUrlRepository::new();
        repo.expect_save().never();

        let (service, _) = build_service(repo, generator, idle_emitter());

        assert!(service.generate_id("https://example.com").await.is_err());
    }

    #[tokio::test]
    async fn test_get_url_to_redirect_emits_click() {
        let mut repo = MockShortUrlRepository::new();
        repo.expect_find_by_id()
            .returning(|id| Ok(record(id, "https://example.com", true, 4)));

        let mut emitter = MockClickEmitter::new();
        emitter
            .expect_record_access()
            .withf(|id| id == "abc1234")
            .times(1)
            .returning(|_| Ok("ok".to_string()));

        let (service, tasks) = build_service(repo, MockIdGenerator::new(), emitter);

        let (url, enabled) = service.get_url_to_redirect("abc1234").await.unwrap();
        tasks.flush().await;

        assert_eq!(url, "https://example.com");
        assert!(enabled);
    }

    #[tokio::test]
    async fn test_get_url_to_redirect_disabled_record() {
        let mut repo = MockShortUrlRepository::new();
        repo.expect_find_by_id()
            .returning(|id| Ok(record(id, "https://example.com", false, 0)));

        let mut emitter = MockClickEmitter::new();
        emitter
            .expect_record_access()
            .times(1)
            .returning(|_| Ok("ok".to_string()));

        let (service, tasks) = build_service(repo, MockIdGenerator::new(), emitter);

        let (url, enabled) = service.get_url_to_redirect("abc1234").await.unwrap();
        tasks.flush().await;

        assert_eq!(url, "https://example.com");
        assert!(!enabled);
    }

    #[tokio::test]
    async fn test_get_url_to_redirect_absent_skips_click() {
        let mut repo = MockShortUrlRepository::new();
        repo.expect_find_by_id()
            .returning(|_| Ok(ShortUrlRecord::default()));

        let (service, tasks) = build_service(repo, MockIdGenerator::new(), idle_emitter());

        let (url, enabled) = service.get_url_to_redirect("missing").await.unwrap();
        tasks.flush().await;

        assert!(url.is_empty());
        assert!(!enabled);
    }

    #[tokio::test]
    async fn test_click_failure_does_not_fail_redirect() {
        let mut repo = MockShortUrlRepository::new();
        repo.expect_find_by_id()
            .returning(|id| Ok(record(id, "https://example.com", true, 0)));

        let mut emitter = MockClickEmitter::new();
        emitter
            .expect_record_access()
            .returning(|_| Err(AppError::transient("broker down", json!({}))));

        let (service, tasks) = build_service(repo, MockIdGenerator::new(), emitter);

        assert!(service.get_url_to_redirect("abc1234").await.is_ok());
        tasks.flush().await;
    }

    #[tokio::test]
    async fn test_update_url_keeps_not_found_kind() {
        let mut repo = MockShortUrlRepository::new();
        repo.expect_update()
            .returning(|_, _| Err(AppError::not_found("Short URL not found", json!({}))));

        let (service, _) = build_service(repo, MockIdGenerator::new(), idle_emitter());

        let mut fields = Map::new();
        fields.insert("url".to_string(), json!("https://new.example"));

        let err = service.update_url("missing", fields).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_get_stats_defaults_non_positive_limit() {
        let mut repo = MockShortUrlRepository::new();
        repo.expect_get_stats()
            .withf(|limit| *limit == DEFAULT_STATS_LIMIT)
            .times(2)
            .returning(|_| Ok(vec![]));
        repo.expect_get_stats()
            .withf(|limit| *limit == 3)
            .times(1)
            .returning(|_| {
                Ok(vec![
                    record("a", "https://a.example", true, 9),
                    record("b", "https://b.example", true, 5),
                    record("c", "https://c.example", true, 1),
                ])
            });

        let (service, _) = build_service(repo, MockIdGenerator::new(), idle_emitter());

        service.get_stats(0).await.unwrap();
        service.get_stats(-5).await.unwrap();
        let top = service.get_stats(3).await.unwrap();

        assert_eq!(top.len(), 3);
        assert!(top.windows(2).all(|w| w[0].clicks >= w[1].clicks));
    }
}
