//! Repository trait for the authoritative record store.

use crate::domain::entities::{NewShortUrl, ShortUrlPatch, ShortUrlRecord};
use crate::error::AppError;
use async_trait::async_trait;

/// Authoritative persistence for short URL records, keyed by identifier.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgRecordStore`] - PostgreSQL
/// - [`crate::infrastructure::persistence::InMemoryRecordStore`] - DashMap, for
///   development and tests
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Atomically creates a record unless the identifier is taken.
    ///
    /// The store assigns `create_time` and starts `clicks` at zero. The
    /// returned record is exactly what was persisted.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::AlreadyExists`] if the identifier is taken.
    /// Returns [`AppError::TransientFailure`] on any other failure.
    async fn create_if_absent(&self, new_record: NewShortUrl) -> Result<ShortUrlRecord, AppError>;

    /// Point lookup by identifier.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(record))` if found
    /// - `Ok(None)` if not found
    ///
    /// # Errors
    ///
    /// Returns [`AppError::TransientFailure`] on store errors.
    async fn find_by_id(&self, id: &str) -> Result<Option<ShortUrlRecord>, AppError>;

    /// Writes exactly the fields set in `patch`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no record has this identifier.
    /// Returns [`AppError::TransientFailure`] on store errors.
    async fn update_fields(&self, id: &str, patch: ShortUrlPatch) -> Result<(), AppError>;

    /// Returns at most `limit` records ordered by descending `clicks`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::TransientFailure`] on store errors.
    async fn top_by_clicks(&self, limit: i64) -> Result<Vec<ShortUrlRecord>, AppError>;

    /// Adds `by` to the click counter.
    ///
    /// Reserved for the click aggregation pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no record has this identifier.
    async fn increment_clicks(&self, id: &str, by: i64) -> Result<(), AppError>;

    /// Verifies the store is reachable.
    async fn ping(&self) -> Result<(), AppError>;
}
