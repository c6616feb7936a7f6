//! Repository trait combining the record store with the cache layer.

use crate::domain::entities::ShortUrlRecord;
use crate::error::AppError;
use async_trait::async_trait;
use serde_json::{Map, Value};

/// Cache-aside access to short URL records.
///
/// Reads go to the cache first and fall back to the store; writes go to the
/// store and refresh the cache out of band.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::CachedShortUrlRepository`]
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ShortUrlRepository: Send + Sync {
    /// Creates a record with `clicks = 0`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::AlreadyExists`] on identifier collision.
    /// Returns [`AppError::TransientFailure`] on store errors.
    async fn save(&self, id: &str, url: &str, enabled: bool) -> Result<(), AppError>;

    /// Finds a record by identifier.
    ///
    /// An absent identifier yields the empty record
    /// ([`ShortUrlRecord::is_empty`]), not an error.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::TransientFailure`] on store errors. Cache errors
    /// are never returned.
    async fn find_by_id(&self, id: &str) -> Result<ShortUrlRecord, AppError>;

    /// Partially updates the mutable attributes named in `fields`.
    ///
    /// Unrecognized keys are dropped; if nothing is left the call succeeds
    /// without touching the store.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the identifier is absent.
    /// Returns [`AppError::InvalidInput`] if a recognized field has the wrong type.
    /// Returns [`AppError::TransientFailure`] on store errors.
    async fn update(&self, id: &str, fields: Map<String, Value>) -> Result<(), AppError>;

    /// Returns at most `limit` records ordered by descending `clicks`,
    /// straight from the store.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::TransientFailure`] on store errors.
    async fn get_stats(&self, limit: i64) -> Result<Vec<ShortUrlRecord>, AppError>;
}
