//! Repository trait definitions for the domain layer.
//!
//! # Available Repositories
//!
//! - [`RecordStore`] - Authoritative persistence for short URL records
//! - [`ShortUrlRepository`] - Cache-aside facade used by the resolution service
//!
//! Implementations live in [`crate::infrastructure::persistence`]. Mock
//! implementations are generated via `mockall` for unit tests.

pub mod record_store;
pub mod short_url_repository;

pub use record_store::RecordStore;
pub use short_url_repository::ShortUrlRepository;

#[cfg(test)]
pub use record_store::MockRecordStore;
#[cfg(test)]
pub use short_url_repository::MockShortUrlRepository;
