//! Record store implementations and the cache-aside repository.
//!
//! - [`PgRecordStore`] - PostgreSQL, the production store
//! - [`InMemoryRecordStore`] - DashMap, for development and tests
//! - [`CachedShortUrlRepository`] - Cache-aside facade over any store and cache

pub mod cached_repository;
pub mod memory_record_store;
pub mod pg_record_store;

pub use cached_repository::CachedShortUrlRepository;
pub use memory_record_store::InMemoryRecordStore;
pub use pg_record_store::PgRecordStore;
