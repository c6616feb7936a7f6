//! Cache layer mirroring record store entries.
//!
//! Provides a [`CacheService`] trait with three implementations:
//! - [`RedisCache`] - Production Redis-backed cache
//! - [`MemoryCache`] - Single-process cache (moka)
//! - [`NullCache`] - No-op implementation for disabled caching
//!
//! All backends store complete records in the [`codec`] wire format.

pub mod codec;
mod memory_cache;
mod null_cache;
mod redis_cache;
mod service;

pub use memory_cache::MemoryCache;
pub use null_cache::NullCache;
pub use redis_cache::{RedisCache, connect_manager};
pub use service::{CacheError, CacheResult, CacheService};

#[cfg(test)]
pub use service::MockCacheService;
