//! Infrastructure layer for external integrations.
//!
//! Implements the interfaces defined by the domain layer.
//!
//! # Modules
//!
//! - [`cache`] - Cache backends (Redis, moka, no-op)
//! - [`clicks`] - Click emitters (Redis pub/sub, in-process queue)
//! - [`persistence`] - Record stores and the cache-aside repository

pub mod cache;
pub mod clicks;
pub mod persistence;
