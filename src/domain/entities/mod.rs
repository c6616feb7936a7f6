//! Core domain entities.
//!
//! Entities are plain data structures. Creation and partial update use
//! dedicated input types:
//!
//! - [`ShortUrlRecord`] - A persisted short URL
//! - [`NewShortUrl`] - Input for create-if-absent
//! - [`ShortUrlPatch`] - Partial update of the mutable attributes

pub mod short_url;

pub use short_url::{NewShortUrl, ShortUrlPatch, ShortUrlRecord};
