//! Domain layer containing business entities and data access contracts.
//!
//! The domain layer has no dependencies on infrastructure or presentation
//! layers. Repository traits define contracts implemented in
//! [`crate::infrastructure`].
//!
//! # Modules
//!
//! - [`entities`] - Core business data structures
//! - [`repositories`] - Record store and cache-aside repository traits
//! - [`click_event`] - Click notification model
//! - [`click_worker`] - In-process click aggregation pipeline
//!
//! # Click Processing Flow
//!
//! 1. A redirect resolves to a non-empty record
//! 2. The resolution service emits the identifier through a
//!    [`crate::infrastructure::clicks::ClickEmitter`] on a background task
//! 3. Either an external pipeline consumes the published identifier, or
//!    [`click_worker::run_click_worker`] increments the counter in the store

pub mod click_event;
pub mod click_worker;
pub mod entities;
pub mod repositories;
