//! Application layer: the resolution service and the background task pool.
//!
//! - [`services::UrlService`] - Identifier generation, cache-aside reads,
//!   updates, redirects and statistics
//! - [`background::BackgroundTasks`] - Bounded pool for fire-and-forget work

pub mod background;
pub mod services;
