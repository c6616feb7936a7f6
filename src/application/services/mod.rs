//! Business logic services for the application layer.

pub mod url_service;

pub use url_service::{DEFAULT_STATS_LIMIT, MAX_ID_ATTEMPTS, UrlService};
