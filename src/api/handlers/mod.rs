//! HTTP request handlers for API endpoints.

pub mod health;
pub mod redirect;
pub mod stats;
pub mod urls;

pub use health::health_handler;
pub use redirect::redirect_handler;
pub use stats::stats_handler;
pub use urls::{create_url_handler, get_url_handler, update_url_handler};
