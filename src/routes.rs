//! Top-level router combining API routes, health check and static assets.
//!
//! # Route Structure
//!
//! - `/urls`, `/r/{id}`, `/stats` - Short URL API ([`crate::api::routes`])
//! - `GET /health`               - Store, cache, click emitter, task pool
//! - `/static/*`                 - Static assets, including the disabled page
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Path normalization** - Trailing slash handling

use crate::api;
use crate::api::handlers::health_handler;
use crate::api::middleware::tracing;
use crate::state::AppState;
use axum::Router;
use axum::routing::get;
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};
use tower_http::services::ServeDir;

/// Directory served under `/static`.
pub const STATIC_DIR: &str = "static";

/// Constructs the application router with all routes and middleware.
pub fn app_router(state: AppState) -> NormalizePath<Router> {
    let router = Router::new()
        .merge(api::routes::url_routes())
        .route("/health", get(health_handler))
        .nest_service("/static", ServeDir::new(STATIC_DIR))
        .with_state(state)
        .layer(tracing::layer());

    NormalizePathLayer::trim_trailing_slash().layer(router)
}
