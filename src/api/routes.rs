//! API route configuration.

use crate::api::handlers::{
    create_url_handler, get_url_handler, redirect_handler, stats_handler, update_url_handler,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

/// Short URL routes.
///
/// # Endpoints
///
/// - `POST  /urls`       - Create a short URL
/// - `GET   /urls/{id}`  - Fetch a record
/// - `PATCH /urls/{id}`  - Partially update `url` / `enabled`
/// - `GET   /r/{id}`     - Redirect to the target URL
/// - `GET   /stats`      - Most clicked records
pub fn url_routes() -> Router<AppState> {
    Router::new()
        .route("/urls", post(create_url_handler))
        .route("/urls/{id}", get(get_url_handler).patch(update_url_handler))
        .route("/r/{id}", get(redirect_handler))
        .route("/stats", get(stats_handler))
}
