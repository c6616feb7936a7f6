#![allow(dead_code)]

use axum::extract::Request;
use axum::{Router, ServiceExt};
use axum::routing::get;
use axum_test::TestServer;
use serde_json::{Value, json};
use short_url::api::handlers::health_handler;
use short_url::api::routes::url_routes;
use short_url::config::Config;
use short_url::routes::app_router;
use short_url::server::build_state;
use short_url::state::AppState;
use std::time::Duration;

pub const TEST_HOST: &str = "sho.rt";

/// State backed by the in-memory store and cache, with clicks aggregated
/// in-process.
pub async fn create_test_state() -> AppState {
    let config = Config {
        task_queue_capacity: 1_000,
        click_queue_capacity: 1_000,
        ..Config::default()
    };

    let (state, _runtime) = build_state(&config).await.unwrap();
    state
}

pub fn test_app(state: AppState) -> Router {
    Router::new()
        .merge(url_routes())
        .route("/health", get(health_handler))
        .with_state(state)
}

pub fn test_server(state: AppState) -> TestServer {
    TestServer::new(test_app(state)).unwrap()
}

/// Server over the full application router, middleware and static assets
/// included.
pub fn app_server(state: AppState) -> TestServer {
    TestServer::new(ServiceExt::<Request>::into_make_service(app_router(state))).unwrap()
}

/// Creates a short URL through the API and returns its identifier.
pub async fn create_short_url(server: &TestServer, url: &str) -> String {
    let response = server
        .post("/urls")
        .add_header("Host", TEST_HOST)
        .json(&json!({ "url": url }))
        .await;

    assert_eq!(response.status_code(), 201);

    let body: Value = response.json();
    id_from_short_url(body["url"].as_str().unwrap())
}

pub fn id_from_short_url(short_url: &str) -> String {
    short_url.rsplit("/r/").next().unwrap().to_string()
}

/// Waits until the record's click counter reaches `expected`.
pub async fn wait_for_clicks(state: &AppState, id: &str, expected: i64) -> i64 {
    let mut clicks = 0;

    for _ in 0..100 {
        state.tasks.flush().await;
        clicks = state
            .record_store
            .find_by_id(id)
            .await
            .unwrap()
            .map(|r| r.clicks)
            .unwrap_or(0);

        if clicks >= expected {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    clicks
}
