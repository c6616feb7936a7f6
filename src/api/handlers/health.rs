//! Handler for health check endpoint.

use axum::{Json, extract::State, http::StatusCode};

use crate::api::dto::health::{CheckStatus, HealthChecks, HealthResponse};
use crate::state::AppState;

/// Returns service health status with component checks.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response Codes
///
/// - **200 OK**: All components healthy
/// - **503 Service Unavailable**: One or more components degraded
///
/// # Components Checked
///
/// 1. **Store**: Round trip to the record store
/// 2. **Cache**: Backend ping
/// 3. **Click emitter**: Transport still accepting events
/// 4. **Background tasks**: Worker alive, queue headroom
pub async fn health_handler(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    let store = check_store(&state).await;
    let cache = check_cache(&state).await;
    let click_emitter = check_click_emitter(&state);
    let background_tasks = check_background_tasks(&state);

    let all_healthy =
        store.is_ok() && cache.is_ok() && click_emitter.is_ok() && background_tasks.is_ok();

    let response = HealthResponse {
        status: if all_healthy { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: HealthChecks {
            store,
            cache,
            click_emitter,
            background_tasks,
        },
    };

    if all_healthy {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}

async fn check_store(state: &AppState) -> CheckStatus {
    match state.record_store.ping().await {
        Ok(()) => CheckStatus::ok("Connected"),
        Err(e) => CheckStatus::error(format!("Store error: {}", e)),
    }
}

async fn check_cache(state: &AppState) -> CheckStatus {
    let backend = state.cache.backend();

    if state.cache.health_check().await {
        CheckStatus::ok(format!("Backend: {backend}"))
    } else {
        CheckStatus::error(format!("Backend {backend} unreachable"))
    }
}

fn check_click_emitter(state: &AppState) -> CheckStatus {
    let transport = state.click_emitter.transport();

    if state.click_emitter.is_healthy() {
        CheckStatus::ok(format!("Transport: {transport}"))
    } else {
        CheckStatus::error(format!("Transport {transport} closed"))
    }
}

fn check_background_tasks(state: &AppState) -> CheckStatus {
    if state.tasks.is_closed() {
        CheckStatus::error("Task worker stopped")
    } else {
        CheckStatus::ok(format!(
            "Pending: {}, free slots: {}",
            state.tasks.pending(),
            state.tasks.capacity()
        ))
    }
}
