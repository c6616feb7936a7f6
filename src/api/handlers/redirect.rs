//! Handler for short URL redirect.

use axum::{
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use tracing::debug;

use crate::error::AppError;
use crate::state::AppState;

/// Redirects an identifier to its target URL.
///
/// # Endpoint
///
/// `GET /r/{id}`
///
/// # Outcomes
///
/// - **302 Found** to the target URL when the record is enabled
/// - **302 Found** to the disabled page when the record is disabled
/// - **404 Not Found** when the identifier is unknown
///
/// A click is emitted in the background for every known identifier; the
/// redirect never waits for it.
///
/// # Errors
///
/// Returns 500 if the store lookup fails.
pub async fn redirect_handler(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Response, AppError> {
    let (url, enabled) = state.url_service.get_url_to_redirect(&id).await?;

    if url.is_empty() {
        debug!(id = %id, "Redirect for unknown identifier");
        return Ok(StatusCode::NOT_FOUND.into_response());
    }

    let location = if enabled {
        url
    } else {
        debug!(id = %id, "Redirect for disabled identifier");
        state.disabled_redirect_path.clone()
    };

    Ok((StatusCode::FOUND, [(header::LOCATION, location)]).into_response())
}
