//! Handlers for short URL creation, lookup and partial update.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
};
use serde_json::{Value, json};
use tracing::info;
use validator::Validate;

use crate::api::dto::short_url::{CreateUrlRequest, CreateUrlResponse, ShortUrlResponse};
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::short_url_builder::build_short_url;
use crate::utils::url_validator::validate_url;

/// Creates a short URL.
///
/// # Endpoint
///
/// `POST /urls`
///
/// # Request Body
///
/// ```json
/// { "url": "https://example.com/some/long/path" }
/// ```
///
/// # Response
///
/// **201 Created**
///
/// ```json
/// { "url": "https://sho.rt/r/Ab3_x9Z" }
/// ```
///
/// # Errors
///
/// Returns 400 Bad Request if the body is not valid JSON, or if the URL is
/// longer than 2048 characters, contains control characters or surrounding
/// whitespace, or lacks a scheme or host.
/// Returns 500 if identifier generation collided on every attempt or the
/// store failed.
pub async fn create_url_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<CreateUrlRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateUrlResponse>), AppError> {
    let Json(payload) = payload?;
    payload.validate()?;
    validate_url(&payload.url)?;

    let id = state.url_service.generate_id(&payload.url).await?;
    let short_url = build_short_url(state.public_base_url.as_deref(), &headers, &id)?;

    info!(long_url = %payload.url, short_url = %short_url, "Short URL created");

    Ok((StatusCode::CREATED, Json(CreateUrlResponse { url: short_url })))
}

/// Returns the full record behind an identifier.
///
/// # Endpoint
///
/// `GET /urls/{id}`
///
/// # Errors
///
/// Returns 404 Not Found if the identifier is unknown.
pub async fn get_url_handler(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ShortUrlResponse>, AppError> {
    let record = state.url_service.get_url(&id).await?;

    if record.is_empty() {
        return Err(AppError::not_found(
            "Short URL not found",
            json!({ "id": id }),
        ));
    }

    Ok(Json(record.into()))
}

/// Partially updates a short URL.
///
/// # Endpoint
///
/// `PATCH /urls/{id}`
///
/// # Request Body
///
/// Any JSON object. Only `url` (string) and `enabled` (boolean) are applied,
/// matched case-insensitively; every other key is ignored.
///
/// ```json
/// { "url": "https://new.example", "enabled": false }
/// ```
///
/// # Errors
///
/// Returns 400 Bad Request if the body is not a JSON object, a recognized field
/// has the wrong type, or the new URL is invalid.
/// Returns 404 Not Found if the identifier is unknown.
pub async fn update_url_handler(
    Path(id): Path<String>,
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    let Json(payload) = payload?;
    let Value::Object(fields) = payload else {
        return Err(AppError::invalid_input(
            "Request body must be a JSON object",
            json!({ "id": id }),
        ));
    };

    for (key, value) in &fields {
        if key.eq_ignore_ascii_case("url")
            && let Some(url) = value.as_str()
        {
            validate_url(url)?;
        }
    }

    state.url_service.update_url(&id, fields).await?;

    Ok(StatusCode::OK)
}
