//! Handler for the top-N statistics endpoint.

use axum::{
    Json,
    extract::{Query, State},
};

use crate::api::dto::stats::{StatsQuery, StatsResponse};
use crate::error::AppError;
use crate::state::AppState;

/// Lists the most clicked short URLs.
///
/// # Endpoint
///
/// `GET /stats?limit=N`
///
/// A missing, unparsable or non-positive `limit` returns the top 10.
/// Results are never served from the cache.
pub async fn stats_handler(
    State(state): State<AppState>,
    Query(query): Query<StatsQuery>,
) -> Result<Json<StatsResponse>, AppError> {
    let records = state.url_service.get_stats(query.limit).await?;

    Ok(Json(records.into_iter().map(Into::into).collect()))
}
