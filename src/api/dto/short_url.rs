//! DTOs for short URL creation, lookup and update.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::entities::ShortUrlRecord;

/// Request body for `POST /urls`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUrlRequest {
    #[validate(length(min = 1, max = 2048, message = "URL cannot be empty or longer than 2048 characters"))]
    pub url: String,
}

/// Response for `POST /urls`.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateUrlResponse {
    /// Full short URL, e.g. `https://sho.rt/r/Ab3_x9Z`.
    pub url: String,
}

/// A short URL record as returned by `GET /urls/{id}`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortUrlResponse {
    pub id: String,
    pub url: String,
    pub create_time: DateTime<Utc>,
    pub enabled: bool,
    pub clicks: i64,
}

impl From<ShortUrlRecord> for ShortUrlResponse {
    fn from(record: ShortUrlRecord) -> Self {
        Self {
            id: record.id,
            url: record.url,
            create_time: record.create_time,
            enabled: record.enabled,
            clicks: record.clicks,
        }
    }
}
