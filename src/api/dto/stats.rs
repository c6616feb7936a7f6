//! DTOs for the statistics endpoint.

use serde::{Deserialize, Deserializer};

use super::short_url::ShortUrlResponse;

/// Query string for `GET /stats`.
///
/// An absent or unparsable `limit` becomes `0`, which the service replaces
/// with its default.
#[derive(Debug, Default, Deserialize)]
pub struct StatsQuery {
    #[serde(default, deserialize_with = "lenient_limit")]
    pub limit: i64,
}

fn lenient_limit<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| s.trim().parse().ok()).unwrap_or(0))
}

/// Records ordered by descending clicks.
pub type StatsResponse = Vec<ShortUrlResponse>;
