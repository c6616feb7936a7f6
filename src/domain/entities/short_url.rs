//! Short URL record, creation input and partial-update patch.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::error::AppError;

/// A short URL as persisted in the record store and mirrored in the cache.
///
/// The zero value (`ShortUrlRecord::default()`) is the "not found" sentinel
/// returned by read paths; see [`ShortUrlRecord::is_empty`].
///
/// The JSON form doubles as the cache wire format, so every field is always
/// serialized, including zero timestamps and counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortUrlRecord {
    pub id: String,
    pub url: String,
    pub create_time: DateTime<Utc>,
    pub enabled: bool,
    pub clicks: i64,
}

impl ShortUrlRecord {
    pub fn new(
        id: String,
        url: String,
        create_time: DateTime<Utc>,
        enabled: bool,
        clicks: i64,
    ) -> Self {
        Self {
            id,
            url,
            create_time,
            enabled,
            clicks,
        }
    }

    /// Returns true for the "not found" sentinel.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Input for the store's create-if-absent operation.
///
/// `create_time` is assigned by the store and `clicks` always starts at zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewShortUrl {
    pub id: String,
    pub url: String,
    pub enabled: bool,
}

/// Partial update restricted to the mutable attributes.
///
/// `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShortUrlPatch {
    pub url: Option<String>,
    pub enabled: Option<bool>,
}

impl ShortUrlPatch {
    /// Builds a patch from an arbitrary field map.
    ///
    /// Keys are matched case-insensitively against `url` and `enabled`;
    /// every other key is dropped without complaint.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::InvalidInput`] if a recognized key carries a value of
    /// the wrong JSON type (`url` must be a string, `enabled` a boolean).
    pub fn from_fields(fields: &Map<String, Value>) -> Result<Self, AppError> {
        let mut patch = Self::default();

        for (key, value) in fields {
            if key.eq_ignore_ascii_case("url") {
                let url = value.as_str().ok_or_else(|| {
                    AppError::invalid_input(
                        "Field 'url' must be a string",
                        json!({ "field": key, "value": value }),
                    )
                })?;
                patch.url = Some(url.to_string());
            } else if key.eq_ignore_ascii_case("enabled") {
                let enabled = value.as_bool().ok_or_else(|| {
                    AppError::invalid_input(
                        "Field 'enabled' must be a boolean",
                        json!({ "field": key, "value": value }),
                    )
                })?;
                patch.enabled = Some(enabled);
            }
        }

        Ok(patch)
    }

    /// Returns true when no recognized attribute is set.
    pub fn is_empty(&self) -> bool {
        self.url.is_none() && self.enabled.is_none()
    }

    /// Applies the patch onto a record in place.
    pub fn apply_to(&self, record: &mut ShortUrlRecord) {
        if let Some(url) = &self.url {
            record.url = url.clone();
        }
        if let Some(enabled) = self.enabled {
            record.enabled = enabled;
        }
    }
}
