//! Cache wire format: a record serialized as one JSON blob.

use super::service::{CacheError, CacheResult};
use crate::domain::entities::ShortUrlRecord;

/// Key namespace for cached records.
pub const KEY_PREFIX: &str = "url:";

pub fn cache_key(id: &str) -> String {
    format!("{KEY_PREFIX}{id}")
}

pub fn encode_record(record: &ShortUrlRecord) -> CacheResult<String> {
    serde_json::to_string(record).map_err(|e| CacheError::Codec(e.to_string()))
}

pub fn decode_record(blob: &str) -> CacheResult<ShortUrlRecord> {
    serde_json::from_str(blob).map_err(|e| CacheError::Codec(e.to_string()))
}
