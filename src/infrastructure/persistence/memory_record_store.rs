//! In-memory record store.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use serde_json::json;

use crate::domain::entities::{NewShortUrl, ShortUrlPatch, ShortUrlRecord};
use crate::domain::repositories::RecordStore;
use crate::error::AppError;

/// [`RecordStore`] kept in a [`DashMap`].
///
/// Sharded locks let lookups and writes on different identifiers proceed
/// concurrently. Data lives for the life of the process; used for local
/// development and tests.
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    records: DashMap<String, ShortUrlRecord>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn create_if_absent(&self, new_record: NewShortUrl) -> Result<ShortUrlRecord, AppError> {
        match self.records.entry(new_record.id.clone()) {
            Entry::Occupied(_) => Err(AppError::already_exists(
                "Short URL already exists",
                json!({ "id": new_record.id }),
            )),
            Entry::Vacant(slot) => {
                let record = ShortUrlRecord::new(
                    new_record.id,
                    new_record.url,
                    Utc::now(),
                    new_record.enabled,
                    0,
                );
                slot.insert(record.clone());
                Ok(record)
            }
        }
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<ShortUrlRecord>, AppError> {
        Ok(self.records.get(id).map(|r| r.value().clone()))
    }

    async fn update_fields(&self, id: &str, patch: ShortUrlPatch) -> Result<(), AppError> {
        let mut record = self
            .records
            .get_mut(id)
            .ok_or_else(|| AppError::not_found("Short URL not found", json!({ "id": id })))?;

        patch.apply_to(record.value_mut());
        Ok(())
    }

    async fn top_by_clicks(&self, limit: i64) -> Result<Vec<ShortUrlRecord>, AppError> {
        let mut records: Vec<ShortUrlRecord> =
            self.records.iter().map(|r| r.value().clone()).collect();

        records.sort_by(|a, b| b.clicks.cmp(&a.clicks).then_with(|| a.id.cmp(&b.id)));
        records.truncate(usize::try_from(limit).unwrap_or(0));

        Ok(records)
    }

    async fn increment_clicks(&self, id: &str, by: i64) -> Result<(), AppError> {
        let mut record = self
            .records
            .get_mut(id)
            .ok_or_else(|| AppError::not_found("Short URL not found", json!({ "id": id })))?;

        record.clicks += by;
        Ok(())
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}
