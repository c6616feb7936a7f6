//! PostgreSQL implementation of the record store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{NewShortUrl, ShortUrlPatch, ShortUrlRecord};
use crate::domain::repositories::RecordStore;
use crate::error::AppError;

#[derive(sqlx::FromRow)]
struct ShortUrlRow {
    id: String,
    url: String,
    create_time: DateTime<Utc>,
    enabled: bool,
    clicks: i64,
}

impl From<ShortUrlRow> for ShortUrlRecord {
    fn from(row: ShortUrlRow) -> Self {
        ShortUrlRecord::new(row.id, row.url, row.create_time, row.enabled, row.clicks)
    }
}

/// PostgreSQL record store over the `short_urls` table.
///
/// Uses SQLx prepared statements for SQL injection protection.
pub struct PgRecordStore {
    pool: Arc<PgPool>,
}

impl PgRecordStore {
    /// Creates a new store with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn create_if_absent(&self, new_record: NewShortUrl) -> Result<ShortUrlRecord, AppError> {
        let row = sqlx::query_as::<_, ShortUrlRow>(
            r#"
            INSERT INTO short_urls (id, url, enabled)
            VALUES ($1, $2, $3)
            ON CONFLICT (id) DO NOTHING
            RETURNING id, url, create_time, enabled, clicks
            "#,
        )
        .bind(&new_record.id)
        .bind(&new_record.url)
        .bind(new_record.enabled)
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.map(ShortUrlRecord::from).ok_or_else(|| {
            AppError::already_exists(
                "Short URL already exists",
                json!({ "id": new_record.id }),
            )
        })
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<ShortUrlRecord>, AppError> {
        let row = sqlx::query_as::<_, ShortUrlRow>(
            r#"
            SELECT id, url, create_time, enabled, clicks
            FROM short_urls
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(ShortUrlRecord::from))
    }

    async fn update_fields(&self, id: &str, patch: ShortUrlPatch) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE short_urls
            SET url = COALESCE($2, url),
                enabled = COALESCE($3, enabled)
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(patch.url)
        .bind(patch.enabled)
        .execute(self.pool.as_ref())
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(
                "Short URL not found",
                json!({ "id": id }),
            ));
        }

        Ok(())
    }

    async fn top_by_clicks(&self, limit: i64) -> Result<Vec<ShortUrlRecord>, AppError> {
        let rows = sqlx::query_as::<_, ShortUrlRow>(
            r#"
            SELECT id, url, create_time, enabled, clicks
            FROM short_urls
            ORDER BY clicks DESC, id ASC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(ShortUrlRecord::from).collect())
    }

    async fn increment_clicks(&self, id: &str, by: i64) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE short_urls SET clicks = clicks + $2 WHERE id = $1")
            .bind(id)
            .bind(by)
            .execute(self.pool.as_ref())
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(
                "Short URL not found",
                json!({ "id": id }),
            ));
        }

        Ok(())
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(self.pool.as_ref())
            .await?;
        Ok(())
    }
}
