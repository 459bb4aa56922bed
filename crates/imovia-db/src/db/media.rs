//! Postgres repository for the `property_media` table.

use async_trait::async_trait;
use imovia_core::models::MediaRecord;
use imovia_core::AppError;
use sqlx::PgPool;
use uuid::Uuid;

use super::traits::MediaStore;

#[derive(Clone)]
pub struct PgMediaStore {
    pool: PgPool,
}

impl PgMediaStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MediaStore for PgMediaStore {
    async fn insert(&self, record: &MediaRecord) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO property_media (id, property_id, url, media_type, uploaded_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(record.id)
        .bind(record.property_id)
        .bind(&record.url)
        .bind(record.media_type)
        .bind(record.uploaded_at)
        .execute(&self.pool)
        .await?;

        tracing::debug!(
            media_id = %record.id,
            property_id = %record.property_id,
            url = %record.url,
            "Inserted media record"
        );

        Ok(())
    }

    async fn list_for_property(&self, property_id: Uuid) -> Result<Vec<MediaRecord>, AppError> {
        let records = sqlx::query_as::<_, MediaRecord>(
            r#"
            SELECT id, property_id, url, media_type, uploaded_at
            FROM property_media
            WHERE property_id = $1
            ORDER BY uploaded_at
            "#,
        )
        .bind(property_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM property_media WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("media record {}", id)));
        }

        Ok(())
    }

    async fn delete_many(&self, ids: &[Uuid]) -> Result<u64, AppError> {
        if ids.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query("DELETE FROM property_media WHERE id = ANY($1)")
            .bind(ids)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
