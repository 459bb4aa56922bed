//! Postgres repository for the `properties` table.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use imovia_core::models::Property;
use imovia_core::AppError;
use sqlx::PgPool;
use uuid::Uuid;

use super::traits::PropertyStore;

const PROPERTY_COLUMNS: &str =
    "id, title, description, city, price, status, published_at, images, videos";

#[derive(Clone)]
pub struct PgPropertyStore {
    pool: PgPool,
}

impl PgPropertyStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PropertyStore for PgPropertyStore {
    async fn get(&self, id: Uuid) -> Result<Option<Property>, AppError> {
        let property = sqlx::query_as::<_, Property>(&format!(
            "SELECT {} FROM properties WHERE id = $1",
            PROPERTY_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(property)
    }

    async fn recently_published(&self, limit: i64) -> Result<Vec<Property>, AppError> {
        let properties = sqlx::query_as::<_, Property>(&format!(
            "SELECT {} FROM properties ORDER BY published_at DESC LIMIT $1",
            PROPERTY_COLUMNS
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(properties)
    }

    async fn published_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<Property>, AppError> {
        let properties = sqlx::query_as::<_, Property>(&format!(
            "SELECT {} FROM properties \
             WHERE published_at >= $1 AND published_at < $2 \
             ORDER BY published_at DESC LIMIT $3",
            PROPERTY_COLUMNS
        ))
        .bind(start)
        .bind(end)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(properties)
    }

    async fn set_media_arrays(
        &self,
        id: Uuid,
        images: Option<Vec<String>>,
        videos: Option<Vec<String>>,
    ) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE properties SET images = $2, videos = $3 WHERE id = $1")
            .bind(id)
            .bind(&images)
            .bind(&videos)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("property {}", id)));
        }

        tracing::debug!(
            property_id = %id,
            images = images.as_ref().map(|v| v.len()).unwrap_or(0),
            videos = videos.as_ref().map(|v| v.len()).unwrap_or(0),
            "Updated derived media arrays"
        );

        Ok(())
    }
}
