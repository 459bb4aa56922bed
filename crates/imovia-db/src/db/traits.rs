//! Metadata-store capability traits.
//!
//! The pipeline never assumes a transaction spanning the metadata store and
//! the blob store; cross-store consistency is achieved only through the
//! reconciliation pass.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use imovia_core::models::{MediaRecord, Property};
use imovia_core::AppError;
use uuid::Uuid;

/// Access to the `property_media` table: one row per uploaded asset.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Insert one record. The (property_id, url) pair is unique; callers
    /// dedup by URL before inserting.
    async fn insert(&self, record: &MediaRecord) -> Result<(), AppError>;

    /// All records for a property. Order carries no semantic meaning.
    async fn list_for_property(&self, property_id: Uuid) -> Result<Vec<MediaRecord>, AppError>;

    /// Delete one record by id.
    async fn delete(&self, id: Uuid) -> Result<(), AppError>;

    /// Delete several records by id, returning the number removed.
    async fn delete_many(&self, ids: &[Uuid]) -> Result<u64, AppError>;
}

/// Access to the `properties` table for the fields the pipeline touches.
#[async_trait]
pub trait PropertyStore: Send + Sync {
    async fn get(&self, id: Uuid) -> Result<Option<Property>, AppError>;

    /// Most recently published properties, newest first.
    async fn recently_published(&self, limit: i64) -> Result<Vec<Property>, AppError>;

    /// Properties published in `[start, end)`, newest first.
    async fn published_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<Property>, AppError>;

    /// Overwrite the denormalized arrays. `None` means no media of that
    /// type; an empty vec must never be written.
    async fn set_media_arrays(
        &self,
        id: Uuid,
        images: Option<Vec<String>>,
        videos: Option<Vec<String>>,
    ) -> Result<(), AppError>;
}
