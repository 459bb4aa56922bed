//! Derived-array synchronization.
//!
//! The `properties.images`/`videos` columns are denormalized from the
//! `property_media` table. This service re-derives them after every mutating
//! operation: fetch all records, partition by type, overwrite both columns.
//! An empty partition is written as NULL, never as an empty array.

use std::sync::Arc;

use imovia_core::models::MediaType;
use imovia_core::AppError;
use imovia_db::{MediaStore, PropertyStore};
use serde::Serialize;
use uuid::Uuid;

/// How many URLs each derived array ended up with.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct ArrayCounts {
    pub images: usize,
    pub videos: usize,
}

#[derive(Clone)]
pub struct MediaArraySync {
    media: Arc<dyn MediaStore>,
    properties: Arc<dyn PropertyStore>,
}

impl MediaArraySync {
    pub fn new(media: Arc<dyn MediaStore>, properties: Arc<dyn PropertyStore>) -> Self {
        Self { media, properties }
    }

    /// Recompute and overwrite both arrays for one property.
    ///
    /// Idempotent: two consecutive runs with no intervening record changes
    /// write identical values. URL order is whatever the store returns;
    /// order carries no semantic meaning.
    #[tracing::instrument(skip(self), fields(property_id = %property_id))]
    pub async fn sync_property(&self, property_id: Uuid) -> Result<ArrayCounts, AppError> {
        let records = self.media.list_for_property(property_id).await?;

        let mut images = Vec::new();
        let mut videos = Vec::new();
        for record in records {
            match record.media_type {
                MediaType::Image => images.push(record.url),
                MediaType::Video => videos.push(record.url),
            }
        }

        let counts = ArrayCounts {
            images: images.len(),
            videos: videos.len(),
        };

        self.properties
            .set_media_arrays(
                property_id,
                (!images.is_empty()).then_some(images),
                (!videos.is_empty()).then_some(videos),
            )
            .await?;

        tracing::info!(
            images = counts.images,
            videos = counts.videos,
            "Synchronized derived media arrays"
        );

        Ok(counts)
    }
}
