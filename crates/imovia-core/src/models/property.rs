use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(feature = "sqlx")]
use sqlx::FromRow;

/// A property listing.
///
/// `images` and `videos` are denormalized URL arrays derived from the
/// `property_media` table. After a successful sync pass each array equals the
/// URL set of matching-type media records, or `None` when that set is empty —
/// never `Some(vec![])`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(FromRow))]
pub struct Property {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub city: Option<String>,
    pub price: f64,
    pub status: String,
    pub published_at: DateTime<Utc>,
    pub images: Option<Vec<String>>,
    pub videos: Option<Vec<String>>,
}

impl Property {
    /// True when neither derived array holds a URL. Freshly published
    /// listings and listings whose media landed out-of-band look like this.
    pub fn has_no_media(&self) -> bool {
        self.images.as_deref().map_or(true, |v| v.is_empty())
            && self.videos.as_deref().map_or(true, |v| v.is_empty())
    }
}
