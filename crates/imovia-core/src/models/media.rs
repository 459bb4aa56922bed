use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(feature = "sqlx")]
use sqlx::FromRow;

/// Filename extensions treated as video during reconciliation. Anything else
/// is recorded as an image, matching the legacy repair job.
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "webm", "mkv", "avi"];

/// Media type enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "media_type", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Image,
    Video,
}

impl MediaType {
    /// Infer type from a MIME content type. Used on the upload path, where
    /// the browser-supplied content type is available.
    pub fn from_content_type(content_type: &str) -> MediaType {
        if content_type.starts_with("video") {
            MediaType::Video
        } else {
            MediaType::Image
        }
    }

    /// Infer type from a filename extension. Used on the reconcile path,
    /// where only the stored object name is available.
    pub fn from_filename(filename: &str) -> MediaType {
        let ext = filename.rsplit('.').next().unwrap_or("").to_lowercase();
        if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            MediaType::Video
        } else {
            MediaType::Image
        }
    }
}

/// Ground-truth metadata row for one uploaded asset.
///
/// The `url` is a weak reference to the storage object's public URL; deleting
/// a record does not delete the object. URL is unique per property.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(FromRow))]
pub struct MediaRecord {
    pub id: Uuid,
    pub property_id: Uuid,
    pub url: String,
    pub media_type: MediaType,
    pub uploaded_at: DateTime<Utc>,
}

impl MediaRecord {
    pub fn new(property_id: Uuid, url: String, media_type: MediaType) -> Self {
        Self {
            id: Uuid::new_v4(),
            property_id,
            url,
            media_type,
            uploaded_at: Utc::now(),
        }
    }
}

/// A validated file queued for upload: original filename, browser-supplied
/// content type, and the raw bytes.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub filename: String,
    pub content_type: String,
    pub data: Bytes,
}

impl UploadFile {
    pub fn new(
        filename: impl Into<String>,
        content_type: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        Self {
            filename: filename.into(),
            content_type: content_type.into(),
            data: data.into(),
        }
    }

    /// Last dot-segment of the original filename, as the publish form used it.
    pub fn extension(&self) -> &str {
        self.filename.rsplit('.').next().unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_type_inference() {
        assert_eq!(
            MediaType::from_content_type("video/mp4"),
            MediaType::Video
        );
        assert_eq!(
            MediaType::from_content_type("image/jpeg"),
            MediaType::Image
        );
        // Unknown content types fall back to image, as the legacy form did
        assert_eq!(
            MediaType::from_content_type("application/octet-stream"),
            MediaType::Image
        );
    }

    #[test]
    fn filename_inference() {
        assert_eq!(MediaType::from_filename("clip.mp4"), MediaType::Video);
        assert_eq!(MediaType::from_filename("clip.MOV"), MediaType::Video);
        assert_eq!(MediaType::from_filename("photo.jpg"), MediaType::Image);
        assert_eq!(MediaType::from_filename("noext"), MediaType::Image);
    }

    #[test]
    fn record_url_is_kept_verbatim() {
        let property_id = Uuid::new_v4();
        let record = MediaRecord::new(
            property_id,
            "http://cdn.example/media/p/1.jpg".to_string(),
            MediaType::Image,
        );
        assert_eq!(record.property_id, property_id);
        assert_eq!(record.url, "http://cdn.example/media/p/1.jpg");
    }
}
