//! Shared key generation for storage backends.
//!
//! Key format: `media/{property_id}/{filename}` for property-owned objects,
//! `media/{staging_prefix}/{filename}` for the shared staging folder.

use uuid::Uuid;

/// Top-level prefix all media objects live under.
pub const MEDIA_PREFIX: &str = "media";

/// Prefix holding one property's objects.
pub fn property_prefix(property_id: Uuid) -> String {
    format!("{}/{}", MEDIA_PREFIX, property_id)
}

/// Key for a named object inside a property's folder.
pub fn property_key(property_id: Uuid, filename: &str) -> String {
    format!("{}/{}/{}", MEDIA_PREFIX, property_id, filename)
}

/// Prefix of the shared staging folder for out-of-band uploads.
pub fn staging_prefix(staging: &str) -> String {
    format!("{}/{}", MEDIA_PREFIX, staging)
}

/// Upload filename derived from a timestamp, as the publish form does:
/// `{unix_millis}.{ext}`.
pub fn timestamped_filename(unix_millis: i64, extension: &str) -> String {
    format!("{}.{}", unix_millis, extension)
}
