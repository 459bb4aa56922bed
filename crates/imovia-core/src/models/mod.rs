//! Domain models shared across the workspace.

pub mod media;
pub mod property;

pub use media::{MediaRecord, MediaType, UploadFile, VIDEO_EXTENSIONS};
pub use property::Property;
