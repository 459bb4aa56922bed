//! Validation modules

pub mod upload;

pub use upload::{
    validate_batch, validate_file, ALLOWED_IMAGE_TYPES, ALLOWED_VIDEO_TYPES,
    DANGEROUS_EXTENSIONS,
};
