//! Upload batch validation.
//!
//! All checks run before any I/O starts; a violation aborts the whole batch.
//! Per-file storage failures later in the pipeline are handled separately and
//! never reach this module.

use crate::config::UploadLimits;
use crate::error::AppError;
use crate::models::UploadFile;

/// Content types accepted for images.
pub const ALLOWED_IMAGE_TYPES: &[&str] = &[
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/webp",
    "image/gif",
];

/// Content types accepted for videos.
pub const ALLOWED_VIDEO_TYPES: &[&str] = &[
    "video/mp4",
    "video/mpeg",
    "video/quicktime",
    "video/x-msvideo",
    "video/webm",
];

/// Extensions rejected outright regardless of the declared content type.
pub const DANGEROUS_EXTENSIONS: &[&str] = &[
    ".exe", ".bat", ".cmd", ".com", ".pif", ".scr", ".vbs", ".js", ".jar", ".php", ".asp",
    ".aspx", ".jsp", ".py", ".rb", ".pl", ".sh", ".ps1",
];

/// Validate a single file: extension blocklist, content type allowlist, and
/// the per-type size cap.
pub fn validate_file(file: &UploadFile, limits: &UploadLimits) -> Result<(), AppError> {
    let name = file.filename.to_lowercase();
    if DANGEROUS_EXTENSIONS.iter().any(|ext| name.ends_with(ext)) {
        return Err(AppError::InvalidInput(format!(
            "File type not allowed for security reasons: {}",
            file.filename
        )));
    }

    let is_image = ALLOWED_IMAGE_TYPES.contains(&file.content_type.as_str());
    let is_video = ALLOWED_VIDEO_TYPES.contains(&file.content_type.as_str());
    if !is_image && !is_video {
        return Err(AppError::InvalidInput(format!(
            "Unsupported content type '{}' for {}",
            file.content_type, file.filename
        )));
    }

    let max = if is_video {
        limits.max_video_size_bytes
    } else {
        limits.max_image_size_bytes
    };
    if file.data.len() > max {
        return Err(AppError::PayloadTooLarge(format!(
            "{} is {} bytes, limit is {} bytes",
            file.filename,
            file.data.len(),
            max
        )));
    }

    Ok(())
}

/// Validate a whole upload batch: count limit, then each file.
pub fn validate_batch(files: &[UploadFile], limits: &UploadLimits) -> Result<(), AppError> {
    if files.len() > limits.max_files_per_batch {
        return Err(AppError::InvalidInput(format!(
            "Too many files: {} exceeds the limit of {}",
            files.len(),
            limits.max_files_per_batch
        )));
    }
    for file in files {
        validate_file(file, limits)?;
    }
    Ok(())
}
