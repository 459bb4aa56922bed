//! Imovia Core Library
//!
//! This crate provides the domain models, error types, configuration, and
//! upload validation shared across all Imovia components.

pub mod config;
pub mod error;
pub mod models;
pub mod storage_types;
pub mod validation;

// Re-export commonly used types
pub use config::{Config, UploadLimits};
pub use error::AppError;
pub use storage_types::StorageBackend;
