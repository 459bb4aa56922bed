//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must
//! implement, plus the storage error taxonomy.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use imovia_core::StorageBackend;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("List failed: {0}")]
    ListFailed(String),

    #[error("Move failed: {0}")]
    MoveFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// One object in a listing: name relative to the listed prefix, plus the
/// last-modified time used for staging window matching.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectInfo {
    pub name: String,
    pub last_modified: DateTime<Utc>,
}

/// Storage abstraction trait
///
/// The media pipeline holds no ownership over stored objects beyond a
/// back-reference by key; media records carry the public URL as a weak
/// reference. All backends must use the key layout documented at the crate
/// root.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Upload bytes to a key and return the public URL.
    async fn upload(&self, key: &str, content_type: &str, data: Vec<u8>)
        -> StorageResult<String>;

    /// List the objects directly under a prefix (non-recursive).
    ///
    /// Returns an empty vec for a prefix with no objects.
    async fn list(&self, prefix: &str) -> StorageResult<Vec<ObjectInfo>>;

    /// Rename an object at the storage layer.
    async fn move_object(&self, from_key: &str, to_key: &str) -> StorageResult<()>;

    /// Public URL for a key. Pure key-to-URL mapping, no I/O.
    fn public_url(&self, key: &str) -> String;

    /// Delete an object by key. Deleting a missing object is not an error.
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
