//! Imovia Storage Library
//!
//! Storage abstraction and implementations for the media pipeline. The
//! `Storage` trait is the capability the uploader and reconciler consume;
//! the local filesystem backend is the implementation that ships here.
//!
//! # Storage key format
//!
//! - **Property-owned objects**: `media/{property_id}/{filename}`
//! - **Staging (out-of-band uploads)**: `media/{staging_prefix}/{filename}`
//!
//! Keys must not contain `..` or a leading `/`. Key generation is centralized
//! in the `keys` module so all callers stay consistent.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
pub use imovia_core::StorageBackend;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
pub use traits::{ObjectInfo, Storage, StorageError, StorageResult};
