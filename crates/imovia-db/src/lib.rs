//! Database layer for the Imovia media pipeline.
//!
//! The `MediaStore` and `PropertyStore` traits are the metadata capabilities
//! the services consume; `PgMediaStore` and `PgPropertyStore` are the
//! Postgres implementations. Services always take `Arc<dyn …>` so tests can
//! inject in-memory fakes.

pub mod db;

pub use db::media::PgMediaStore;
pub use db::property::PgPropertyStore;
pub use db::traits::{MediaStore, PropertyStore};
