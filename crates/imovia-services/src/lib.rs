//! Imovia Services
//!
//! The media pipeline: upload processing, derived-array synchronization, and
//! the background reconciliation job. All services take their stores as
//! injected capabilities (`Arc<dyn …>`), never as globals.

pub mod media;
pub mod reconcile;

pub use media::sync::{ArrayCounts, MediaArraySync};
pub use media::uploader::{
    FileOutcome, MediaUploader, RemovalFailure, UploadOutcome, UploadReport,
};
pub use reconcile::service::{
    PropertyReconcileReport, ReconcileConfig, ReconcileReport, ReconcileService,
};
