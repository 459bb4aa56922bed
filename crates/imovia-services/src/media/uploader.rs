//! Upload processing for a publish/edit request.
//!
//! Two independent best-effort passes: delete the records marked for removal,
//! then upload the new files one at a time. Only validation failures abort
//! the call; every per-item failure is recorded in the returned report and
//! the pass continues. There is no rollback and no automatic retry — a retry
//! could duplicate an already-stored object, so the pipeline favors partial
//! progress and leaves repair to reconciliation.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use imovia_core::config::UploadLimits;
use imovia_core::models::{MediaRecord, MediaType, UploadFile};
use imovia_core::validation::validate_batch;
use imovia_core::AppError;
use imovia_db::MediaStore;
use imovia_storage::{keys, Storage};
use serde::Serialize;
use tokio::time::timeout;
use uuid::Uuid;

use crate::media::sync::{ArrayCounts, MediaArraySync};

/// What happened to one queued file.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UploadOutcome {
    /// Binary stored and record inserted.
    Uploaded { url: String, media_type: MediaType },
    /// Binary upload failed; nothing was stored for this file.
    UploadFailed { error: String },
    /// Binary stored but the record insert failed. The object is orphaned
    /// until the next reconciliation pass.
    StoredWithoutRecord { url: String, error: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct FileOutcome {
    pub filename: String,
    #[serde(flatten)]
    pub outcome: UploadOutcome,
}

#[derive(Debug, Clone, Serialize)]
pub struct RemovalFailure {
    pub id: Uuid,
    pub error: String,
}

/// Batch outcome of one pipeline run. Per-item failures live here, not in
/// the `Result`.
#[derive(Debug, Clone, Serialize)]
pub struct UploadReport {
    pub property_id: Uuid,
    pub files: Vec<FileOutcome>,
    pub removed: u64,
    pub removal_failures: Vec<RemovalFailure>,
    /// Final derived-array counts, when the closing sync succeeded.
    pub arrays: Option<ArrayCounts>,
    pub sync_error: Option<String>,
}

impl UploadReport {
    pub fn uploaded_count(&self) -> usize {
        self.files
            .iter()
            .filter(|f| matches!(f.outcome, UploadOutcome::Uploaded { .. }))
            .count()
    }
}

pub struct MediaUploader {
    storage: Arc<dyn Storage>,
    media: Arc<dyn MediaStore>,
    sync: MediaArraySync,
    limits: UploadLimits,
    call_timeout: Duration,
}

impl MediaUploader {
    pub fn new(
        storage: Arc<dyn Storage>,
        media: Arc<dyn MediaStore>,
        sync: MediaArraySync,
        limits: UploadLimits,
        call_timeout: Duration,
    ) -> Self {
        Self {
            storage,
            media,
            sync,
            limits,
            call_timeout,
        }
    }

    /// Run the full pipeline for one property: removal pass, upload pass,
    /// then derived-array sync. Returns `Err` only for validation failures,
    /// raised before any I/O.
    #[tracing::instrument(
        skip(self, files, remove_ids),
        fields(property_id = %property_id, files = files.len(), removals = remove_ids.len())
    )]
    pub async fn process(
        &self,
        property_id: Uuid,
        files: Vec<UploadFile>,
        remove_ids: Vec<Uuid>,
    ) -> Result<UploadReport, AppError> {
        validate_batch(&files, &self.limits)?;

        let mut report = UploadReport {
            property_id,
            files: Vec::with_capacity(files.len()),
            removed: 0,
            removal_failures: Vec::new(),
            arrays: None,
            sync_error: None,
        };

        // Removal pass. Failures never block the upload pass.
        for id in remove_ids {
            match self.media.delete(id).await {
                Ok(()) => report.removed += 1,
                Err(e) => {
                    tracing::warn!(media_id = %id, error = %e, "Failed to remove media record");
                    report.removal_failures.push(RemovalFailure {
                        id,
                        error: e.to_string(),
                    });
                }
            }
        }

        // Upload pass, sequential. Timestamp-based names can collide within
        // one pass, so bump the millisecond counter per file.
        let mut unix_millis = Utc::now().timestamp_millis();
        for file in files {
            let outcome = self.upload_one(property_id, &file, unix_millis).await;
            unix_millis += 1;
            report.files.push(FileOutcome {
                filename: file.filename,
                outcome,
            });
        }

        match self.sync.sync_property(property_id).await {
            Ok(counts) => report.arrays = Some(counts),
            Err(e) => {
                // The arrays stay stale until the next sync or reconcile run.
                tracing::error!(property_id = %property_id, error = %e, "Array sync failed after upload pass");
                report.sync_error = Some(e.to_string());
            }
        }

        tracing::info!(
            uploaded = report.uploaded_count(),
            failed = report.files.len() - report.uploaded_count(),
            removed = report.removed,
            "Upload pipeline finished"
        );

        Ok(report)
    }

    async fn upload_one(
        &self,
        property_id: Uuid,
        file: &UploadFile,
        unix_millis: i64,
    ) -> UploadOutcome {
        let filename = keys::timestamped_filename(unix_millis, file.extension());
        let key = keys::property_key(property_id, &filename);

        let uploaded = timeout(
            self.call_timeout,
            self.storage
                .upload(&key, &file.content_type, file.data.to_vec()),
        )
        .await;

        let url = match uploaded {
            Ok(Ok(url)) => url,
            Ok(Err(e)) => {
                tracing::warn!(key = %key, error = %e, "File upload failed, skipping");
                return UploadOutcome::UploadFailed {
                    error: e.to_string(),
                };
            }
            Err(_) => {
                tracing::warn!(key = %key, "File upload timed out, skipping");
                return UploadOutcome::UploadFailed {
                    error: format!("upload of {} timed out", key),
                };
            }
        };

        let media_type = MediaType::from_content_type(&file.content_type);
        let record = MediaRecord::new(property_id, url.clone(), media_type);
        match self.media.insert(&record).await {
            Ok(()) => UploadOutcome::Uploaded { url, media_type },
            Err(e) => {
                tracing::warn!(
                    key = %key,
                    url = %url,
                    error = %e,
                    "Stored binary but failed to insert media record; object orphaned until reconciliation"
                );
                UploadOutcome::StoredWithoutRecord {
                    url,
                    error: e.to_string(),
                }
            }
        }
    }
}
