//! Background reconciliation.
//!
//! Repairs properties whose media landed in storage without going through the
//! upload pipeline: a property's own folder is treated as authoritative when
//! non-empty; otherwise staged objects are attributed to the property by a
//! publish-time window and moved into its folder. Records are created for
//! any object whose URL is not yet known, and the derived arrays are re-synced
//! unconditionally at the end of every property's pass.
//!
//! Time-window attribution is a heuristic: two properties published within
//! the window of each other can claim each other's staged files. New upload
//! paths should always target a property-scoped key directly.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use imovia_core::models::{MediaRecord, MediaType, Property};
use imovia_core::{AppError, Config};
use imovia_db::{MediaStore, PropertyStore};
use imovia_storage::{keys, ObjectInfo, Storage};
use serde::Serialize;
use tokio::sync::Mutex;
use tokio::time::{interval, timeout};
use uuid::Uuid;

use crate::media::sync::MediaArraySync;

#[derive(Clone, Debug)]
pub struct ReconcileConfig {
    /// Shared staging folder name for out-of-band uploads.
    pub staging_prefix: String,
    /// Tolerance window around a property's publish time for staging
    /// attribution.
    pub window: Duration,
    /// Maximum number of staged objects attributed to one property; also the
    /// size of the most-recently-modified fallback selection.
    pub fallback_count: usize,
    /// Number of target properties per batch.
    pub batch_size: i64,
    /// Interval between scheduled runs.
    pub run_interval: Duration,
    /// Timeout applied to each storage call. A timeout is treated like any
    /// other per-item failure.
    pub call_timeout: Duration,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            staging_prefix: "staging".to_string(),
            window: Duration::from_secs(2 * 60 * 60),
            fallback_count: 5,
            batch_size: 2,
            run_interval: Duration::from_secs(3600),
            call_timeout: Duration::from_secs(30),
        }
    }
}

impl From<&Config> for ReconcileConfig {
    fn from(config: &Config) -> Self {
        Self {
            staging_prefix: config.staging_prefix.clone(),
            window: config.reconcile_window,
            fallback_count: config.reconcile_fallback_count,
            batch_size: config.reconcile_batch_size,
            run_interval: config.reconcile_interval,
            call_timeout: config.storage_call_timeout,
        }
    }
}

/// Outcome of one property's repair pass.
#[derive(Debug, Clone, Serialize)]
pub struct PropertyReconcileReport {
    pub property_id: Uuid,
    pub records_created: usize,
    pub moved: usize,
    /// Objects skipped because of a per-object list/move/insert failure.
    pub skipped: usize,
    /// True when no staged object fell inside the window and the
    /// most-recently-modified fallback was used.
    pub fallback_used: bool,
    pub images: usize,
    pub videos: usize,
    /// Set when the pass aborted for this property; the batch continued.
    pub error: Option<String>,
}

impl PropertyReconcileReport {
    fn new(property_id: Uuid) -> Self {
        Self {
            property_id,
            records_created: 0,
            moved: 0,
            skipped: 0,
            fallback_used: false,
            images: 0,
            videos: 0,
            error: None,
        }
    }

    fn failed(property_id: Uuid, error: &AppError) -> Self {
        Self {
            error: Some(error.to_string()),
            ..Self::new(property_id)
        }
    }
}

/// Outcome of one batch.
#[derive(Debug, Clone, Serialize)]
pub struct ReconcileReport {
    pub properties: Vec<PropertyReconcileReport>,
}

impl ReconcileReport {
    pub fn records_created(&self) -> usize {
        self.properties.iter().map(|p| p.records_created).sum()
    }

    pub fn failed_properties(&self) -> usize {
        self.properties.iter().filter(|p| p.error.is_some()).count()
    }
}

pub struct ReconcileService {
    storage: Arc<dyn Storage>,
    media: Arc<dyn MediaStore>,
    properties: Arc<dyn PropertyStore>,
    sync: MediaArraySync,
    config: ReconcileConfig,
    // Single-flight within this process. Overlapping runs across processes
    // are not excluded; see DESIGN.md.
    run_guard: Mutex<()>,
}

impl ReconcileService {
    pub fn new(
        storage: Arc<dyn Storage>,
        media: Arc<dyn MediaStore>,
        properties: Arc<dyn PropertyStore>,
        sync: MediaArraySync,
        config: ReconcileConfig,
    ) -> Self {
        Self {
            storage,
            media,
            properties,
            sync,
            config,
            run_guard: Mutex::new(()),
        }
    }

    /// Start the scheduled reconciliation task.
    /// Returns a JoinHandle for graceful shutdown.
    pub fn start(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut run_interval = interval(self.config.run_interval);

            loop {
                run_interval.tick().await;

                tracing::info!("Starting scheduled media reconciliation");

                match self.run_once().await {
                    Ok(report) => tracing::info!(
                        properties = report.properties.len(),
                        records_created = report.records_created(),
                        failed = report.failed_properties(),
                        "Reconciliation batch completed"
                    ),
                    Err(e) => tracing::error!(error = %e, "Reconciliation batch failed"),
                }
            }
        })
    }

    /// Run one batch over the target properties. A property's failure is
    /// recorded in its report entry and never aborts the batch.
    #[tracing::instrument(skip(self))]
    pub async fn run_once(&self) -> Result<ReconcileReport, AppError> {
        let _guard = self.run_guard.lock().await;

        let targets = self.select_targets().await?;
        tracing::info!(
            targets = targets.len(),
            "Selected reconciliation targets"
        );

        let mut properties = Vec::with_capacity(targets.len());
        for property in &targets {
            let report = match self.reconcile_property(property).await {
                Ok(report) => report,
                Err(e) => {
                    tracing::error!(
                        property_id = %property.id,
                        error = %e.detailed_message(),
                        "Failed to reconcile property"
                    );
                    PropertyReconcileReport::failed(property.id, &e)
                }
            };
            properties.push(report);
        }

        Ok(ReconcileReport { properties })
    }

    /// Properties published today (UTC), falling back to the most recently
    /// published ones when today is empty, as the legacy job did.
    async fn select_targets(&self) -> Result<Vec<Property>, AppError> {
        let start = Utc::now()
            .date_naive()
            .and_time(chrono::NaiveTime::MIN)
            .and_utc();
        let end = start + chrono::Duration::days(1);

        let today = self
            .properties
            .published_between(start, end, self.config.batch_size)
            .await?;
        if !today.is_empty() {
            return Ok(today);
        }

        self.properties
            .recently_published(self.config.batch_size)
            .await
    }

    async fn reconcile_property(
        &self,
        property: &Property,
    ) -> Result<PropertyReconcileReport, AppError> {
        let mut report = PropertyReconcileReport::new(property.id);
        let prefix = keys::property_prefix(property.id);

        let mut objects = self.list_objects(&prefix).await?;

        // An empty property folder means the files never reached it; try to
        // attribute staged objects by publish-time proximity.
        if objects.is_empty() {
            let selected = self.select_staged(property, &mut report).await;
            if !selected.is_empty() {
                let staging = keys::staging_prefix(&self.config.staging_prefix);
                for object in &selected {
                    let from_key = format!("{}/{}", staging, object.name);
                    let to_key = keys::property_key(property.id, &object.name);
                    match self.move_object(&from_key, &to_key).await {
                        Ok(()) => report.moved += 1,
                        Err(e) => {
                            tracing::warn!(
                                from_key = %from_key,
                                to_key = %to_key,
                                error = %e,
                                "Failed to move staged object, skipping"
                            );
                            report.skipped += 1;
                        }
                    }
                }
                objects = self.list_objects(&prefix).await.unwrap_or_default();
            }
        }

        self.ensure_records(property.id, &objects, &mut report)
            .await?;

        // Sync runs whether or not anything was created.
        let counts = self.sync.sync_property(property.id).await?;
        report.images = counts.images;
        report.videos = counts.videos;

        tracing::info!(
            property_id = %property.id,
            records_created = report.records_created,
            moved = report.moved,
            skipped = report.skipped,
            fallback_used = report.fallback_used,
            images = report.images,
            videos = report.videos,
            "Property reconciled"
        );

        Ok(report)
    }

    /// Pick staged objects for a property: window match against the publish
    /// time, else the most-recently-modified fallback. Both selections are
    /// capped at `fallback_count`, newest first.
    async fn select_staged(
        &self,
        property: &Property,
        report: &mut PropertyReconcileReport,
    ) -> Vec<ObjectInfo> {
        let staging = keys::staging_prefix(&self.config.staging_prefix);
        let staged = match self.list_objects(&staging).await {
            Ok(staged) => staged,
            Err(e) => {
                tracing::warn!(prefix = %staging, error = %e, "Failed to list staging folder");
                report.skipped += 1;
                return Vec::new();
            }
        };
        if staged.is_empty() {
            return Vec::new();
        }

        let window = chrono::Duration::from_std(self.config.window)
            .unwrap_or_else(|_| chrono::Duration::hours(2));
        let mut candidates: Vec<ObjectInfo> = staged
            .iter()
            .filter(|o| (o.last_modified - property.published_at).abs() <= window)
            .cloned()
            .collect();

        if candidates.is_empty() {
            // Ambiguous attribution: nothing inside the window. Documented
            // heuristic, not a correctness guarantee.
            tracing::warn!(
                property_id = %property.id,
                staged = staged.len(),
                "No staged object within the publish window; falling back to most recent"
            );
            report.fallback_used = true;
            candidates = staged;
        }

        candidates.sort_by_key(|o| o.last_modified);
        candidates.reverse();
        candidates.truncate(self.config.fallback_count);
        candidates
    }

    /// Create a record for every listed object whose URL is unknown.
    /// URL-deduplicated, so re-running against a repaired property is a no-op.
    async fn ensure_records(
        &self,
        property_id: Uuid,
        objects: &[ObjectInfo],
        report: &mut PropertyReconcileReport,
    ) -> Result<(), AppError> {
        if objects.is_empty() {
            return Ok(());
        }

        let existing = self.media.list_for_property(property_id).await?;
        let known: HashSet<&str> = existing.iter().map(|r| r.url.as_str()).collect();

        for object in objects {
            let key = keys::property_key(property_id, &object.name);
            let url = self.storage.public_url(&key);
            if known.contains(url.as_str()) {
                continue;
            }

            let record =
                MediaRecord::new(property_id, url, MediaType::from_filename(&object.name));
            match self.media.insert(&record).await {
                Ok(()) => report.records_created += 1,
                Err(e) => {
                    tracing::warn!(
                        property_id = %property_id,
                        url = %record.url,
                        error = %e,
                        "Failed to insert inferred media record, skipping"
                    );
                    report.skipped += 1;
                }
            }
        }

        Ok(())
    }

    async fn list_objects(&self, prefix: &str) -> Result<Vec<ObjectInfo>, AppError> {
        match timeout(self.config.call_timeout, self.storage.list(prefix)).await {
            Ok(Ok(objects)) => Ok(objects),
            Ok(Err(e)) => Err(AppError::Storage(e.to_string())),
            Err(_) => Err(AppError::Storage(format!("list of {} timed out", prefix))),
        }
    }

    async fn move_object(&self, from_key: &str, to_key: &str) -> Result<(), AppError> {
        match timeout(
            self.config.call_timeout,
            self.storage.move_object(from_key, to_key),
        )
        .await
        {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(AppError::Storage(e.to_string())),
            Err(_) => Err(AppError::Storage(format!(
                "move of {} timed out",
                from_key
            ))),
        }
    }
}
