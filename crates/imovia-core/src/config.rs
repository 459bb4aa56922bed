//! Configuration module
//!
//! Configuration for the media sync services, loaded from environment
//! variables with sensible defaults for everything except `DATABASE_URL`.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::storage_types::StorageBackend;

const DEFAULT_MAX_FILES_PER_BATCH: usize = 10;
const DEFAULT_MAX_IMAGE_SIZE_BYTES: usize = 32 * 1024 * 1024;
const DEFAULT_MAX_VIDEO_SIZE_BYTES: usize = 600 * 1024 * 1024;
const DEFAULT_RECONCILE_WINDOW_SECS: u64 = 2 * 60 * 60;
const DEFAULT_RECONCILE_FALLBACK_COUNT: usize = 5;
const DEFAULT_RECONCILE_BATCH_SIZE: i64 = 2;
const DEFAULT_RECONCILE_INTERVAL_SECS: u64 = 3600;
const DEFAULT_STORAGE_CALL_TIMEOUT_SECS: u64 = 30;
const DEFAULT_STAGING_PREFIX: &str = "staging";

/// Limits applied to an upload batch before any I/O starts.
#[derive(Clone, Copy, Debug)]
pub struct UploadLimits {
    pub max_files_per_batch: usize,
    pub max_image_size_bytes: usize,
    pub max_video_size_bytes: usize,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_files_per_batch: DEFAULT_MAX_FILES_PER_BATCH,
            max_image_size_bytes: DEFAULT_MAX_IMAGE_SIZE_BYTES,
            max_video_size_bytes: DEFAULT_MAX_VIDEO_SIZE_BYTES,
        }
    }
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub db_max_connections: u32,
    // Storage configuration
    pub storage_backend: StorageBackend,
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
    /// Shared staging folder name for out-of-band uploads (under the
    /// top-level media prefix).
    pub staging_prefix: String,
    // Upload validation
    pub upload_limits: UploadLimits,
    // Reconciliation
    pub reconcile_window: Duration,
    pub reconcile_fallback_count: usize,
    pub reconcile_batch_size: i64,
    pub reconcile_interval: Duration,
    pub storage_call_timeout: Duration,
}

fn env_parsed<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?;

        let storage_backend = env::var("STORAGE_BACKEND")
            .unwrap_or_else(|_| "local".to_string())
            .parse::<StorageBackend>()?;

        let upload_limits = UploadLimits {
            max_files_per_batch: env_parsed("MAX_FILES_PER_BATCH", DEFAULT_MAX_FILES_PER_BATCH),
            max_image_size_bytes: env_parsed::<usize>("MAX_IMAGE_SIZE_MB", 32) * 1024 * 1024,
            max_video_size_bytes: env_parsed::<usize>("MAX_VIDEO_SIZE_MB", 600) * 1024 * 1024,
        };

        Ok(Config {
            database_url,
            db_max_connections: env_parsed("DB_MAX_CONNECTIONS", 20),
            storage_backend,
            local_storage_path: env::var("LOCAL_STORAGE_PATH").ok(),
            local_storage_base_url: env::var("LOCAL_STORAGE_BASE_URL").ok(),
            staging_prefix: env::var("STAGING_PREFIX")
                .unwrap_or_else(|_| DEFAULT_STAGING_PREFIX.to_string()),
            upload_limits,
            reconcile_window: Duration::from_secs(env_parsed(
                "RECONCILE_WINDOW_SECS",
                DEFAULT_RECONCILE_WINDOW_SECS,
            )),
            reconcile_fallback_count: env_parsed(
                "RECONCILE_FALLBACK_COUNT",
                DEFAULT_RECONCILE_FALLBACK_COUNT,
            ),
            reconcile_batch_size: env_parsed(
                "RECONCILE_BATCH_SIZE",
                DEFAULT_RECONCILE_BATCH_SIZE,
            ),
            reconcile_interval: Duration::from_secs(env_parsed(
                "RECONCILE_INTERVAL_SECS",
                DEFAULT_RECONCILE_INTERVAL_SECS,
            )),
            storage_call_timeout: Duration::from_secs(env_parsed(
                "STORAGE_CALL_TIMEOUT_SECS",
                DEFAULT_STORAGE_CALL_TIMEOUT_SECS,
            )),
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.database_url.is_empty() {
            anyhow::bail!("DATABASE_URL must not be empty");
        }
        if self.staging_prefix.is_empty() || self.staging_prefix.contains('/') {
            anyhow::bail!(
                "STAGING_PREFIX must be a single folder name, got '{}'",
                self.staging_prefix
            );
        }
        if self.reconcile_batch_size <= 0 {
            anyhow::bail!("RECONCILE_BATCH_SIZE must be positive");
        }
        if self.upload_limits.max_files_per_batch == 0 {
            anyhow::bail!("MAX_FILES_PER_BATCH must be positive");
        }
        if self.storage_backend == StorageBackend::Local
            && (self.local_storage_path.is_none() || self.local_storage_base_url.is_none())
        {
            anyhow::bail!(
                "LOCAL_STORAGE_PATH and LOCAL_STORAGE_BASE_URL must be set for the local backend"
            );
        }
        Ok(())
    }
}
