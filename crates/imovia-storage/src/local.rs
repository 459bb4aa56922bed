use crate::traits::{ObjectInfo, Storage, StorageError, StorageResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use imovia_core::StorageBackend;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Local filesystem storage implementation
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory for file storage (e.g., "/var/lib/imovia/media")
    /// * `base_url` - Base URL for serving files (e.g., "http://localhost:3000")
    pub async fn new(base_path: impl Into<PathBuf>, base_url: String) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage {
            base_path,
            base_url,
        })
    }

    /// Convert storage key to filesystem path with security validation
    ///
    /// Rejects keys with path traversal sequences that could escape the base
    /// storage directory.
    fn key_to_path(&self, key: &str) -> StorageResult<PathBuf> {
        if key.contains("..") || key.starts_with('/') || key.is_empty() {
            return Err(StorageError::InvalidKey(
                "Storage key contains invalid characters".to_string(),
            ));
        }
        Ok(self.base_path.join(key))
    }

    /// Ensure parent directory exists
    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn upload(
        &self,
        key: &str,
        _content_type: &str,
        data: Vec<u8>,
    ) -> StorageResult<String> {
        let path = self.key_to_path(key)?;
        let size = data.len();

        self.ensure_parent_dir(&path).await?;

        let start = std::time::Instant::now();

        let mut file = fs::File::create(&path).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        file.write_all(&data).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to write file {}: {}", path.display(), e))
        })?;

        file.sync_all().await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        let url = self.public_url(key);

        tracing::info!(
            path = %path.display(),
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage upload successful"
        );

        Ok(url)
    }

    async fn list(&self, prefix: &str) -> StorageResult<Vec<ObjectInfo>> {
        let dir = self.key_to_path(prefix)?;

        if !fs::try_exists(&dir).await.unwrap_or(false) {
            return Ok(Vec::new());
        }

        let mut entries = fs::read_dir(&dir).await.map_err(|e| {
            StorageError::ListFailed(format!("Failed to list {}: {}", dir.display(), e))
        })?;

        let mut objects = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|e| {
            StorageError::ListFailed(format!("Failed to read entry in {}: {}", dir.display(), e))
        })? {
            let meta = entry.metadata().await.map_err(|e| {
                StorageError::ListFailed(format!(
                    "Failed to stat {}: {}",
                    entry.path().display(),
                    e
                ))
            })?;
            if !meta.is_file() {
                continue;
            }
            let last_modified: DateTime<Utc> = meta
                .modified()
                .map(DateTime::<Utc>::from)
                .unwrap_or_else(|_| Utc::now());
            objects.push(ObjectInfo {
                name: entry.file_name().to_string_lossy().into_owned(),
                last_modified,
            });
        }

        tracing::debug!(prefix = %prefix, count = objects.len(), "Local storage list");

        Ok(objects)
    }

    async fn move_object(&self, from_key: &str, to_key: &str) -> StorageResult<()> {
        let from_path = self.key_to_path(from_key)?;
        let to_path = self.key_to_path(to_key)?;

        if !fs::try_exists(&from_path).await.unwrap_or(false) {
            return Err(StorageError::NotFound(from_key.to_string()));
        }

        self.ensure_parent_dir(&to_path).await?;

        fs::rename(&from_path, &to_path).await.map_err(|e| {
            StorageError::MoveFailed(format!(
                "Failed to move {} to {}: {}",
                from_path.display(),
                to_path.display(),
                e
            ))
        })?;

        tracing::info!(
            from_key = %from_key,
            to_key = %to_key,
            "Local storage move successful"
        );

        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), key)
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let path = self.key_to_path(key)?;

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(());
        }

        fs::remove_file(&path).await.map_err(|e| {
            StorageError::DeleteFailed(format!("Failed to delete file {}: {}", path.display(), e))
        })?;

        tracing::info!(key = %key, "Local storage delete successful");

        Ok(())
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys;
    use tempfile::tempdir;
    use uuid::Uuid;

    async fn test_storage(dir: &tempfile::TempDir) -> LocalStorage {
        LocalStorage::new(dir.path(), "http://localhost:3000".to_string())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_upload_then_list() {
        let dir = tempdir().unwrap();
        let storage = test_storage(&dir).await;
        let property_id = Uuid::new_v4();

        let key = keys::property_key(property_id, "photo.jpg");
        let url = storage
            .upload(&key, "image/jpeg", b"jpeg bytes".to_vec())
            .await
            .unwrap();

        assert_eq!(url, format!("http://localhost:3000/{}", key));

        let listed = storage
            .list(&keys::property_prefix(property_id))
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "photo.jpg");
    }

    #[tokio::test]
    async fn test_list_missing_prefix_is_empty() {
        let dir = tempdir().unwrap();
        let storage = test_storage(&dir).await;

        let listed = storage
            .list(&keys::property_prefix(Uuid::new_v4()))
            .await
            .unwrap();
        assert!(listed.is_empty());
    }

    #[tokio::test]
    async fn test_move_between_prefixes() {
        let dir = tempdir().unwrap();
        let storage = test_storage(&dir).await;
        let property_id = Uuid::new_v4();

        let staging_key = format!("{}/clip.mp4", keys::staging_prefix("staging"));
        storage
            .upload(&staging_key, "video/mp4", b"mp4 bytes".to_vec())
            .await
            .unwrap();

        let dest_key = keys::property_key(property_id, "clip.mp4");
        storage.move_object(&staging_key, &dest_key).await.unwrap();

        assert!(storage
            .list(&keys::staging_prefix("staging"))
            .await
            .unwrap()
            .is_empty());
        let listed = storage
            .list(&keys::property_prefix(property_id))
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "clip.mp4");
    }

    #[tokio::test]
    async fn test_move_missing_object_is_not_found() {
        let dir = tempdir().unwrap();
        let storage = test_storage(&dir).await;

        let result = storage
            .move_object("media/staging/gone.jpg", "media/x/gone.jpg")
            .await;
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_path_traversal_rejected() {
        let dir = tempdir().unwrap();
        let storage = test_storage(&dir).await;

        let result = storage.list("../../../etc").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));

        let result = storage.delete("/etc/passwd").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));

        let result = storage
            .upload("../escape.jpg", "image/jpeg", vec![0u8])
            .await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));
    }

    #[tokio::test]
    async fn test_delete_nonexistent_is_ok() {
        let dir = tempdir().unwrap();
        let storage = test_storage(&dir).await;

        assert!(storage.delete("media/nothing/here.jpg").await.is_ok());
    }
}
