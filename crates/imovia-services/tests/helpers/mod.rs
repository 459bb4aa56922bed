#![allow(dead_code)] // not every test binary uses every helper

//! In-memory fakes for the storage and metadata capabilities, plus fixtures.
//!
//! The fakes enforce the same invariants as the real backends: unique
//! (property_id, url) pairs in the media store, and never writing an empty
//! array to the property store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use imovia_core::models::{MediaRecord, Property};
use imovia_core::AppError;
use imovia_db::{MediaStore, PropertyStore};
use imovia_storage::{ObjectInfo, Storage, StorageBackend, StorageError, StorageResult};
use uuid::Uuid;

#[derive(Clone)]
struct StoredObject {
    data: Vec<u8>,
    last_modified: DateTime<Utc>,
}

/// In-memory blob store. Upload failures can be injected by call index.
pub struct InMemoryStorage {
    base_url: String,
    objects: Mutex<HashMap<String, StoredObject>>,
    upload_calls: AtomicUsize,
    fail_upload_indices: Mutex<Vec<usize>>,
}

impl InMemoryStorage {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            base_url: "http://cdn.test".to_string(),
            objects: Mutex::new(HashMap::new()),
            upload_calls: AtomicUsize::new(0),
            fail_upload_indices: Mutex::new(Vec::new()),
        })
    }

    /// Make the n-th upload call (0-based) fail at the storage layer.
    pub fn fail_upload(&self, index: usize) {
        self.fail_upload_indices.lock().unwrap().push(index);
    }

    /// Seed an object directly, bypassing upload accounting. Used to stage
    /// out-of-band files with a chosen last-modified time.
    pub fn put_with_time(&self, key: &str, data: &[u8], last_modified: DateTime<Utc>) {
        self.objects.lock().unwrap().insert(
            key.to_string(),
            StoredObject {
                data: data.to_vec(),
                last_modified,
            },
        );
    }

    pub fn contains(&self, key: &str) -> bool {
        self.objects.lock().unwrap().contains_key(key)
    }

    pub fn object_count(&self) -> usize {
        self.objects.lock().unwrap().len()
    }
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn upload(
        &self,
        key: &str,
        _content_type: &str,
        data: Vec<u8>,
    ) -> StorageResult<String> {
        let call = self.upload_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_upload_indices.lock().unwrap().contains(&call) {
            return Err(StorageError::UploadFailed(format!(
                "injected failure for upload #{}",
                call
            )));
        }
        self.objects.lock().unwrap().insert(
            key.to_string(),
            StoredObject {
                data,
                last_modified: Utc::now(),
            },
        );
        Ok(self.public_url(key))
    }

    async fn list(&self, prefix: &str) -> StorageResult<Vec<ObjectInfo>> {
        let wanted = format!("{}/", prefix);
        let objects = self.objects.lock().unwrap();
        let mut listed: Vec<ObjectInfo> = objects
            .iter()
            .filter_map(|(key, obj)| {
                let name = key.strip_prefix(&wanted)?;
                // Direct children only, as a folder listing would return
                (!name.contains('/')).then(|| ObjectInfo {
                    name: name.to_string(),
                    last_modified: obj.last_modified,
                })
            })
            .collect();
        listed.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(listed)
    }

    async fn move_object(&self, from_key: &str, to_key: &str) -> StorageResult<()> {
        let mut objects = self.objects.lock().unwrap();
        let obj = objects
            .remove(from_key)
            .ok_or_else(|| StorageError::NotFound(from_key.to_string()))?;
        // Rename preserves the modification time
        objects.insert(to_key.to_string(), obj);
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url, key)
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        self.objects.lock().unwrap().remove(key);
        Ok(())
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

/// In-memory `property_media` table.
pub struct InMemoryMediaStore {
    records: Mutex<Vec<MediaRecord>>,
    fail_inserts: AtomicBool,
}

impl InMemoryMediaStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            records: Mutex::new(Vec::new()),
            fail_inserts: AtomicBool::new(false),
        })
    }

    /// Make every subsequent insert fail, simulating a metadata write outage.
    pub fn fail_inserts(&self) {
        self.fail_inserts.store(true, Ordering::SeqCst);
    }

    pub fn records(&self) -> Vec<MediaRecord> {
        self.records.lock().unwrap().clone()
    }

    pub fn seed(&self, record: MediaRecord) {
        self.records.lock().unwrap().push(record);
    }
}

#[async_trait]
impl MediaStore for InMemoryMediaStore {
    async fn insert(&self, record: &MediaRecord) -> Result<(), AppError> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(AppError::Internal("injected insert failure".to_string()));
        }
        let mut records = self.records.lock().unwrap();
        if records
            .iter()
            .any(|r| r.property_id == record.property_id && r.url == record.url)
        {
            return Err(AppError::Internal(format!(
                "duplicate url {} for property {}",
                record.url, record.property_id
            )));
        }
        records.push(record.clone());
        Ok(())
    }

    async fn list_for_property(&self, property_id: Uuid) -> Result<Vec<MediaRecord>, AppError> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.property_id == property_id)
            .cloned()
            .collect())
    }

    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let mut records = self.records.lock().unwrap();
        let before = records.len();
        records.retain(|r| r.id != id);
        if records.len() == before {
            return Err(AppError::NotFound(format!("media record {}", id)));
        }
        Ok(())
    }

    async fn delete_many(&self, ids: &[Uuid]) -> Result<u64, AppError> {
        let mut records = self.records.lock().unwrap();
        let before = records.len();
        records.retain(|r| !ids.contains(&r.id));
        Ok((before - records.len()) as u64)
    }
}

/// In-memory `properties` table.
pub struct InMemoryPropertyStore {
    properties: Mutex<HashMap<Uuid, Property>>,
}

impl InMemoryPropertyStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            properties: Mutex::new(HashMap::new()),
        })
    }

    pub fn seed(&self, property: Property) {
        self.properties
            .lock()
            .unwrap()
            .insert(property.id, property);
    }

    pub fn get_sync(&self, id: Uuid) -> Option<Property> {
        self.properties.lock().unwrap().get(&id).cloned()
    }
}

#[async_trait]
impl PropertyStore for InMemoryPropertyStore {
    async fn get(&self, id: Uuid) -> Result<Option<Property>, AppError> {
        Ok(self.properties.lock().unwrap().get(&id).cloned())
    }

    async fn recently_published(&self, limit: i64) -> Result<Vec<Property>, AppError> {
        let mut all: Vec<Property> = self.properties.lock().unwrap().values().cloned().collect();
        all.sort_by_key(|p| std::cmp::Reverse(p.published_at));
        all.truncate(limit as usize);
        Ok(all)
    }

    async fn published_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<Property>, AppError> {
        let mut all: Vec<Property> = self
            .properties
            .lock()
            .unwrap()
            .values()
            .filter(|p| p.published_at >= start && p.published_at < end)
            .cloned()
            .collect();
        all.sort_by_key(|p| std::cmp::Reverse(p.published_at));
        all.truncate(limit as usize);
        Ok(all)
    }

    async fn set_media_arrays(
        &self,
        id: Uuid,
        images: Option<Vec<String>>,
        videos: Option<Vec<String>>,
    ) -> Result<(), AppError> {
        assert!(
            images.as_ref().map_or(true, |v| !v.is_empty()),
            "empty images array written; must be None"
        );
        assert!(
            videos.as_ref().map_or(true, |v| !v.is_empty()),
            "empty videos array written; must be None"
        );
        let mut properties = self.properties.lock().unwrap();
        let property = properties
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("property {}", id)))?;
        property.images = images;
        property.videos = videos;
        Ok(())
    }
}

/// A minimal published listing.
pub fn property(published_at: DateTime<Utc>) -> Property {
    Property {
        id: Uuid::new_v4(),
        title: "Casa T3 com quintal".to_string(),
        description: None,
        city: Some("Porto".to_string()),
        price: 320_000.0,
        status: "ativo".to_string(),
        published_at,
        images: None,
        videos: None,
    }
}
