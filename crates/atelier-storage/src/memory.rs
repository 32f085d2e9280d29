//! In-memory storage, for tests and local experiments.

use crate::keys::{generate_storage_key, validate_storage_key};
use crate::traits::{Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

/// Storage that keeps objects in a `HashMap`. Uploads and deletes can be made
/// to fail on demand.
pub struct InMemoryStorage {
    files: Mutex<HashMap<String, StoredObject>>,
    base_url: String,
    fail_uploads: AtomicBool,
    fail_deletes: AtomicBool,
}

#[derive(Debug, Clone)]
pub struct StoredObject {
    pub content_type: String,
    pub data: Bytes,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::with_base_url("http://localhost:4000/media")
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            files: Mutex::new(HashMap::new()),
            base_url: base_url.into(),
            fail_uploads: AtomicBool::new(false),
            fail_deletes: AtomicBool::new(false),
        }
    }

    fn files(&self) -> MutexGuard<'_, HashMap<String, StoredObject>> {
        self.files.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn set_fail_uploads(&self, fail: bool) {
        self.fail_uploads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    /// Get a stored object (for test assertions)
    pub fn get_file(&self, key: &str) -> Option<StoredObject> {
        self.files().get(key).cloned()
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.files().keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.files().len()
    }

    pub fn is_empty(&self) -> bool {
        self.files().is_empty()
    }
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn upload(
        &self,
        owner_id: Uuid,
        filename: &str,
        content_type: &str,
        data: Bytes,
    ) -> StorageResult<(String, String)> {
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(StorageError::UploadFailed(
                "in-memory storage configured to fail uploads".to_string(),
            ));
        }

        let key = generate_storage_key(owner_id, filename);
        if !validate_storage_key(&key) {
            return Err(StorageError::InvalidKey(key));
        }
        self.files().insert(
            key.clone(),
            StoredObject {
                content_type: content_type.to_string(),
                data,
            },
        );
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), key);
        Ok((key, url))
    }

    async fn download(&self, storage_key: &str) -> StorageResult<Bytes> {
        self.files()
            .get(storage_key)
            .map(|object| object.data.clone())
            .ok_or_else(|| StorageError::NotFound(storage_key.to_string()))
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(StorageError::DeleteFailed(
                "in-memory storage configured to fail deletes".to_string(),
            ));
        }
        self.files().remove(storage_key);
        Ok(())
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        Ok(self.files().contains_key(storage_key))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}
