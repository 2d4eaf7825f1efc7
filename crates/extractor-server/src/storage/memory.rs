//! In-process [`BlobStore`] used by tests and local experiments
//!
//! Faults can be switched on to simulate an unreachable store or rejected
//! writes for keys containing a given fragment.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
};
use tokio::sync::RwLock;

use super::{BlobStore, StorageError, UploadResult};

#[derive(Debug, Clone)]
pub struct StoredObject {
    pub data: Vec<u8>,
    pub content_type: String,
}

#[derive(Debug, Default)]
struct Faults {
    unavailable: AtomicBool,
    rejected_keys: Mutex<Vec<String>>,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    objects: Arc<RwLock<BTreeMap<String, StoredObject>>>,
    faults: Arc<Faults>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make [`BlobStore::ensure_ready`] fail.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.faults.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Reject every put whose key contains `fragment`.
    pub fn reject_writes_containing(&self, fragment: impl Into<String>) {
        if let Ok(mut rejected) = self.faults.rejected_keys.lock() {
            rejected.push(fragment.into());
        }
    }

    pub fn clear_faults(&self) {
        self.set_unavailable(false);
        if let Ok(mut rejected) = self.faults.rejected_keys.lock() {
            rejected.clear();
        }
    }

    fn is_rejected(&self, key: &str) -> bool {
        self.faults
            .rejected_keys
            .lock()
            .map(|rejected| rejected.iter().any(|f| key.contains(f.as_str())))
            .unwrap_or(false)
    }

    pub async fn object(&self, key: &str) -> Option<StoredObject> {
        self.objects.read().await.get(key).cloned()
    }

    pub async fn keys(&self) -> Vec<String> {
        self.objects.read().await.keys().cloned().collect()
    }

    /// Seed an object without going through [`BlobStore::put`].
    pub async fn insert(&self, key: impl Into<String>, data: impl Into<Vec<u8>>) {
        self.objects.write().await.insert(
            key.into(),
            StoredObject {
                data: data.into(),
                content_type: "application/octet-stream".to_string(),
            },
        );
    }
}

#[async_trait]
impl BlobStore for MemoryStore {
    async fn ensure_ready(&self) -> Result<(), StorageError> {
        if self.faults.unavailable.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("memory store offline".to_string()));
        }
        Ok(())
    }

    async fn put(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<UploadResult, StorageError> {
        if self.is_rejected(key) {
            return Err(StorageError::Write {
                key: key.to_string(),
                message: "write rejected".to_string(),
            });
        }
        let result = UploadResult::new(key, &data);
        self.objects.write().await.insert(
            key.to_string(),
            StoredObject {
                data,
                content_type: content_type.to_string(),
            },
        );
        Ok(result)
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.objects.read().await.get(key).map(|o| o.data.clone()))
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        Ok(self
            .objects
            .read()
            .await
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_overwrites_and_lists_by_prefix() {
        let store = MemoryStore::new();
        store.put("a/1.json", b"[1]".to_vec(), "application/json").await.unwrap();
        store.put("a/1.json", b"[2]".to_vec(), "application/json").await.unwrap();
        store.put("b/1.json", b"[3]".to_vec(), "application/json").await.unwrap();

        assert_eq!(store.get("a/1.json").await.unwrap(), Some(b"[2]".to_vec()));
        assert_eq!(store.list("a/").await.unwrap(), vec!["a/1.json".to_string()]);
        assert_eq!(store.get("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_faults_reject_matching_writes() {
        let store = MemoryStore::new();
        store.set_unavailable(true);
        store.reject_writes_containing("offset_01000");

        assert!(store.ensure_ready().await.is_err());
        assert!(store.put("x/offset_01000.json", vec![], "application/json").await.is_err());
        assert!(store.put("x/offset_02000.json", vec![], "application/json").await.is_ok());

        store.clear_faults();
        assert!(store.ensure_ready().await.is_ok());
        assert!(store.put("x/offset_01000.json", vec![], "application/json").await.is_ok());
    }
}
