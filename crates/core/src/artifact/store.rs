//! Object store abstraction for source artifacts.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::error::StoreError;

/// Durable object storage holding the source artifacts.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Returns the name of this backend.
    fn name(&self) -> &str;

    /// Whether `key` exists in `bucket`.
    async fn exists(&self, bucket: &str, key: &str) -> Result<bool, StoreError>;

    /// Copies an object. The destination is overwritten if present.
    async fn copy(
        &self,
        src_bucket: &str,
        src_key: &str,
        dst_bucket: &str,
        dst_key: &str,
    ) -> Result<(), StoreError>;

    /// Deletes an object. Deleting a missing object succeeds.
    async fn delete(&self, bucket: &str, key: &str) -> Result<(), StoreError>;
}

/// Object store operations, used to inject failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    Exists,
    Copy,
    Delete,
}

/// In-memory object store.
///
/// Cloning shares the underlying objects, so a test can keep a handle while
/// the retirer owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryObjectStore {
    objects: Arc<RwLock<BTreeMap<(String, String), Vec<u8>>>>,
    fail_next: Arc<RwLock<HashSet<StoreOp>>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores an object.
    pub async fn put(&self, bucket: &str, key: &str, data: impl Into<Vec<u8>>) {
        self.objects
            .write()
            .await
            .insert((bucket.to_string(), key.to_string()), data.into());
    }

    /// Reads an object.
    pub async fn get(&self, bucket: &str, key: &str) -> Option<Vec<u8>> {
        self.objects
            .read()
            .await
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }

    /// All keys in a bucket, sorted.
    pub async fn keys(&self, bucket: &str) -> Vec<String> {
        self.objects
            .read()
            .await
            .keys()
            .filter(|(b, _)| b == bucket)
            .map(|(_, k)| k.clone())
            .collect()
    }

    /// Makes the next call of `op` fail.
    pub async fn fail_next(&self, op: StoreOp) {
        self.fail_next.write().await.insert(op);
    }

    async fn take_failure(&self, op: StoreOp) -> Result<(), StoreError> {
        if self.fail_next.write().await.remove(&op) {
            return Err(StoreError::Backend(format!("injected {:?} failure", op)));
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn exists(&self, bucket: &str, key: &str) -> Result<bool, StoreError> {
        self.take_failure(StoreOp::Exists).await?;
        Ok(self
            .objects
            .read()
            .await
            .contains_key(&(bucket.to_string(), key.to_string())))
    }

    async fn copy(
        &self,
        src_bucket: &str,
        src_key: &str,
        dst_bucket: &str,
        dst_key: &str,
    ) -> Result<(), StoreError> {
        self.take_failure(StoreOp::Copy).await?;
        let mut objects = self.objects.write().await;
        let data = objects
            .get(&(src_bucket.to_string(), src_key.to_string()))
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                bucket: src_bucket.to_string(),
                key: src_key.to_string(),
            })?;
        objects.insert((dst_bucket.to_string(), dst_key.to_string()), data);
        Ok(())
    }

    async fn delete(&self, bucket: &str, key: &str) -> Result<(), StoreError> {
        self.take_failure(StoreOp::Delete).await?;
        self.objects
            .write()
            .await
            .remove(&(bucket.to_string(), key.to_string()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_copy_and_delete() {
        let store = MemoryObjectStore::new();
        store.put("inbox", "a/b.xml", "payload").await;

        store.copy("inbox", "a/b.xml", "inbox", "a/c.xml").await.unwrap();
        store.delete("inbox", "a/b.xml").await.unwrap();

        assert!(!store.exists("inbox", "a/b.xml").await.unwrap());
        assert_eq!(store.get("inbox", "a/c.xml").await.unwrap(), b"payload");
        assert_eq!(store.keys("inbox").await, vec!["a/c.xml".to_string()]);
    }

    #[tokio::test]
    async fn test_copy_missing_source() {
        let store = MemoryObjectStore::new();
        let err = store.copy("inbox", "nope", "inbox", "dst").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_injected_failure_fires_once() {
        let store = MemoryObjectStore::new();
        store.put("inbox", "k", "v").await;
        store.fail_next(StoreOp::Exists).await;

        assert!(store.exists("inbox", "k").await.is_err());
        assert!(store.exists("inbox", "k").await.unwrap());
    }
}
