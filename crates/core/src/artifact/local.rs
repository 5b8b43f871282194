//! Object store on the local file system.
//!
//! Each bucket is a directory under the root; keys are relative paths.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use super::error::StoreError;
use super::store::ObjectStore;

pub struct LocalObjectStore {
    root: PathBuf,
}

impl LocalObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Maps a bucket/key pair to a path, rejecting keys that would leave
    /// the bucket directory.
    fn object_path(&self, bucket: &str, key: &str) -> Result<PathBuf, StoreError> {
        let key_path = Path::new(key);
        let escapes = key_path
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if key.is_empty() || escapes {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        if bucket.is_empty() || bucket.contains(['/', '\\']) || bucket == ".." {
            return Err(StoreError::InvalidKey(format!("bucket {}", bucket)));
        }
        Ok(self.root.join(bucket).join(key_path))
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    fn name(&self) -> &str {
        "local"
    }

    async fn exists(&self, bucket: &str, key: &str) -> Result<bool, StoreError> {
        let path = self.object_path(bucket, key)?;
        Ok(fs::try_exists(&path).await? && fs::metadata(&path).await?.is_file())
    }

    async fn copy(
        &self,
        src_bucket: &str,
        src_key: &str,
        dst_bucket: &str,
        dst_key: &str,
    ) -> Result<(), StoreError> {
        let source = self.object_path(src_bucket, src_key)?;
        let destination = self.object_path(dst_bucket, dst_key)?;

        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent).await?;
        }

        fs::copy(&source, &destination).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StoreError::NotFound {
                    bucket: src_bucket.to_string(),
                    key: src_key.to_string(),
                }
            } else {
                StoreError::Io(e)
            }
        })?;
        Ok(())
    }

    async fn delete(&self, bucket: &str, key: &str) -> Result<(), StoreError> {
        let path = self.object_path(bucket, key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::Io(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_copy_then_delete() {
        let dir = TempDir::new().unwrap();
        let store = LocalObjectStore::new(dir.path());
        let original = dir.path().join("inbox/accession/PUL/batch.csv");
        std::fs::create_dir_all(original.parent().unwrap()).unwrap();
        std::fs::write(&original, "B001,X").unwrap();

        assert!(store.exists("inbox", "accession/PUL/batch.csv").await.unwrap());
        store
            .copy(
                "inbox",
                "accession/PUL/batch.csv",
                "inbox",
                "accession/PUL/.done-RECAP-PUL-batch.csv",
            )
            .await
            .unwrap();
        store.delete("inbox", "accession/PUL/batch.csv").await.unwrap();

        assert!(!original.exists());
        assert_eq!(
            std::fs::read_to_string(dir.path().join("inbox/accession/PUL/.done-RECAP-PUL-batch.csv"))
                .unwrap(),
            "B001,X"
        );
    }

    #[tokio::test]
    async fn test_missing_object() {
        let dir = TempDir::new().unwrap();
        let store = LocalObjectStore::new(dir.path());

        assert!(!store.exists("inbox", "missing.csv").await.unwrap());
        assert!(store.delete("inbox", "missing.csv").await.is_ok());
        let err = store
            .copy("inbox", "missing.csv", "inbox", "done.csv")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_rejects_escaping_keys() {
        let dir = TempDir::new().unwrap();
        let store = LocalObjectStore::new(dir.path());

        assert!(matches!(
            store.exists("inbox", "../secret").await,
            Err(StoreError::InvalidKey(_))
        ));
        assert!(matches!(
            store.exists("inbox", "/etc/passwd").await,
            Err(StoreError::InvalidKey(_))
        ));
        assert!(matches!(
            store.exists("../inbox", "file").await,
            Err(StoreError::InvalidKey(_))
        ));
    }
}
