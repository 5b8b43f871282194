//! Retirement of processed source artifacts.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::error::ArtifactError;
use super::store::ObjectStore;
use crate::report::ReportTarget;

/// Location of the artifact that started a chunk sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactRef {
    pub bucket: String,
    pub key: String,
}

impl ArtifactRef {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }
}

/// Result of a successful retirement call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetireOutcome {
    /// Copied to `done_key` and the original deleted.
    Retired { done_key: String },
    /// The artifact no longer exists; nothing to do.
    AlreadyRetired,
}

/// Key an artifact is renamed to once retired: the marker, location and
/// institution are prefixed to the file name, in the same directory.
pub fn done_key(key: &str, marker: &str, target: &ReportTarget) -> String {
    let (dir, file_name) = match key.rfind('/') {
        Some(pos) => (Some(&key[..pos]), &key[pos + 1..]),
        None => (None, key),
    };
    let renamed = format!(
        "{}-{}-{}-{}",
        marker, target.location_code, target.institution_code, file_name
    );
    match dir {
        Some(dir) => format!("{}/{}", dir, renamed),
        None => renamed,
    }
}

/// Marks an artifact done and removes the original.
pub struct ArtifactRetirer {
    store: Arc<dyn ObjectStore>,
    done_marker: String,
}

impl ArtifactRetirer {
    pub fn new(store: Arc<dyn ObjectStore>, done_marker: impl Into<String>) -> Self {
        Self {
            store,
            done_marker: done_marker.into(),
        }
    }

    /// Copies the artifact to its done key, then deletes it.
    ///
    /// A missing artifact is treated as already retired. The original is
    /// only deleted after the copy succeeded.
    pub async fn retire(
        &self,
        artifact: &ArtifactRef,
        target: &ReportTarget,
    ) -> Result<RetireOutcome, ArtifactError> {
        let exists = self
            .store
            .exists(&artifact.bucket, &artifact.key)
            .await
            .map_err(|e| ArtifactError::ExistsFailed {
                bucket: artifact.bucket.clone(),
                key: artifact.key.clone(),
                source: e,
            })?;

        if !exists {
            info!(
                bucket = %artifact.bucket,
                key = %artifact.key,
                "Artifact already retired"
            );
            return Ok(RetireOutcome::AlreadyRetired);
        }

        let done_key = done_key(&artifact.key, &self.done_marker, target);

        if let Err(e) = self
            .store
            .copy(&artifact.bucket, &artifact.key, &artifact.bucket, &done_key)
            .await
        {
            warn!(
                bucket = %artifact.bucket,
                key = %artifact.key,
                done_key = %done_key,
                error = %e,
                "Copy to done key failed, keeping original"
            );
            return Err(ArtifactError::CopyFailed {
                bucket: artifact.bucket.clone(),
                key: artifact.key.clone(),
                done_key,
                source: e,
            });
        }

        self.store
            .delete(&artifact.bucket, &artifact.key)
            .await
            .map_err(|e| ArtifactError::DeleteFailed {
                bucket: artifact.bucket.clone(),
                key: artifact.key.clone(),
                source: e,
            })?;

        info!(
            bucket = %artifact.bucket,
            key = %artifact.key,
            done_key = %done_key,
            "Artifact retired"
        );

        Ok(RetireOutcome::Retired { done_key })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::{MemoryObjectStore, StoreOp};

    fn target() -> ReportTarget {
        ReportTarget::new("RECAP", "PUL")
    }

    fn retirer(store: &MemoryObjectStore) -> ArtifactRetirer {
        ArtifactRetirer::new(Arc::new(store.clone()), ".done")
    }

    #[test]
    fn test_done_key_in_directory() {
        assert_eq!(
            done_key("accession/PUL/batch.csv", ".done", &target()),
            "accession/PUL/.done-RECAP-PUL-batch.csv"
        );
    }

    #[test]
    fn test_done_key_without_directory() {
        assert_eq!(
            done_key("batch.csv", ".done", &target()),
            ".done-RECAP-PUL-batch.csv"
        );
    }

    #[tokio::test]
    async fn test_retire_copies_then_deletes() {
        let store = MemoryObjectStore::new();
        store.put("inbox", "accession/PUL/batch.csv", "B001,X").await;
        let artifact = ArtifactRef::new("inbox", "accession/PUL/batch.csv");

        let outcome = retirer(&store).retire(&artifact, &target()).await.unwrap();

        assert_eq!(
            outcome,
            RetireOutcome::Retired {
                done_key: "accession/PUL/.done-RECAP-PUL-batch.csv".to_string()
            }
        );
        assert_eq!(
            store.keys("inbox").await,
            vec!["accession/PUL/.done-RECAP-PUL-batch.csv".to_string()]
        );
    }

    #[tokio::test]
    async fn test_retire_twice_is_noop() {
        let store = MemoryObjectStore::new();
        store.put("inbox", "a/batch.csv", "data").await;
        let artifact = ArtifactRef::new("inbox", "a/batch.csv");
        let retirer = retirer(&store);

        retirer.retire(&artifact, &target()).await.unwrap();
        let second = retirer.retire(&artifact, &target()).await.unwrap();

        assert_eq!(second, RetireOutcome::AlreadyRetired);
        assert_eq!(store.keys("inbox").await.len(), 1);
    }

    #[tokio::test]
    async fn test_copy_failure_keeps_original() {
        let store = MemoryObjectStore::new();
        store.put("inbox", "a/batch.csv", "data").await;
        store.fail_next(StoreOp::Copy).await;
        let artifact = ArtifactRef::new("inbox", "a/batch.csv");

        let err = retirer(&store)
            .retire(&artifact, &target())
            .await
            .unwrap_err();

        assert!(matches!(err, ArtifactError::CopyFailed { .. }));
        assert_eq!(store.keys("inbox").await, vec!["a/batch.csv".to_string()]);
    }

    #[tokio::test]
    async fn test_delete_failure_leaves_both_copies() {
        let store = MemoryObjectStore::new();
        store.put("inbox", "a/batch.csv", "data").await;
        store.fail_next(StoreOp::Delete).await;
        let artifact = ArtifactRef::new("inbox", "a/batch.csv");
        let retirer = retirer(&store);

        let err = retirer.retire(&artifact, &target()).await.unwrap_err();
        assert!(matches!(err, ArtifactError::DeleteFailed { .. }));
        assert_eq!(store.keys("inbox").await.len(), 2);

        let retry = retirer.retire(&artifact, &target()).await.unwrap();
        assert!(matches!(retry, RetireOutcome::Retired { .. }));
        assert_eq!(
            store.keys("inbox").await,
            vec!["a/.done-RECAP-PUL-batch.csv".to_string()]
        );
    }
}
