//! Error types for the artifact module.

use thiserror::Error;

/// Errors reported by an object store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The object does not exist.
    #[error("Object not found: {bucket}/{key}")]
    NotFound { bucket: String, key: String },

    /// Key is not usable by this backend (e.g. escapes the bucket).
    #[error("Invalid object key: {0}")]
    InvalidKey(String),

    /// Backend I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Any other backend failure.
    #[error("Object store error: {0}")]
    Backend(String),
}

/// Errors that can occur while retiring a source artifact.
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// Existence check failed.
    #[error("Failed to check {bucket}/{key}")]
    ExistsFailed {
        bucket: String,
        key: String,
        #[source]
        source: StoreError,
    },

    /// Copy to the done key failed; the original was left in place.
    #[error("Failed to copy {bucket}/{key} to {done_key}")]
    CopyFailed {
        bucket: String,
        key: String,
        done_key: String,
        #[source]
        source: StoreError,
    },

    /// The done copy exists but the original could not be deleted.
    #[error("Failed to delete {bucket}/{key}")]
    DeleteFailed {
        bucket: String,
        key: String,
        #[source]
        source: StoreError,
    },
}
