//! Error types for the report module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while appending to a report file.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Failed to create the report directory.
    #[error("Failed to create directory: {path}")]
    DirectoryCreationFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to create the empty report file.
    #[error("Failed to create report file: {path}")]
    FileCreationFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to read the report file.
    #[error("Failed to read report file: {path}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to append to the report file.
    #[error("Failed to append to report file: {path}")]
    AppendFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Commit ledger failure.
    #[error("Commit ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

impl ReportError {
    /// Whether re-running the chunk may succeed.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::Ledger(_))
    }
}

/// Errors raised by the commit ledger.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Database error: {0}")]
    Database(String),
}

impl From<rusqlite::Error> for LedgerError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Database(e.to_string())
    }
}
