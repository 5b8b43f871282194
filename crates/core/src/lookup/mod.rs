//! Authoritative barcode lookup.
//!
//! This module provides the `LookupClient` trait, which sends a batch of
//! barcode → supplied customer code pairs to the authoritative service and
//! returns the canonical customer code for every barcode it recognizes.
//! Barcodes missing from the result were not reconciled; that is not an error.

mod http;

pub use http::HttpLookupClient;

use std::collections::BTreeMap;

use async_trait::async_trait;
use thiserror::Error;

/// Barcode → customer code, ordered by barcode.
pub type CodeMap = BTreeMap<String, String>;

/// Errors that can occur when talking to the lookup service.
#[derive(Debug, Error)]
pub enum LookupError {
    /// HTTP request failed (connection, timeout, body read).
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Nothing to reconcile.
    #[error("Lookup request contains no barcodes")]
    EmptyRequest,
}

impl LookupError {
    /// Whether redelivering the chunk may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::HttpError(_) => true,
            Self::ApiError { status, .. } => *status >= 500 || *status == 429,
            Self::ParseError(_) | Self::EmptyRequest => false,
        }
    }
}

/// Client for the authoritative barcode service.
#[async_trait]
pub trait LookupClient: Send + Sync {
    /// Returns the name of this client implementation.
    fn name(&self) -> &str;

    /// Reconciles the given barcodes in a single request.
    ///
    /// The result only contains barcodes the service could canonicalize.
    async fn reconcile(&self, pairs: &CodeMap) -> Result<CodeMap, LookupError>;
}
