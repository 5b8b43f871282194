//! Mock lookup client for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::lookup::{CodeMap, LookupClient, LookupError};

/// Mock implementation of the LookupClient trait.
///
/// Recognizes the barcodes registered with `recognize` and answers with
/// their canonical codes; everything else is left out of the response.
///
/// # Example
///
/// ```rust,ignore
/// use accession_core::testing::MockLookupClient;
///
/// let lookup = MockLookupClient::new();
/// lookup.recognize("B001", "C1").await;
///
/// // B002 is unknown and will be dropped from the result
/// let result = lookup.reconcile(&pairs).await?;
///
/// assert_eq!(lookup.request_count().await, 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockLookupClient {
    /// Canonical codes for recognized barcodes.
    canonical: Arc<RwLock<CodeMap>>,
    /// Every request received, in order.
    requests: Arc<RwLock<Vec<CodeMap>>>,
    /// If set, the next request fails with this error.
    next_error: Arc<RwLock<Option<LookupError>>>,
}

impl MockLookupClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a barcode the service recognizes.
    pub async fn recognize(&self, barcode: &str, canonical_code: &str) {
        self.canonical
            .write()
            .await
            .insert(barcode.to_string(), canonical_code.to_string());
    }

    /// Configure the next request to fail with the given error.
    pub async fn set_next_error(&self, error: LookupError) {
        *self.next_error.write().await = Some(error);
    }

    /// Get all recorded requests.
    pub async fn recorded_requests(&self) -> Vec<CodeMap> {
        self.requests.read().await.clone()
    }

    /// Get the number of requests received.
    pub async fn request_count(&self) -> usize {
        self.requests.read().await.len()
    }
}

#[async_trait]
impl LookupClient for MockLookupClient {
    fn name(&self) -> &str {
        "mock"
    }

    async fn reconcile(&self, pairs: &CodeMap) -> Result<CodeMap, LookupError> {
        self.requests.write().await.push(pairs.clone());

        if let Some(err) = self.next_error.write().await.take() {
            return Err(err);
        }

        let canonical = self.canonical.read().await;
        Ok(pairs
            .keys()
            .filter_map(|barcode| {
                canonical
                    .get(barcode)
                    .map(|code| (barcode.clone(), code.clone()))
            })
            .collect())
    }
}
