//! Testing utilities and mock implementations.
//!
//! This module provides mock implementations of the external collaborators
//! (lookup service, orchestration route hook), allowing the chunk pipeline
//! to be exercised without real infrastructure. The object store side is
//! covered by `artifact::MemoryObjectStore`.
//!
//! # Example
//!
//! ```rust,ignore
//! use accession_core::testing::{MockLookupClient, MockRouteController};
//!
//! let lookup = MockLookupClient::new();
//! let routes = MockRouteController::new();
//!
//! lookup.recognize("B001", "C1").await;
//! ```

mod mock_lookup;
mod mock_routes;

pub use mock_lookup::MockLookupClient;
pub use mock_routes::MockRouteController;

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::coordinator::{ChunkBatch, ScanRecord};

    /// A chunk built from (barcode, supplied code) pairs.
    pub fn chunk(index: usize, is_last_chunk: bool, records: &[(&str, &str)]) -> ChunkBatch {
        ChunkBatch::new(
            index,
            is_last_chunk,
            records
                .iter()
                .map(|(barcode, code)| ScanRecord::new(*barcode, *code))
                .collect(),
        )
    }
}
