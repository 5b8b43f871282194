//! Chunk coordination for split accession batches.
//!
//! The orchestration engine splits an accession batch into chunks and hands
//! each one to `ChunkCoordinator::handle` together with the (location,
//! institution) pair and the artifact that started the batch. The
//! coordinator:
//! - reconciles the chunk's barcodes against the lookup service
//! - appends the reconciled lines to the pair's report
//! - on the last chunk, retires the artifact and starts the delivery route
//!
//! # Example
//!
//! ```ignore
//! use accession_core::{ChunkBatch, ChunkCoordinator, ArtifactRef, ReportTarget, ScanRecord};
//!
//! let coordinator = ChunkCoordinator::from_config(&config, store, routes)?;
//!
//! let chunk = ChunkBatch::new(0, false, vec![ScanRecord::new("B001", "PA")]);
//! let outcome = coordinator
//!     .handle(chunk, &ReportTarget::new("RECAP", "PUL"), &ArtifactRef::new("inbox", "accession/PUL/batch.csv"))
//!     .await;
//!
//! if let Some(kind) = outcome.failure_kind() {
//!     println!("chunk {} failed: {:?}", outcome.index(), kind);
//! }
//! ```

mod handler;
mod route;
mod types;

pub use handler::ChunkCoordinator;
pub use route::{route_id, RouteController, RouteError};
pub use types::{
    ChunkBatch, ChunkOutcome, FailureKind, ReconcileError, ScanRecord, SequenceCompletion,
};
