use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::route::RouteError;
use crate::artifact::{ArtifactError, RetireOutcome};
use crate::lookup::LookupError;
use crate::report::{AppendReceipt, ReportError};

/// One scanned item as delivered by the orchestration engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanRecord {
    pub barcode: String,
    #[serde(rename = "customerCode")]
    pub supplied_code: String,
}

impl ScanRecord {
    pub fn new(barcode: impl Into<String>, supplied_code: impl Into<String>) -> Self {
        Self {
            barcode: barcode.into(),
            supplied_code: supplied_code.into(),
        }
    }
}

/// One chunk of a split batch.
///
/// `is_last_chunk` marks the end of the sequence; the index of the last
/// chunk is not meaningful on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkBatch {
    pub index: usize,
    pub is_last_chunk: bool,
    pub records: Vec<ScanRecord>,
}

impl ChunkBatch {
    pub fn new(index: usize, is_last_chunk: bool, records: Vec<ScanRecord>) -> Self {
        Self {
            index,
            is_last_chunk,
            records,
        }
    }
}

/// Category of a chunk failure, for metrics and retry decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Lookup,
    FileIo,
    ArtifactStore,
    Route,
}

impl FailureKind {
    /// Metric label for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lookup => "lookup",
            Self::FileIo => "file_io",
            Self::ArtifactStore => "artifact_store",
            Self::Route => "route",
        }
    }
}

/// Any error raised while handling a chunk.
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("Lookup failed: {0}")]
    Lookup(#[from] LookupError),

    #[error("Report write failed: {0}")]
    Report(#[from] ReportError),

    #[error("Artifact retirement failed: {0}")]
    Artifact(#[from] ArtifactError),

    #[error("Route start failed: {0}")]
    Route(#[from] RouteError),
}

impl ReconcileError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Lookup(_) => FailureKind::Lookup,
            Self::Report(_) => FailureKind::FileIo,
            Self::Artifact(_) => FailureKind::ArtifactStore,
            Self::Route(_) => FailureKind::Route,
        }
    }
}

/// What happened when the last chunk closed its sequence.
#[derive(Debug)]
pub struct SequenceCompletion {
    pub route_id: String,
    pub retirement: Result<RetireOutcome, ArtifactError>,
    pub route_started: Result<(), RouteError>,
}

impl SequenceCompletion {
    pub fn is_clean(&self) -> bool {
        self.retirement.is_ok() && self.route_started.is_ok()
    }
}

/// Result of handling one chunk.
#[derive(Debug)]
pub enum ChunkOutcome {
    /// The chunk reached the report. `completion` is set for the last chunk.
    Committed {
        index: usize,
        receipt: AppendReceipt,
        completion: Option<SequenceCompletion>,
    },
    /// The chunk failed before touching the report, artifact or route.
    Failed { index: usize, error: ReconcileError },
}

impl ChunkOutcome {
    pub fn index(&self) -> usize {
        match self {
            Self::Committed { index, .. } | Self::Failed { index, .. } => *index,
        }
    }

    /// Committed, and any completion steps succeeded.
    pub fn is_success(&self) -> bool {
        match self {
            Self::Committed { completion, .. } => {
                completion.as_ref().map_or(true, SequenceCompletion::is_clean)
            }
            Self::Failed { .. } => false,
        }
    }

    /// The first failure the chunk ran into, if any.
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            Self::Failed { error, .. } => Some(error.kind()),
            Self::Committed {
                completion: Some(completion),
                ..
            } => {
                if completion.retirement.is_err() {
                    Some(FailureKind::ArtifactStore)
                } else if completion.route_started.is_err() {
                    Some(FailureKind::Route)
                } else {
                    None
                }
            }
            Self::Committed { .. } => None,
        }
    }
}
