//! Prometheus metrics for chunk reconciliation.
//!
//! Covers chunk results, lookup calls, report output and sequence
//! completion. The embedding service registers `all_metrics()` in its own
//! registry.

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Chunk Metrics
// =============================================================================

/// Chunks handled total by result.
pub static CHUNKS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("accession_chunks_total", "Total chunks handled"),
        &["result"], // "committed", "skipped", "failed"
    )
    .unwrap()
});

/// Chunk failures total by failure kind.
pub static CHUNK_FAILURES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("accession_chunk_failures_total", "Total chunk failures"),
        &["kind"], // "lookup", "file_io", "artifact_store", "route"
    )
    .unwrap()
});

/// Report lines appended total.
pub static REPORT_LINES_WRITTEN: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "accession_report_lines_written_total",
        "Total reconciled lines appended to reports",
    )
    .unwrap()
});

// =============================================================================
// Lookup Metrics
// =============================================================================

/// Lookup call duration in seconds.
pub static LOOKUP_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "accession_lookup_duration_seconds",
            "Duration of reconciliation lookup calls",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["result"], // "success", "error"
    )
    .unwrap()
});

// =============================================================================
// Sequence Metrics
// =============================================================================

/// Sequences completed total by result.
pub static SEQUENCES_COMPLETED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "accession_sequences_completed_total",
            "Total chunk sequences closed by their last chunk",
        ),
        &["result"], // "clean", "degraded"
    )
    .unwrap()
});

/// Get all metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(CHUNKS_TOTAL.clone()),
        Box::new(CHUNK_FAILURES.clone()),
        Box::new(REPORT_LINES_WRITTEN.clone()),
        Box::new(LOOKUP_DURATION.clone()),
        Box::new(SEQUENCES_COMPLETED.clone()),
    ]
}
