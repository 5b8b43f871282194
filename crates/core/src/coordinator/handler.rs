//! Per-chunk reconciliation.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, error, info, warn};

use super::route::{route_id, RouteController};
use super::types::{ChunkBatch, ChunkOutcome, ReconcileError, ScanRecord, SequenceCompletion};
use crate::artifact::{ArtifactRef, ArtifactRetirer, ObjectStore};
use crate::config::Config;
use crate::lookup::{CodeMap, HttpLookupClient, LookupClient};
use crate::metrics::{
    CHUNKS_TOTAL, CHUNK_FAILURES, LOOKUP_DURATION, REPORT_LINES_WRITTEN, SEQUENCES_COMPLETED,
};
use crate::report::{AppendReceipt, ReportTarget, ReportWriter};

/// Handles the chunks of split accession batches.
///
/// One coordinator serves every (location, institution) pair; the pair is
/// passed with each chunk.
pub struct ChunkCoordinator {
    lookup: Arc<dyn LookupClient>,
    writer: Arc<ReportWriter>,
    retirer: ArtifactRetirer,
    routes: Arc<dyn RouteController>,
    route_suffix: String,
}

impl ChunkCoordinator {
    pub fn new(
        lookup: Arc<dyn LookupClient>,
        writer: Arc<ReportWriter>,
        retirer: ArtifactRetirer,
        routes: Arc<dyn RouteController>,
        route_suffix: impl Into<String>,
    ) -> Self {
        Self {
            lookup,
            writer,
            retirer,
            routes,
            route_suffix: route_suffix.into(),
        }
    }

    /// Builds a coordinator with the HTTP lookup client and a report writer
    /// from configuration.
    pub fn from_config(
        config: &Config,
        store: Arc<dyn ObjectStore>,
        routes: Arc<dyn RouteController>,
    ) -> Result<Self, ReconcileError> {
        let lookup = HttpLookupClient::new(&config.lookup)?;
        let writer = ReportWriter::new(config.report.clone())?;
        let retirer = ArtifactRetirer::new(store, config.artifact.done_marker.clone());

        info!(
            lookup = %lookup.url(),
            base_path = %config.report.base_path.display(),
            skip_committed_chunks = config.report.skip_committed_chunks,
            "Chunk coordinator configured"
        );

        Ok(Self::new(
            Arc::new(lookup),
            Arc::new(writer),
            retirer,
            routes,
            config.artifact.route_suffix.clone(),
        ))
    }

    pub fn writer(&self) -> &Arc<ReportWriter> {
        &self.writer
    }

    /// Reconciles one chunk into the target's report.
    ///
    /// Never fails outward: errors are logged and returned in the outcome.
    /// A lookup or report failure stops the chunk before the artifact or
    /// route is touched. The last chunk retires the artifact and starts
    /// the delivery route.
    pub async fn handle(
        &self,
        chunk: ChunkBatch,
        target: &ReportTarget,
        artifact: &ArtifactRef,
    ) -> ChunkOutcome {
        let index = chunk.index;

        let outcome = match self.reconcile_and_append(&chunk, target, artifact).await {
            Ok(receipt) => {
                let completion = if chunk.is_last_chunk {
                    Some(self.complete_sequence(index, target, artifact).await)
                } else {
                    None
                };
                ChunkOutcome::Committed {
                    index,
                    receipt,
                    completion,
                }
            }
            Err(e) => {
                error!(
                    location = %target.location_code,
                    institution = %target.institution_code,
                    index,
                    kind = ?e.kind(),
                    error = %e,
                    "Chunk reconciliation failed"
                );
                ChunkOutcome::Failed { index, error: e }
            }
        };

        record_metrics(&outcome);
        outcome
    }

    async fn reconcile_and_append(
        &self,
        chunk: &ChunkBatch,
        target: &ReportTarget,
        artifact: &ArtifactRef,
    ) -> Result<AppendReceipt, ReconcileError> {
        let requested = barcode_map(&chunk.records);

        let reconciled = if requested.is_empty() {
            CodeMap::new()
        } else {
            let started = Instant::now();
            let result = self.lookup.reconcile(&requested).await;
            LOOKUP_DURATION
                .with_label_values(&[if result.is_ok() { "success" } else { "error" }])
                .observe(started.elapsed().as_secs_f64());
            result?
        };

        let lines = report_lines(&requested, &reconciled);
        debug!(
            report = %target,
            index = chunk.index,
            requested = requested.len(),
            reconciled = lines.len(),
            "Chunk reconciled"
        );

        let sequence = format!("{}/{}", artifact.bucket, artifact.key);
        Ok(self
            .writer
            .append(target, &sequence, chunk.index, &lines)
            .await?)
    }

    async fn complete_sequence(
        &self,
        index: usize,
        target: &ReportTarget,
        artifact: &ArtifactRef,
    ) -> SequenceCompletion {
        info!(report = %target, index, "Last chunk of sequence handled");

        let retirement = self.retirer.retire(artifact, target).await;
        if let Err(e) = &retirement {
            error!(
                bucket = %artifact.bucket,
                key = %artifact.key,
                error = %e,
                "Artifact retirement failed"
            );
        }

        let route_id = route_id(target, &self.route_suffix);
        info!(route_id = %route_id, "Starting delivery route");
        let route_started = self.routes.start_route(&route_id).await;
        if let Err(e) = &route_started {
            error!(route_id = %route_id, error = %e, "Failed to start delivery route");
        }

        self.writer.finish_sequence(target);

        SequenceCompletion {
            route_id,
            retirement,
            route_started,
        }
    }
}

fn record_metrics(outcome: &ChunkOutcome) {
    match outcome {
        ChunkOutcome::Committed {
            receipt,
            completion,
            ..
        } => {
            let result = match receipt {
                AppendReceipt::Appended { .. } => "committed",
                AppendReceipt::AlreadyCommitted { .. } => "skipped",
            };
            CHUNKS_TOTAL.with_label_values(&[result]).inc();
            REPORT_LINES_WRITTEN.inc_by(receipt.lines_written() as u64);

            if let Some(completion) = completion {
                let result = if completion.is_clean() { "clean" } else { "degraded" };
                SEQUENCES_COMPLETED.with_label_values(&[result]).inc();
                if let Some(kind) = outcome.failure_kind() {
                    CHUNK_FAILURES.with_label_values(&[kind.as_str()]).inc();
                }
            }
        }
        ChunkOutcome::Failed { error, .. } => {
            CHUNKS_TOTAL.with_label_values(&["failed"]).inc();
            CHUNK_FAILURES.with_label_values(&[error.kind().as_str()]).inc();
        }
    }
}

/// Barcode → supplied code; a repeated barcode keeps its last code.
fn barcode_map(records: &[ScanRecord]) -> CodeMap {
    let mut map = CodeMap::new();
    for record in records {
        if let Some(previous) = map.insert(record.barcode.clone(), record.supplied_code.clone()) {
            debug!(
                barcode = %record.barcode,
                previous = %previous,
                "Duplicate barcode in chunk, keeping last code"
            );
        }
    }
    map
}

/// `barcode<TAB>canonical` lines for reconciled barcodes that were asked for.
fn report_lines(requested: &CodeMap, reconciled: &CodeMap) -> Vec<String> {
    reconciled
        .iter()
        .filter(|(barcode, _)| {
            let asked = requested.contains_key(*barcode);
            if !asked {
                warn!(barcode = %barcode, "Lookup returned a barcode that was not requested");
            }
            asked
        })
        .map(|(barcode, canonical)| format!("{}\t{}", barcode, canonical))
        .collect()
}
