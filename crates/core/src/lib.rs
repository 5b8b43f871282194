pub mod artifact;
pub mod config;
pub mod coordinator;
pub mod lookup;
pub mod metrics;
pub mod report;
pub mod telemetry;
pub mod testing;

pub use artifact::{
    ArtifactError, ArtifactRef, ArtifactRetirer, LocalObjectStore, MemoryObjectStore, ObjectStore,
    RetireOutcome, StoreError,
};
pub use config::{
    load_config, load_config_from_str, validate_config, ArtifactConfig, Config, ConfigError,
    LookupConfig, ReportConfig,
};
pub use coordinator::{
    ChunkBatch, ChunkCoordinator, ChunkOutcome, FailureKind, ReconcileError, RouteController,
    RouteError, ScanRecord, SequenceCompletion,
};
pub use lookup::{CodeMap, HttpLookupClient, LookupClient, LookupError};
pub use report::{AppendReceipt, ReportError, ReportTarget, ReportWriter};
pub use telemetry::init_tracing;
