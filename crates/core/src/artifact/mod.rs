//! Source artifact lifecycle.
//!
//! Once every chunk of a sequence has been handled, the artifact that
//! triggered it is copied to a "done" key next to it and the original is
//! deleted. A missing artifact means it was already retired.

mod error;
mod local;
mod retirer;
mod store;

pub use error::{ArtifactError, StoreError};
pub use local::LocalObjectStore;
pub use retirer::{done_key, ArtifactRef, ArtifactRetirer, RetireOutcome};
pub use store::{MemoryObjectStore, ObjectStore, StoreOp};
