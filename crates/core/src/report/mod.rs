//! Cumulative report files.
//!
//! One tab-separated report exists per (location, institution, creation
//! date). Chunks of a split batch append to it in turn: the first chunk
//! writes the header, later chunks add their reconciled lines. The file is
//! only ever appended to.

mod error;
mod ledger;
mod types;
mod writer;

pub use error::{LedgerError, ReportError};
pub use ledger::{CommitLedger, SqliteCommitLedger};
pub use types::{AppendReceipt, ReportTarget};
pub use writer::ReportWriter;
