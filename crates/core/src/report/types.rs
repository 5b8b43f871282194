use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// The (location, institution) pair a report and its chunk sequence belong to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportTarget {
    pub location_code: String,
    pub institution_code: String,
}

impl ReportTarget {
    pub fn new(location_code: impl Into<String>, institution_code: impl Into<String>) -> Self {
        Self {
            location_code: location_code.into(),
            institution_code: institution_code.into(),
        }
    }
}

impl fmt::Display for ReportTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.location_code, self.institution_code)
    }
}

/// What an append did to the report file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppendReceipt {
    /// The chunk was written.
    Appended {
        path: PathBuf,
        header_written: bool,
        separator_written: bool,
        lines_written: usize,
    },
    /// The commit ledger already holds this chunk; nothing was written.
    AlreadyCommitted { path: PathBuf },
}

impl AppendReceipt {
    pub fn path(&self) -> &PathBuf {
        match self {
            Self::Appended { path, .. } | Self::AlreadyCommitted { path } => path,
        }
    }

    pub fn lines_written(&self) -> usize {
        match self {
            Self::Appended { lines_written, .. } => *lines_written,
            Self::AlreadyCommitted { .. } => 0,
        }
    }
}
