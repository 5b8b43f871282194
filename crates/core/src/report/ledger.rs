use std::path::Path;
use std::sync::Mutex;

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

use super::error::LedgerError;

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS committed_chunks (
        report_path TEXT NOT NULL,
        sequence TEXT NOT NULL,
        chunk_index INTEGER NOT NULL,
        committed_at TEXT NOT NULL,
        PRIMARY KEY (report_path, sequence, chunk_index)
    );
"#;

/// Record of which chunks were already appended to a report file.
///
/// A chunk is identified by the report file, the sequence it belongs to
/// (the source artifact) and its index. Two batches for the same target on
/// the same day share a file but not a sequence.
pub trait CommitLedger: Send + Sync {
    fn is_committed(
        &self,
        report_path: &Path,
        sequence: &str,
        index: usize,
    ) -> Result<bool, LedgerError>;

    fn record(&self, report_path: &Path, sequence: &str, index: usize) -> Result<(), LedgerError>;
}

/// SQLite-backed commit ledger
pub struct SqliteCommitLedger {
    conn: Mutex<Connection>,
}

impl SqliteCommitLedger {
    /// Open the ledger database, creating the file and table if needed
    pub fn new(path: &Path) -> Result<Self, LedgerError> {
        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory ledger (lives as long as the process)
    pub fn in_memory() -> Result<Self, LedgerError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, LedgerError> {
        self.conn
            .lock()
            .map_err(|_| LedgerError::Database("ledger lock poisoned".to_string()))
    }
}

impl CommitLedger for SqliteCommitLedger {
    fn is_committed(
        &self,
        report_path: &Path,
        sequence: &str,
        index: usize,
    ) -> Result<bool, LedgerError> {
        let conn = self.lock()?;
        let found: Option<i64> = conn
            .query_row(
                "SELECT 1 FROM committed_chunks WHERE report_path = ? AND sequence = ? AND chunk_index = ?",
                params![report_path.to_string_lossy(), sequence, index as i64],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn record(&self, report_path: &Path, sequence: &str, index: usize) -> Result<(), LedgerError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT OR IGNORE INTO committed_chunks (report_path, sequence, chunk_index, committed_at) VALUES (?, ?, ?, ?)",
            params![
                report_path.to_string_lossy(),
                sequence,
                index as i64,
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const BATCH: &str = "inbox/accession/PUL/batch.csv";

    #[test]
    fn test_record_and_query() {
        let ledger = SqliteCommitLedger::in_memory().unwrap();
        let path = Path::new("/reports/RECAP/PUL/report.csv");

        assert!(!ledger.is_committed(path, BATCH, 0).unwrap());
        ledger.record(path, BATCH, 0).unwrap();
        assert!(ledger.is_committed(path, BATCH, 0).unwrap());
        assert!(!ledger.is_committed(path, BATCH, 1).unwrap());
        assert!(!ledger
            .is_committed(Path::new("/reports/RECAP/CUL/report.csv"), BATCH, 0)
            .unwrap());
    }

    #[test]
    fn test_sequences_sharing_a_file_are_separate() {
        let ledger = SqliteCommitLedger::in_memory().unwrap();
        let path = Path::new("/reports/RECAP/PUL/report.csv");

        ledger.record(path, "inbox/first.csv", 0).unwrap();
        assert!(ledger.is_committed(path, "inbox/first.csv", 0).unwrap());
        assert!(!ledger.is_committed(path, "inbox/second.csv", 0).unwrap());
    }

    #[test]
    fn test_record_twice_is_harmless() {
        let ledger = SqliteCommitLedger::in_memory().unwrap();
        let path = Path::new("report.csv");
        ledger.record(path, BATCH, 3).unwrap();
        ledger.record(path, BATCH, 3).unwrap();
        assert!(ledger.is_committed(path, BATCH, 3).unwrap());
    }

    #[test]
    fn test_file_ledger_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let db = dir.path().join("ledger.db");
        let path = Path::new("report.csv");

        SqliteCommitLedger::new(&db)
            .unwrap()
            .record(path, BATCH, 2)
            .unwrap();

        let reopened = SqliteCommitLedger::new(&db).unwrap();
        assert!(reopened.is_committed(path, BATCH, 2).unwrap());
    }
}
