//! Append-only report file writer.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{Local, NaiveDate};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use super::error::ReportError;
use super::ledger::{CommitLedger, SqliteCommitLedger};
use super::types::{AppendReceipt, ReportTarget};
use crate::config::ReportConfig;

/// Writes the cumulative report for every (location, institution) pair.
///
/// One writer serves all targets. Appends resolving to the same file are
/// serialized; appends to different files run concurrently.
pub struct ReportWriter {
    config: ReportConfig,
    ledger: Option<Arc<dyn CommitLedger>>,
    file_locks: Mutex<HashMap<PathBuf, Arc<tokio::sync::Mutex<()>>>>,
    sequence_dates: Mutex<HashMap<ReportTarget, NaiveDate>>,
    today: fn() -> NaiveDate,
}

fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

fn lock_map<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl ReportWriter {
    /// Creates a writer. Opens the commit ledger when
    /// `skip_committed_chunks` is enabled.
    pub fn new(config: ReportConfig) -> Result<Self, ReportError> {
        let ledger: Option<Arc<dyn CommitLedger>> = if config.skip_committed_chunks {
            let ledger = match &config.ledger_path {
                Some(path) => SqliteCommitLedger::new(path)?,
                None => SqliteCommitLedger::in_memory()?,
            };
            Some(Arc::new(ledger))
        } else {
            None
        };

        Ok(Self {
            config,
            ledger,
            file_locks: Mutex::new(HashMap::new()),
            sequence_dates: Mutex::new(HashMap::new()),
            today: local_today,
        })
    }

    /// Uses the given ledger regardless of configuration.
    pub fn with_ledger(mut self, ledger: Arc<dyn CommitLedger>) -> Self {
        self.ledger = Some(ledger);
        self
    }

    /// Overrides the date source used for new sequences.
    pub fn with_clock(mut self, today: fn() -> NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    /// Report file path for a target on a given creation date.
    pub fn report_path(&self, target: &ReportTarget, date: NaiveDate) -> PathBuf {
        let file_name = format!(
            "{}{}{}{}.csv",
            self.config.file_prefix,
            target.location_code,
            target.institution_code,
            date.format(&self.config.date_format)
        );
        self.config
            .base_path
            .join(&target.location_code)
            .join(&target.institution_code)
            .join(file_name)
    }

    /// Path the next append for `target` would write to.
    pub fn current_report_path(&self, target: &ReportTarget) -> PathBuf {
        let date = lock_map(&self.sequence_dates)
            .get(target)
            .copied()
            .unwrap_or_else(self.today);
        self.report_path(target, date)
    }

    /// Forgets the creation date of the target's sequence and releases
    /// file locks nobody is holding.
    pub fn finish_sequence(&self, target: &ReportTarget) {
        lock_map(&self.sequence_dates).remove(target);
        let mut locks = lock_map(&self.file_locks);
        prune_idle_locks(&mut locks);
    }

    /// Index 0 opens a new sequence dated today; later chunks reuse the
    /// sequence's date so a run spanning midnight stays in one file.
    fn sequence_date(&self, target: &ReportTarget, index: usize) -> NaiveDate {
        let mut dates = lock_map(&self.sequence_dates);
        if index == 0 {
            let today = (self.today)();
            dates.insert(target.clone(), today);
            today
        } else {
            *dates.entry(target.clone()).or_insert_with(self.today)
        }
    }

    fn file_lock(&self, path: &Path) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = lock_map(&self.file_locks);
        prune_idle_locks(&mut locks);
        Arc::clone(locks.entry(path.to_path_buf()).or_default())
    }

    #[cfg(test)]
    fn tracked_locks(&self) -> usize {
        lock_map(&self.file_locks).len()
    }

    /// Appends one chunk's reconciled lines to the target's report.
    ///
    /// `sequence` names the batch the chunk belongs to; the commit ledger
    /// keys on it so same-day batches for one target stay apart.
    ///
    /// Index 0 always writes the header first, on a line of its own. A line
    /// break separates the new lines from earlier data when the file already
    /// holds more than one line. Everything for the chunk goes out in a
    /// single append.
    pub async fn append(
        &self,
        target: &ReportTarget,
        sequence: &str,
        index: usize,
        lines: &[String],
    ) -> Result<AppendReceipt, ReportError> {
        let date = self.sequence_date(target, index);
        let path = self.report_path(target, date);

        let lock = self.file_lock(&path);
        let _guard = lock.lock().await;

        if let Some(ledger) = &self.ledger {
            if ledger.is_committed(&path, sequence, index)? {
                info!(
                    path = %path.display(),
                    sequence,
                    index,
                    "Chunk already committed to report, skipping"
                );
                return Ok(AppendReceipt::AlreadyCommitted { path });
            }
        }

        Self::ensure_file(&path).await?;

        let existing = fs::read(&path)
            .await
            .map_err(|e| ReportError::ReadFailed {
                path: path.clone(),
                source: e,
            })?;
        let line_count = count_lines(&existing);

        let header_written = index == 0;
        let separator_written = index > 0 && !lines.is_empty() && line_count > 1;

        let mut buffer = String::new();
        if header_written {
            if existing.last().is_some_and(|&b| b != b'\n') {
                buffer.push('\n');
            }
            buffer.push_str(&self.config.header);
            buffer.push('\n');
        }
        if separator_written {
            buffer.push('\n');
        }
        buffer.push_str(&lines.join("\n"));

        if !buffer.is_empty() {
            let mut file = OpenOptions::new()
                .append(true)
                .open(&path)
                .await
                .map_err(|e| ReportError::AppendFailed {
                    path: path.clone(),
                    source: e,
                })?;
            file.write_all(buffer.as_bytes())
                .await
                .map_err(|e| ReportError::AppendFailed {
                    path: path.clone(),
                    source: e,
                })?;
            file.flush().await.map_err(|e| ReportError::AppendFailed {
                path: path.clone(),
                source: e,
            })?;
        }

        if let Some(ledger) = &self.ledger {
            ledger.record(&path, sequence, index)?;
        }

        debug!(
            path = %path.display(),
            index,
            lines = lines.len(),
            header_written,
            separator_written,
            "Appended chunk to report"
        );

        Ok(AppendReceipt::Appended {
            path,
            header_written,
            separator_written,
            lines_written: lines.len(),
        })
    }

    /// Creates parent directories and an empty file if missing.
    async fn ensure_file(path: &Path) -> Result<(), ReportError> {
        let exists = fs::try_exists(path)
            .await
            .map_err(|e| ReportError::ReadFailed {
                path: path.to_path_buf(),
                source: e,
            })?;
        if exists {
            return Ok(());
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| ReportError::DirectoryCreationFailed {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
        }

        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .await
        {
            Ok(_) => {
                info!(path = %path.display(), "Accession reconciliation report created");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => Ok(()),
            Err(e) => Err(ReportError::FileCreationFailed {
                path: path.to_path_buf(),
                source: e,
            }),
        }
    }
}

fn prune_idle_locks(locks: &mut HashMap<PathBuf, Arc<tokio::sync::Mutex<()>>>) {
    locks.retain(|_, lock| Arc::strong_count(lock) > 1);
}

/// Number of lines the way a line reader sees them: a trailing newline
/// does not start another line.
pub(crate) fn count_lines(content: &[u8]) -> usize {
    let breaks = content.iter().filter(|&&b| b == b'\n').count();
    match content.last() {
        None => 0,
        Some(b'\n') => breaks,
        Some(_) => breaks + 1,
    }
}
