//! Recovery Manager
//!
//! Rebuilds durable page state from the log alone, before any transaction
//! activity resumes after a restart.
//!
//! ## Algorithm (redo only)
//! 1. No log: nothing to do.
//! 2. One forward pass: collect write records and the set of transactions
//!    that have an end-of-transaction record.
//! 3. For each committed write, in ascending LSN order, overwrite the page
//!    file if it is absent or holds an older LSN.
//! 4. Writes of transactions that never committed are skipped; they never
//!    reached a page file, so nothing needs undoing.

use std::collections::{BTreeSet, HashSet};
use std::path::PathBuf;

use crate::config::Config;
use crate::error::{Result, WalError};
use crate::storage::{PageStore, PersistedPage};
use crate::wal::{LogReader, LogRecord};
use crate::{PageId, TransactionId};

/// Runs redo recovery against a data directory
pub struct RecoveryManager {
    log_path: PathBuf,
    pages: PageStore,
}

/// Result of a recovery run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecoveryReport {
    /// Whether a log file existed at all
    pub log_present: bool,

    /// Valid records read from the log
    pub records_scanned: u64,

    /// Corrupt frames hit (the scan stops at the first one)
    pub corrupted_records: u64,

    /// Transactions with an end-of-transaction record
    pub committed_transactions: usize,

    /// Committed writes applied to page files
    pub pages_redone: u64,

    /// Committed writes skipped because the page already held that LSN or newer
    pub skipped_up_to_date: u64,

    /// Writes skipped because their transaction never committed
    pub skipped_uncommitted: u64,

    /// Pages whose redo failed with a storage error
    pub failed_pages: Vec<PageId>,
}

impl RecoveryManager {
    /// Create a recovery manager for the directories named by `config`
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            log_path: config.log_path(),
            pages: PageStore::open(&config.page_dir())?,
        })
    }

    /// Run redo recovery
    ///
    /// Storage errors on a single page are logged and that page is skipped.
    /// Recovery aborts only if the log cannot be read, or if it is damaged
    /// somewhere other than its final frame: redoing a prefix would then
    /// silently drop commits logged after the damage.
    pub fn start_recovery(&self) -> Result<RecoveryReport> {
        let mut report = RecoveryReport::default();

        if !self.log_path.exists() {
            tracing::info!(path = %self.log_path.display(), "No log found, nothing to recover");
            return Ok(report);
        }
        report.log_present = true;

        // Step 1: One forward pass over the log
        let (records, stats) = LogReader::read_all(&self.log_path)?;
        report.records_scanned = stats.records_read;
        report.corrupted_records = stats.records_corrupted;
        if stats.corruption_mid_log {
            return Err(WalError::LogCorruption(format!(
                "{}: corrupt frame at byte {} is followed by more log data",
                self.log_path.display(),
                stats.valid_len
            )));
        }
        if stats.has_torn_tail() {
            tracing::warn!(
                valid_len = stats.valid_len,
                corrupted = stats.records_corrupted,
                "Log has a damaged tail; recovering from the valid prefix"
            );
        }

        let mut committed: HashSet<TransactionId> = HashSet::new();
        let mut writes = Vec::new();
        for record in records {
            match record {
                LogRecord::EndOfTransaction { taid, .. } => {
                    committed.insert(taid);
                }
                LogRecord::Write {
                    lsn,
                    taid,
                    page_id,
                    payload,
                } => writes.push((lsn, taid, page_id, payload)),
            }
        }
        writes.sort_by_key(|(lsn, ..)| *lsn);
        report.committed_transactions = committed.len();

        // Step 2: Redo committed writes onto outdated pages
        let mut failed: BTreeSet<PageId> = BTreeSet::new();
        for (lsn, taid, page_id, payload) in writes {
            if !committed.contains(&taid) {
                report.skipped_uncommitted += 1;
                continue;
            }
            if failed.contains(&page_id) {
                continue;
            }

            let outcome = self.pages.persisted_lsn(page_id).and_then(|current| match current {
                Some(current) if current >= lsn => Ok(false),
                _ => self
                    .pages
                    .write(page_id, &PersistedPage::new(lsn, payload))
                    .map(|_| true),
            });

            match outcome {
                Ok(true) => {
                    tracing::debug!(page_id, lsn, taid, "Redo applied");
                    report.pages_redone += 1;
                }
                Ok(false) => report.skipped_up_to_date += 1,
                Err(err) => {
                    tracing::warn!(page_id, lsn, error = %err, "Redo failed, skipping page");
                    failed.insert(page_id);
                }
            }
        }
        report.failed_pages = failed.into_iter().collect();

        tracing::info!(
            records = report.records_scanned,
            committed = report.committed_transactions,
            redone = report.pages_redone,
            up_to_date = report.skipped_up_to_date,
            uncommitted = report.skipped_uncommitted,
            failed = report.failed_pages.len(),
            "Recovery complete"
        );

        Ok(report)
    }
}
