//! Log Manager
//!
//! Owns the log writer and the LSN counter, and recovers both counters from
//! an existing log on cold start.

use std::path::{Path, PathBuf};

use crate::config::LogSyncMode;
use crate::error::{Result, WalError};
use crate::{Lsn, PageId, TransactionId};

use super::{LogReader, LogRecord, LogWriter, ScanStats};

/// Append-only record store with monotonically increasing LSNs
pub struct LogManager {
    path: PathBuf,
    writer: LogWriter,
    next_lsn: Lsn,
    next_transaction_id: TransactionId,
    /// What the opening scan found
    scan: ScanStats,
}

impl LogManager {
    /// Open or create the log at `path`
    ///
    /// If the log exists, one linear scan computes the highest LSN and
    /// transaction id over both record shapes; counters resume one past
    /// each. A damaged final frame is cut off. Damage with more log behind
    /// it fails with `LogCorruption` and leaves the file untouched.
    pub fn open(
        path: &Path,
        sync_mode: LogSyncMode,
        first_transaction_id: TransactionId,
    ) -> Result<Self> {
        let (writer, scan) = if path.exists() {
            let scan = LogReader::verify(path)?;
            if scan.corruption_mid_log {
                return Err(WalError::LogCorruption(format!(
                    "{}: corrupt frame at byte {} is followed by more log data",
                    path.display(),
                    scan.valid_len
                )));
            }
            if scan.has_torn_tail() {
                tracing::warn!(
                    path = %path.display(),
                    valid_len = scan.valid_len,
                    corrupted = scan.records_corrupted,
                    "Truncating damaged log tail"
                );
            }
            let writer = LogWriter::open_truncated(path, scan.valid_len, sync_mode)?;
            (writer, scan)
        } else {
            (LogWriter::open(path, sync_mode)?, ScanStats::default())
        };

        let next_lsn = scan.last_lsn + 1;
        let next_transaction_id = if scan.records_read > 0 {
            first_transaction_id.max(scan.max_transaction_id + 1)
        } else {
            first_transaction_id
        };

        tracing::debug!(
            path = %path.display(),
            records = scan.records_read,
            next_lsn,
            next_transaction_id,
            "Log opened"
        );

        Ok(Self {
            path: path.to_path_buf(),
            writer,
            next_lsn,
            next_transaction_id,
            scan,
        })
    }

    /// Make sure the next LSN is greater than `lsn`
    ///
    /// Used at open with the newest LSN found in the page files, so a log
    /// that lost records can never hand out an LSN a page already carries.
    pub fn reserve_past(&mut self, lsn: Lsn) {
        if lsn >= self.next_lsn {
            tracing::warn!(
                log_next_lsn = self.next_lsn,
                page_lsn = lsn,
                "Page files are ahead of the log, moving next LSN past them"
            );
            self.next_lsn = lsn + 1;
        }
    }

    /// Durably append a write record, returning its LSN
    pub fn append_write(
        &mut self,
        taid: TransactionId,
        page_id: PageId,
        payload: &str,
    ) -> Result<Lsn> {
        let lsn = self.next_lsn;
        self.writer.append(&LogRecord::write(lsn, taid, page_id, payload))?;
        self.next_lsn += 1;
        Ok(lsn)
    }

    /// Durably append an end-of-transaction record, returning its LSN
    pub fn append_end_of_transaction(&mut self, taid: TransactionId) -> Result<Lsn> {
        let lsn = self.next_lsn;
        self.writer.append(&LogRecord::end_of_transaction(lsn, taid))?;
        self.next_lsn += 1;
        Ok(lsn)
    }

    /// Force sync to disk
    pub fn sync(&mut self) -> Result<()> {
        self.writer.sync()
    }

    /// LSN the next appended record will receive
    pub fn next_lsn(&self) -> Lsn {
        self.next_lsn
    }

    /// First transaction id safe to issue, as recovered on open
    pub fn next_transaction_id(&self) -> TransactionId {
        self.next_transaction_id
    }

    /// Statistics from the scan performed on open
    pub fn open_scan(&self) -> &ScanStats {
        &self.scan
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Bytes of valid log
    pub fn len(&self) -> u64 {
        self.writer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writer.is_empty()
    }
}
