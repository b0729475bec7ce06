//! Log Writer
//!
//! Handles appending records to the log file.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

use crate::config::LogSyncMode;
use crate::error::Result;
use crate::failpoint;

use super::LogRecord;

/// Appends records to the log file, forcing each one to disk
pub struct LogWriter {
    file: File,
    sync_mode: LogSyncMode,
    /// Length of the file up to the last fully written frame
    len: u64,
}

impl LogWriter {
    /// Open or create a log file for appending
    pub fn open(path: &Path, sync_mode: LogSyncMode) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        let len = file.metadata()?.len();

        Ok(Self {
            file,
            sync_mode,
            len,
        })
    }

    /// Open a log file, cutting it back to `valid_len` first
    ///
    /// Used after a scan found a torn or corrupt tail, so that new frames
    /// never land behind bytes a reader would stop at.
    pub fn open_truncated(path: &Path, valid_len: u64, sync_mode: LogSyncMode) -> Result<Self> {
        let mut writer = Self::open(path, sync_mode)?;
        if writer.len > valid_len {
            writer.file.set_len(valid_len)?;
            writer.file.sync_all()?;
            writer.len = valid_len;
        }
        Ok(writer)
    }

    /// Append a record and force it to stable storage
    ///
    /// On failure the file is cut back to its previous length (best effort)
    /// so a half-written frame is not left in front of later appends.
    pub fn append(&mut self, record: &LogRecord) -> Result<()> {
        let frame = record.encode()?;

        if let Err(err) = self.write_and_sync(&frame) {
            if let Err(rollback) = self.file.set_len(self.len) {
                tracing::error!(
                    lsn = record.lsn(),
                    error = %rollback,
                    "Failed to roll back partial log append"
                );
            }
            return Err(err);
        }

        self.len += frame.len() as u64;
        Ok(())
    }

    /// Force sync to disk
    pub fn sync(&mut self) -> Result<()> {
        match self.sync_mode {
            LogSyncMode::SyncAll => self.file.sync_all()?,
            LogSyncMode::SyncData => self.file.sync_data()?,
        }
        Ok(())
    }

    /// Bytes of fully written frames
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn write_and_sync(&mut self, frame: &[u8]) -> Result<()> {
        self.file.write_all(frame)?;
        failpoint::maybe_fail(failpoint::LOG_SYNC)?;
        self.sync()
    }
}
