//! Configuration for pagewal
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

use crate::error::{Result, WalError};
use crate::TransactionId;

/// Main configuration for a pagewal instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Root directory for all data files
    /// Internal structure:
    ///   {data_dir}/
    ///     ├── wal.log          (write-ahead log)
    ///     └── pages/           (one file per page: page_<id>.page)
    pub data_dir: PathBuf,

    // -------------------------------------------------------------------------
    // Log Configuration
    // -------------------------------------------------------------------------
    /// How each appended record is forced to stable storage
    pub log_sync_mode: LogSyncMode,

    /// Lowest transaction id handed out on a fresh log
    pub first_transaction_id: TransactionId,

    // -------------------------------------------------------------------------
    // Buffer Configuration
    // -------------------------------------------------------------------------
    /// Soft limit on distinct buffered pages; exceeding it triggers a flush scan
    pub buffer_capacity: usize,
}

/// Log sync mode
///
/// Every append is forced before it returns; the mode only picks the syscall.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogSyncMode {
    /// `fsync` data and metadata after every record
    SyncAll,

    /// `fdatasync` after every record (skips metadata-only updates)
    SyncData,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./pagewal_data"),
            log_sync_mode: LogSyncMode::SyncAll,
            first_transaction_id: 1000,
            buffer_capacity: 5,
        }
    }
}

impl Config {
    const LOG_FILENAME: &'static str = "wal.log";
    const PAGE_DIR: &'static str = "pages";

    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Path of the write-ahead log
    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join(Self::LOG_FILENAME)
    }

    /// Directory holding the page files
    pub fn page_dir(&self) -> PathBuf {
        self.data_dir.join(Self::PAGE_DIR)
    }

    /// Reject settings the engine cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.buffer_capacity == 0 {
            return Err(WalError::Config(
                "buffer_capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the data directory (root for all storage)
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Set the log sync mode
    pub fn log_sync_mode(mut self, mode: LogSyncMode) -> Self {
        self.config.log_sync_mode = mode;
        self
    }

    /// Set the first transaction id used on a fresh log
    pub fn first_transaction_id(mut self, id: TransactionId) -> Self {
        self.config.first_transaction_id = id;
        self
    }

    /// Set the buffer's soft capacity (distinct pages)
    pub fn buffer_capacity(mut self, pages: usize) -> Self {
        self.config.buffer_capacity = pages;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
