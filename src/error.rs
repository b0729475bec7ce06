//! Error types for pagewal
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

use crate::{PageId, TransactionId};

/// Result type alias using WalError
pub type Result<T> = std::result::Result<T, WalError>;

/// Unified error type for pagewal operations
#[derive(Debug, Error)]
pub enum WalError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Transaction Errors
    // -------------------------------------------------------------------------
    #[error("Invalid transaction: {0} is unknown or no longer active")]
    InvalidTransaction(TransactionId),

    #[error("Unknown transaction: {0}")]
    UnknownTransaction(TransactionId),

    // -------------------------------------------------------------------------
    // Log Errors
    // -------------------------------------------------------------------------
    #[error("Log corruption detected: {0}")]
    LogCorruption(String),

    // -------------------------------------------------------------------------
    // Page Errors
    // -------------------------------------------------------------------------
    #[error("Page {page_id} is corrupted: {reason}")]
    PageCorruption { page_id: PageId, reason: String },

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl WalError {
    /// True for failures of the durable storage itself (log or page files),
    /// as opposed to caller mistakes like an unknown transaction.
    pub fn is_storage_failure(&self) -> bool {
        matches!(
            self,
            WalError::Io(_)
                | WalError::LogCorruption(_)
                | WalError::PageCorruption { .. }
                | WalError::Serialization(_)
        )
    }
}

impl From<bincode::Error> for WalError {
    fn from(err: bincode::Error) -> Self {
        WalError::Serialization(err.to_string())
    }
}
