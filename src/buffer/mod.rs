//! Page Buffer Module
//!
//! In-memory staging area for page writes that have been logged but not
//! yet persisted to their page files.
//!
//! ## Responsibilities
//! - Hold the most recent pending write per page id
//! - Signal when the soft capacity is exceeded
//! - Hand out committed entries for flushing, oldest LSN first
//!
//! ## Data Structure Choice
//! Using a HashMap keyed by page id:
//! - One entry per page, later writes replace earlier ones
//! - Flush order is recovered by sorting the drained entries by LSN

mod table;

pub use table::PageBuffer;

use crate::{Lsn, PageId, TransactionId};

/// A pending page write held in memory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferedPage {
    pub page_id: PageId,

    /// LSN of the log record that produced this write
    pub lsn: Lsn,

    pub payload: String,

    /// Transaction that performed the write
    pub owner: TransactionId,
}
