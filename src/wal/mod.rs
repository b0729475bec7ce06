//! Write-Ahead Log (WAL) Module
//!
//! Provides durability guarantees through append-only logging.
//!
//! ## Responsibilities
//! - Append a record, forced to disk, before any change is acknowledged
//! - CRC32 checksums for corruption detection
//! - Log Sequence Numbers (LSN) for ordering
//! - Recover LSN / transaction id counters from an existing log
//!
//! ## File Format
//! ```text
//! ┌─────────────────────────────────────────┐
//! │ Record 1                                │
//! │ ┌─────────┬─────────┬────────┬────────┐ │
//! │ │ LSN (8) │ CRC (4) │Len (4) │ Body   │ │
//! │ └─────────┴─────────┴────────┴────────┘ │
//! ├─────────────────────────────────────────┤
//! │ Record 2                                │
//! │ ┌─────────┬─────────┬────────┬────────┐ │
//! │ │ LSN (8) │ CRC (4) │Len (4) │ Body   │ │
//! │ └─────────┴─────────┴────────┴────────┘ │
//! └─────────────────────────────────────────┘
//! ```
//!
//! The body is a bincode-encoded [`LogRecord`]: either a page write or an
//! end-of-transaction marker. The CRC covers the LSN and the body.

mod record;
mod writer;
mod reader;
mod manager;

pub use record::{LogRecord, HEADER_SIZE, MAX_RECORD_SIZE};
pub use writer::LogWriter;
pub use reader::{LogIterator, LogReader, ScanStats};
pub use manager::LogManager;
