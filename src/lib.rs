//! # pagewal
//!
//! A minimal write-ahead-logged page store with:
//! - Durable, checksummed log records forced to disk before every acknowledgement
//! - Transaction begin/write/commit with a commit-only flush policy (no steal)
//! - An in-memory page buffer flushed opportunistically past a soft capacity
//! - Redo-only crash recovery driven entirely by the log
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   PersistenceManager                         │
//! │        (begin / write / commit, one critical section)        │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┼─────────────────┐
//!          │            │                 │
//!          ▼            ▼                 ▼
//!   ┌─────────────┐ ┌──────────┐  ┌─────────────┐
//!   │ LogManager  │ │ Registry │  │ PageBuffer  │
//!   │  (Append)   │ │ (Status) │  │  (Pending)  │
//!   └─────────────┘ └──────────┘  └──────┬──────┘
//!                                        │ committed only
//!                                        ▼
//!                                 ┌─────────────┐
//!                                 │  PageStore  │◄── RecoveryManager
//!                                 │ (page files)│    (redo from log)
//!                                 └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;
pub mod failpoint;

pub mod wal;
pub mod registry;
pub mod buffer;
pub mod storage;
pub mod recovery;
pub mod persistence;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{WalError, Result};
pub use config::{Config, LogSyncMode};
pub use persistence::{FlushStats, PersistenceManager};
pub use recovery::{RecoveryManager, RecoveryReport};
pub use registry::TransactionStatus;

// =============================================================================
// Identifiers
// =============================================================================

/// Log Sequence Number - strictly increasing across the whole log
pub type Lsn = u64;

/// Transaction identifier, issued by `begin_transaction`
pub type TransactionId = u64;

/// Page identifier; each page maps to one page file
pub type PageId = u64;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of pagewal
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
