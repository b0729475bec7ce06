//! Persistence Module
//!
//! The handle callers use to run transactions against the page store.
//!
//! ## Responsibilities
//! - Run recovery once on open, before accepting any call
//! - Log every write and commit durably before acknowledging it
//! - Buffer page writes and flush committed ones past the soft capacity
//! - Never let a page written by an uncommitted transaction reach disk

use std::fs;
use std::path::Path;

use parking_lot::Mutex;

use crate::buffer::{BufferedPage, PageBuffer};
use crate::config::Config;
use crate::error::Result;
use crate::recovery::{RecoveryManager, RecoveryReport};
use crate::registry::{TransactionRegistry, TransactionStatus};
use crate::storage::{PageStore, PersistedPage};
use crate::wal::LogManager;
use crate::{Lsn, PageId, TransactionId};

/// The transactional page store
///
/// ## Concurrency Model: one coarse critical section
///
/// `begin_transaction`, `write`, `commit` and the flush scan all run under
/// `inner`. That makes a write's log append and buffer install atomic with
/// respect to any flush scan, and keeps a flush from observing a commit
/// status whose end-of-transaction record is not yet durable.
///
/// The handle is `Send + Sync`; share it with `Arc` or scoped threads.
pub struct PersistenceManager {
    /// Configuration
    config: Config,

    /// Page files (stateless apart from the directory path)
    pages: PageStore,

    /// Log, registry and buffer behind a single lock
    inner: Mutex<Inner>,

    /// What recovery did when this handle was opened
    recovery: RecoveryReport,
}

struct Inner {
    log: LogManager,
    registry: TransactionRegistry,
    buffer: PageBuffer,
}

/// Outcome of a flush scan
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushStats {
    /// Committed pages written to their page files
    pub flushed: usize,

    /// Pages left buffered because their owner is still Active
    pub retained: usize,

    /// Committed pages whose write failed; they stay buffered
    pub failed: usize,
}

impl PersistenceManager {
    /// Open or create a store with the given config
    ///
    /// On startup:
    /// 1. Validate config, create the data and page directories
    /// 2. Run redo recovery from the log
    /// 3. Open the log, resuming LSN and transaction id counters
    /// 4. Ready to serve transactions
    pub fn open(config: Config) -> Result<Self> {
        // Step 1: Directories
        config.validate()?;
        fs::create_dir_all(&config.data_dir)?;
        let pages = PageStore::open(&config.page_dir())?;

        // Step 2: Recovery runs with exclusive access, before the log is reopened
        let recovery = RecoveryManager::new(&config)?.start_recovery()?;

        // Step 3: Log and counters, never behind an LSN already on a page
        let mut log = LogManager::open(
            &config.log_path(),
            config.log_sync_mode,
            config.first_transaction_id,
        )?;
        if let Some(page_lsn) = newest_page_lsn(&pages)? {
            log.reserve_past(page_lsn);
        }
        let registry = TransactionRegistry::new(log.next_transaction_id());
        let buffer = PageBuffer::new(config.buffer_capacity);

        tracing::info!(
            data_dir = %config.data_dir.display(),
            next_lsn = log.next_lsn(),
            next_transaction_id = registry.next_transaction_id(),
            "Persistence manager ready"
        );

        Ok(Self {
            config,
            pages,
            inner: Mutex::new(Inner {
                log,
                registry,
                buffer,
            }),
            recovery,
        })
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified data directory
    pub fn open_path(path: &Path) -> Result<Self> {
        Self::open(Config::builder().data_dir(path).build())
    }

    /// Begin a transaction
    ///
    /// The id is strictly greater than every id issued before, including
    /// ids recovered from the log of a previous run.
    pub fn begin_transaction(&self) -> TransactionId {
        let taid = self.inner.lock().registry.begin();
        tracing::debug!(taid, "Transaction started");
        taid
    }

    /// Write a page on behalf of an active transaction
    ///
    /// Steps:
    /// 1. Reject unknown or committed transactions (no side effects)
    /// 2. Append the write record to the log, forced to disk
    /// 3. Install the write in the page buffer
    /// 4. Flush committed pages if the buffer is over capacity
    ///
    /// Returns the LSN assigned to the write.
    pub fn write(&self, taid: TransactionId, page_id: PageId, payload: &str) -> Result<Lsn> {
        let mut inner = self.inner.lock();

        // Step 1: Validate
        inner.registry.ensure_active(taid)?;

        // Step 2: Log first (durability guarantee)
        let lsn = inner.log.append_write(taid, page_id, payload)?;

        // Step 3: Buffer
        inner.buffer.install(BufferedPage {
            page_id,
            lsn,
            payload: payload.to_string(),
            owner: taid,
        });
        tracing::debug!(taid, page_id, lsn, buffered = inner.buffer.len(), "Write logged");

        // Step 4: Opportunistic flush
        if inner.buffer.is_over_capacity() {
            self.flush_committed(&mut inner);
        }

        Ok(lsn)
    }

    /// Commit a transaction
    ///
    /// The end-of-transaction record is made durable before the status
    /// flips, so a failed append leaves the transaction Active. Buffered
    /// pages are not flushed here; they leave memory on a later flush scan.
    /// Committing an already committed transaction does nothing.
    pub fn commit(&self, taid: TransactionId) -> Result<()> {
        let mut inner = self.inner.lock();

        if inner.registry.ensure_known(taid)? == TransactionStatus::Committed {
            tracing::debug!(taid, "Transaction already committed");
            return Ok(());
        }

        let lsn = inner.log.append_end_of_transaction(taid)?;
        inner.registry.mark_committed(taid)?;
        tracing::debug!(taid, lsn, "Transaction committed");

        Ok(())
    }

    /// Run a flush scan now, regardless of buffer size
    pub fn flush(&self) -> FlushStats {
        let mut inner = self.inner.lock();
        self.flush_committed(&mut inner)
    }

    /// Close the store gracefully
    ///
    /// Flushes committed pages and syncs the log. Pages of still-active
    /// transactions are dropped; they were never committed.
    pub fn close(self) -> Result<()> {
        let mut inner = self.inner.lock();
        let stats = self.flush_committed(&mut inner);
        inner.log.sync()?;

        tracing::info!(
            flushed = stats.flushed,
            discarded = stats.retained,
            failed = stats.failed,
            "Persistence manager closed"
        );
        Ok(())
    }

    /// Flush scan (called with the lock held)
    ///
    /// Writes every buffered page whose owner is committed, oldest LSN first.
    /// A page whose write fails is logged and put back; the scan goes on.
    fn flush_committed(&self, inner: &mut Inner) -> FlushStats {
        let Inner {
            registry, buffer, ..
        } = inner;

        let committed = buffer.drain_where(|page| registry.is_committed(page.owner));
        let mut stats = FlushStats {
            retained: buffer.len(),
            ..FlushStats::default()
        };

        for page in committed {
            let persisted = PersistedPage::new(page.lsn, page.payload.as_str());
            match self.pages.write(page.page_id, &persisted) {
                Ok(()) => stats.flushed += 1,
                Err(err) => {
                    tracing::warn!(
                        page_id = page.page_id,
                        lsn = page.lsn,
                        error = %err,
                        "Page flush failed, keeping page buffered"
                    );
                    stats.failed += 1;
                    buffer.reinstate(page);
                }
            }
        }

        tracing::info!(
            flushed = stats.flushed,
            retained = stats.retained,
            failed = stats.failed,
            "Flush scan finished"
        );
        stats
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Status of a transaction issued by this handle
    pub fn transaction_status(&self, taid: TransactionId) -> Option<TransactionStatus> {
        self.inner.lock().registry.status(taid)
    }

    /// The pending write for a page, if one is buffered
    pub fn buffered_page(&self, page_id: PageId) -> Option<BufferedPage> {
        self.inner.lock().buffer.get(page_id).cloned()
    }

    /// Number of distinct buffered pages
    pub fn buffered_page_count(&self) -> usize {
        self.inner.lock().buffer.len()
    }

    /// Read a page's persisted state from disk
    pub fn read_page(&self, page_id: PageId) -> Result<Option<PersistedPage>> {
        self.pages.read(page_id)
    }

    /// LSN the next log record will receive
    pub fn next_lsn(&self) -> Lsn {
        self.inner.lock().log.next_lsn()
    }

    /// Id the next `begin_transaction` will return
    pub fn next_transaction_id(&self) -> TransactionId {
        self.inner.lock().registry.next_transaction_id()
    }

    /// What recovery did when this handle was opened
    pub fn recovery_report(&self) -> &RecoveryReport {
        &self.recovery
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the data directory path
    pub fn data_dir(&self) -> &Path {
        &self.config.data_dir
    }

    /// Get the page store
    pub fn page_store(&self) -> &PageStore {
        &self.pages
    }
}

/// Highest LSN carried by any readable page file
///
/// Unreadable pages are skipped; recovery has already reported them.
fn newest_page_lsn(pages: &PageStore) -> Result<Option<Lsn>> {
    let mut newest = None;
    for page_id in pages.page_ids()? {
        match pages.persisted_lsn(page_id) {
            Ok(Some(lsn)) => newest = newest.max(Some(lsn)),
            Ok(None) => {}
            Err(err) => {
                tracing::warn!(page_id, error = %err, "Skipping unreadable page while seeding LSN");
            }
        }
    }
    Ok(newest)
}
