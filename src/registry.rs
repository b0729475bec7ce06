//! Transaction Registry
//!
//! Tracks transaction identity and status. The registry itself is not
//! synchronized; the persistence manager holds it inside its critical
//! section together with the log and the page buffer.

use std::collections::HashMap;

use crate::error::{Result, WalError};
use crate::TransactionId;

/// Status of a transaction. Moves forward only: Active → Committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionStatus {
    Active,
    Committed,
}

/// Issues transaction ids and records their status
#[derive(Debug)]
pub struct TransactionRegistry {
    next_id: TransactionId,
    statuses: HashMap<TransactionId, TransactionStatus>,
}

impl TransactionRegistry {
    /// Create a registry whose first issued id is `next_id`
    pub fn new(next_id: TransactionId) -> Self {
        Self {
            next_id,
            statuses: HashMap::new(),
        }
    }

    /// Allocate a fresh id and register it as Active
    pub fn begin(&mut self) -> TransactionId {
        let taid = self.next_id;
        self.next_id += 1;
        self.statuses.insert(taid, TransactionStatus::Active);
        taid
    }

    pub fn status(&self, taid: TransactionId) -> Option<TransactionStatus> {
        self.statuses.get(&taid).copied()
    }

    /// Fail with `InvalidTransaction` unless `taid` is known and Active
    pub fn ensure_active(&self, taid: TransactionId) -> Result<()> {
        match self.status(taid) {
            Some(TransactionStatus::Active) => Ok(()),
            _ => Err(WalError::InvalidTransaction(taid)),
        }
    }

    /// Fail with `UnknownTransaction` unless `taid` was issued by `begin`
    pub fn ensure_known(&self, taid: TransactionId) -> Result<TransactionStatus> {
        self.status(taid).ok_or(WalError::UnknownTransaction(taid))
    }

    /// Flip `taid` to Committed
    ///
    /// Returns `true` if this call performed the transition, `false` if the
    /// transaction was already committed.
    pub fn mark_committed(&mut self, taid: TransactionId) -> Result<bool> {
        let status = self
            .statuses
            .get_mut(&taid)
            .ok_or(WalError::UnknownTransaction(taid))?;

        let transitioned = *status == TransactionStatus::Active;
        *status = TransactionStatus::Committed;
        Ok(transitioned)
    }

    pub fn is_committed(&self, taid: TransactionId) -> bool {
        self.status(taid) == Some(TransactionStatus::Committed)
    }

    /// Number of transactions still Active
    pub fn active_count(&self) -> usize {
        self.statuses
            .values()
            .filter(|s| **s == TransactionStatus::Active)
            .count()
    }

    /// Id the next `begin` will return
    pub fn next_transaction_id(&self) -> TransactionId {
        self.next_id
    }
}
