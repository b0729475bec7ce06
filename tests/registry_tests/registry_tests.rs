//! Tests for TransactionRegistry
//!
//! These tests verify:
//! - Ids are issued once, in increasing order, from the seeded value
//! - Status moves Active → Committed and never back
//! - The right error for unknown and non-active transactions

use pagewal::registry::{TransactionRegistry, TransactionStatus};
use pagewal::WalError;

#[test]
fn test_begin_issues_increasing_ids() {
    let mut registry = TransactionRegistry::new(1000);

    let a = registry.begin();
    let b = registry.begin();
    let c = registry.begin();

    assert_eq!((a, b, c), (1000, 1001, 1002));
    assert_eq!(registry.next_transaction_id(), 1003);
    assert_eq!(registry.active_count(), 3);
}

#[test]
fn test_new_transaction_is_active() {
    let mut registry = TransactionRegistry::new(1);
    let taid = registry.begin();

    assert_eq!(registry.status(taid), Some(TransactionStatus::Active));
    assert!(registry.ensure_active(taid).is_ok());
    assert!(!registry.is_committed(taid));
}

#[test]
fn test_commit_transitions_once() {
    let mut registry = TransactionRegistry::new(1);
    let taid = registry.begin();

    assert!(registry.mark_committed(taid).unwrap());
    assert!(!registry.mark_committed(taid).unwrap());

    assert_eq!(registry.status(taid), Some(TransactionStatus::Committed));
    assert_eq!(registry.active_count(), 0);
}

#[test]
fn test_committed_transaction_is_not_active() {
    let mut registry = TransactionRegistry::new(1);
    let taid = registry.begin();
    registry.mark_committed(taid).unwrap();

    let result = registry.ensure_active(taid);

    assert!(matches!(result, Err(WalError::InvalidTransaction(id)) if id == taid));
}

#[test]
fn test_unknown_transaction_errors() {
    let mut registry = TransactionRegistry::new(1000);

    assert!(matches!(registry.ensure_active(42), Err(WalError::InvalidTransaction(42))));
    assert!(matches!(registry.ensure_known(42), Err(WalError::UnknownTransaction(42))));
    assert!(matches!(registry.mark_committed(42), Err(WalError::UnknownTransaction(42))));
    assert_eq!(registry.status(42), None);
}
