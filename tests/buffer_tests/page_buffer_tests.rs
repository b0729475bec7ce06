//! PageBuffer Tests
//!
//! Tests verify:
//! - Install keeps one entry per page, newest write wins regardless of owner
//! - Soft capacity signalling
//! - Draining by predicate, in LSN order
//! - Reinstating a failed flush without clobbering newer writes

use pagewal::buffer::{BufferedPage, PageBuffer};

// =============================================================================
// Helper Functions
// =============================================================================

fn page(page_id: u64, lsn: u64, owner: u64) -> BufferedPage {
    BufferedPage {
        page_id,
        lsn,
        payload: format!("p{}-l{}", page_id, lsn),
        owner,
    }
}

// =============================================================================
// Install Tests
// =============================================================================

#[test]
fn test_new_buffer_is_empty() {
    let buffer = PageBuffer::new(5);

    assert!(buffer.is_empty());
    assert_eq!(buffer.len(), 0);
    assert_eq!(buffer.capacity(), 5);
    assert!(!buffer.is_over_capacity());
}

#[test]
fn test_install_and_get() {
    let mut buffer = PageBuffer::new(5);

    assert!(buffer.install(page(10, 1, 1000)).is_none());

    assert_eq!(buffer.get(10), Some(&page(10, 1, 1000)));
    assert_eq!(buffer.get(11), None);
}

#[test]
fn test_install_overwrites_regardless_of_owner() {
    let mut buffer = PageBuffer::new(5);
    buffer.install(page(10, 1, 1000));

    let displaced = buffer.install(page(10, 2, 1001));

    assert_eq!(displaced, Some(page(10, 1, 1000)));
    assert_eq!(buffer.len(), 1);
    assert_eq!(buffer.get(10).unwrap().owner, 1001);
    assert_eq!(buffer.get(10).unwrap().lsn, 2);
}

// =============================================================================
// Capacity Tests
// =============================================================================

#[test]
fn test_over_capacity_only_past_limit() {
    let mut buffer = PageBuffer::new(3);
    for id in 0..3 {
        buffer.install(page(id, id + 1, 1000));
    }
    assert!(!buffer.is_over_capacity());

    buffer.install(page(3, 4, 1000));
    assert!(buffer.is_over_capacity());
}

#[test]
fn test_rewriting_same_page_does_not_grow() {
    let mut buffer = PageBuffer::new(1);
    for lsn in 1..=10 {
        buffer.install(page(7, lsn, 1000));
    }

    assert_eq!(buffer.len(), 1);
    assert!(!buffer.is_over_capacity());
}

// =============================================================================
// Drain Tests
// =============================================================================

#[test]
fn test_drain_where_filters_and_orders_by_lsn() {
    let mut buffer = PageBuffer::new(10);
    buffer.install(page(1, 9, 1000));
    buffer.install(page(2, 3, 1001));
    buffer.install(page(3, 5, 1000));
    buffer.install(page(4, 1, 1000));

    let drained = buffer.drain_where(|p| p.owner == 1000);

    let lsns: Vec<u64> = drained.iter().map(|p| p.lsn).collect();
    assert_eq!(lsns, vec![1, 5, 9]);
    assert_eq!(buffer.page_ids(), vec![2]);
}

#[test]
fn test_drain_nothing_matches() {
    let mut buffer = PageBuffer::new(10);
    buffer.install(page(1, 1, 1000));

    assert!(buffer.drain_where(|_| false).is_empty());
    assert_eq!(buffer.len(), 1);
}

// =============================================================================
// Reinstate Tests
// =============================================================================

#[test]
fn test_reinstate_into_empty_slot() {
    let mut buffer = PageBuffer::new(10);
    buffer.install(page(1, 1, 1000));
    let drained = buffer.drain_where(|_| true);

    assert!(buffer.reinstate(drained[0].clone()));
    assert_eq!(buffer.get(1), Some(&page(1, 1, 1000)));
}

#[test]
fn test_reinstate_does_not_clobber_newer_write() {
    let mut buffer = PageBuffer::new(10);
    buffer.install(page(1, 5, 1001));

    assert!(!buffer.reinstate(page(1, 2, 1000)));
    assert_eq!(buffer.get(1).unwrap().lsn, 5);
}
