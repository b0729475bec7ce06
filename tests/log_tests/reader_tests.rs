//! Tests for LogReader
//!
//! These tests verify:
//! - Reading a clean log, an empty log, and records in order
//! - Partial writes at the tail end the scan (was_truncated = true)
//! - A corrupt frame ends the scan and is counted
//! - Corruption with more log behind it is told apart from a damaged tail
//! - Verify mode and the iterator agree with read_all

use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use pagewal::config::LogSyncMode;
use pagewal::wal::{LogReader, LogRecord, LogWriter};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_log() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("test.log");
    (temp_dir, log_path)
}

/// Write `count` write records for transaction 1000 via LogWriter
fn write_records_via_writer(path: &PathBuf, count: u64) {
    let mut writer = LogWriter::open(path, LogSyncMode::SyncAll).unwrap();
    for lsn in 1..=count {
        writer
            .append(&LogRecord::write(lsn, 1000, lsn % 4, format!("payload{}", lsn)))
            .unwrap();
    }
}

/// Write raw frames directly to a file (for crafting corruption)
fn write_raw(path: &PathBuf, chunks: &[Vec<u8>]) {
    let mut file = File::create(path).unwrap();
    for chunk in chunks {
        file.write_all(chunk).unwrap();
    }
    file.sync_all().unwrap();
}

// =============================================================================
// Clean Log Tests
// =============================================================================

#[test]
fn test_read_empty_file() {
    let (_temp, log_path) = setup_temp_log();
    File::create(&log_path).unwrap();

    let (records, stats) = LogReader::read_all(&log_path).unwrap();

    assert!(records.is_empty());
    assert_eq!(stats.records_read, 0);
    assert_eq!(stats.last_lsn, 0);
    assert_eq!(stats.valid_len, 0);
    assert!(!stats.was_truncated);
}

#[test]
fn test_read_missing_file_is_error() {
    let (_temp, log_path) = setup_temp_log();

    assert!(LogReader::open(&log_path).is_err());
}

#[test]
fn test_read_records_in_order() {
    let (_temp, log_path) = setup_temp_log();
    write_records_via_writer(&log_path, 10);

    let (records, stats) = LogReader::read_all(&log_path).unwrap();

    assert_eq!(records.len(), 10);
    assert_eq!(stats.last_lsn, 10);
    assert_eq!(stats.max_transaction_id, 1000);
    for (i, record) in records.iter().enumerate() {
        assert_eq!(record.lsn(), (i + 1) as u64);
    }
}

#[test]
fn test_stats_track_max_transaction_across_shapes() {
    let (_temp, log_path) = setup_temp_log();
    {
        let mut writer = LogWriter::open(&log_path, LogSyncMode::SyncAll).unwrap();
        writer.append(&LogRecord::write(1, 1000, 1, "a")).unwrap();
        writer.append(&LogRecord::end_of_transaction(2, 1042)).unwrap();
        writer.append(&LogRecord::write(3, 1007, 2, "b")).unwrap();
    }

    let stats = LogReader::verify(&log_path).unwrap();

    assert_eq!(stats.max_transaction_id, 1042);
    assert_eq!(stats.last_lsn, 3);
}

// =============================================================================
// Partial Write Tests (was_truncated = true)
// =============================================================================

#[test]
fn test_partial_header_at_tail() {
    let (_temp, log_path) = setup_temp_log();
    let good = LogRecord::write(1, 1000, 1, "v").encode().unwrap();
    let good_len = good.len() as u64;

    write_raw(&log_path, &[good, vec![0u8; 8]]);

    let (records, stats) = LogReader::read_all(&log_path).unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(stats.records_corrupted, 0);
    assert_eq!(stats.valid_len, good_len);
    assert!(stats.was_truncated);
}

#[test]
fn test_partial_body_at_tail() {
    let (_temp, log_path) = setup_temp_log();
    let good = LogRecord::write(1, 1000, 1, "v").encode().unwrap();
    let mut torn = LogRecord::write(2, 1000, 2, "v2").encode().unwrap();
    torn.truncate(20);

    write_raw(&log_path, &[good, torn]);

    let (records, stats) = LogReader::read_all(&log_path).unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(stats.last_lsn, 1);
    assert!(stats.was_truncated);
    assert!(!stats.corruption_mid_log);
}

// =============================================================================
// Corruption Tests (CRC mismatch)
// =============================================================================

#[test]
fn test_corrupt_record_stops_scan() {
    let (_temp, log_path) = setup_temp_log();
    let first = LogRecord::write(1, 1000, 1, "a").encode().unwrap();
    let mut second = LogRecord::write(2, 1000, 1, "b").encode().unwrap();
    let third = LogRecord::end_of_transaction(3, 1000).encode().unwrap();
    if let Some(byte) = second.last_mut() {
        *byte ^= 0xFF;
    }

    write_raw(&log_path, &[first, second, third]);

    let (records, stats) = LogReader::read_all(&log_path).unwrap();

    // Nothing after the corrupt frame is trusted
    assert_eq!(records.len(), 1);
    assert_eq!(stats.records_corrupted, 1);
    assert_eq!(stats.last_lsn, 1);
    assert!(stats.was_truncated);
    assert!(stats.corruption_mid_log);
    assert!(!stats.has_torn_tail());
}

#[test]
fn test_corrupt_last_frame_is_torn_tail() {
    let (_temp, log_path) = setup_temp_log();
    let first = LogRecord::write(1, 1000, 1, "a").encode().unwrap();
    let mut second = LogRecord::write(2, 1000, 1, "b").encode().unwrap();
    if let Some(byte) = second.last_mut() {
        *byte ^= 0xFF;
    }
    let first_len = first.len() as u64;

    write_raw(&log_path, &[first, second]);

    let stats = LogReader::verify(&log_path).unwrap();

    assert_eq!(stats.records_read, 1);
    assert_eq!(stats.records_corrupted, 1);
    assert_eq!(stats.valid_len, first_len);
    assert!(!stats.corruption_mid_log);
    assert!(stats.has_torn_tail());
}

#[test]
fn test_bad_frame_length_with_data_behind_is_mid_log() {
    let (_temp, log_path) = setup_temp_log();
    let first = LogRecord::write(1, 1000, 1, "a").encode().unwrap();
    let mut second = LogRecord::write(2, 1000, 1, "b").encode().unwrap();
    // LEN field claims more than any record may hold
    second[12..16].copy_from_slice(&u32::MAX.to_le_bytes());

    write_raw(&log_path, &[first, second]);

    let stats = LogReader::verify(&log_path).unwrap();

    assert_eq!(stats.records_read, 1);
    assert_eq!(stats.records_corrupted, 1);
    assert!(stats.corruption_mid_log);
}

#[test]
fn test_corruption_at_first_record() {
    let (_temp, log_path) = setup_temp_log();
    let mut bytes = LogRecord::write(1, 1000, 1, "v").encode().unwrap();
    bytes[20] ^= 0xFF;

    write_raw(&log_path, &[bytes]);

    let (records, stats) = LogReader::read_all(&log_path).unwrap();

    assert!(records.is_empty());
    assert_eq!(stats.records_corrupted, 1);
    assert_eq!(stats.valid_len, 0);
    assert!(stats.was_truncated);
    assert!(stats.has_torn_tail());
}

// =============================================================================
// Verify / Iterator Consistency Tests
// =============================================================================

#[test]
fn test_verify_and_read_all_agree() {
    let (_temp, log_path) = setup_temp_log();
    write_records_via_writer(&log_path, 20);

    let (records, read_stats) = LogReader::read_all(&log_path).unwrap();
    let verify_stats = LogReader::verify(&log_path).unwrap();

    assert_eq!(records.len() as u64, read_stats.records_read);
    assert_eq!(read_stats, verify_stats);
}

#[test]
fn test_iterator_yields_all_records() {
    let (_temp, log_path) = setup_temp_log();
    write_records_via_writer(&log_path, 5);

    let mut iter = LogReader::open(&log_path).unwrap().records();
    let lsns: Vec<u64> = iter.by_ref().map(|r| r.unwrap().lsn()).collect();

    assert_eq!(lsns, vec![1, 2, 3, 4, 5]);
    assert_eq!(iter.stats().records_read, 5);
    assert!(iter.next().is_none());
}
