//! Log record definitions
//!
//! Defines the two record shapes and their on-disk frame.

use bytes::{Buf, BufMut, BytesMut};
use serde::{Deserialize, Serialize};

use crate::error::{Result, WalError};
use crate::{Lsn, PageId, TransactionId};

/// Frame header: LSN (8) + CRC (4) + body length (4)
pub const HEADER_SIZE: usize = 16;

/// Largest body accepted when reading a frame back (16 MB)
pub const MAX_RECORD_SIZE: u32 = 16 * 1024 * 1024;

/// A single record in the log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogRecord {
    /// A page write performed by a transaction
    Write {
        lsn: Lsn,
        taid: TransactionId,
        page_id: PageId,
        payload: String,
    },

    /// End-of-transaction marker, written on commit
    EndOfTransaction { lsn: Lsn, taid: TransactionId },
}

impl LogRecord {
    pub fn write(lsn: Lsn, taid: TransactionId, page_id: PageId, payload: impl Into<String>) -> Self {
        LogRecord::Write {
            lsn,
            taid,
            page_id,
            payload: payload.into(),
        }
    }

    pub fn end_of_transaction(lsn: Lsn, taid: TransactionId) -> Self {
        LogRecord::EndOfTransaction { lsn, taid }
    }

    pub fn lsn(&self) -> Lsn {
        match self {
            LogRecord::Write { lsn, .. } | LogRecord::EndOfTransaction { lsn, .. } => *lsn,
        }
    }

    pub fn taid(&self) -> TransactionId {
        match self {
            LogRecord::Write { taid, .. } | LogRecord::EndOfTransaction { taid, .. } => *taid,
        }
    }

    pub fn is_end_of_transaction(&self) -> bool {
        matches!(self, LogRecord::EndOfTransaction { .. })
    }

    /// Encode the record as a complete frame (header + body)
    pub fn encode(&self) -> Result<Vec<u8>> {
        let body = bincode::serialize(self)?;
        if body.len() > MAX_RECORD_SIZE as usize {
            return Err(WalError::Serialization(format!(
                "Record body too large: {} bytes (max {})",
                body.len(),
                MAX_RECORD_SIZE
            )));
        }

        let lsn = self.lsn();
        let mut frame = BytesMut::with_capacity(HEADER_SIZE + body.len());
        frame.put_u64_le(lsn);
        frame.put_u32_le(checksum(lsn, &body));
        frame.put_u32_le(body.len() as u32);
        frame.put_slice(&body);

        Ok(frame.to_vec())
    }

    /// Decode a complete frame produced by [`LogRecord::encode`]
    pub fn decode(frame: &[u8]) -> Result<Self> {
        if frame.len() < HEADER_SIZE {
            return Err(WalError::LogCorruption(format!(
                "Incomplete header: expected {} bytes, got {}",
                HEADER_SIZE,
                frame.len()
            )));
        }

        let header = FrameHeader::parse(&frame[..HEADER_SIZE])?;
        let end = HEADER_SIZE + header.body_len as usize;
        if frame.len() < end {
            return Err(WalError::LogCorruption(format!(
                "Incomplete body: expected {} bytes, got {}",
                header.body_len,
                frame.len() - HEADER_SIZE
            )));
        }

        header.decode_body(&frame[HEADER_SIZE..end])
    }
}

/// Parsed frame header
#[derive(Debug, Clone, Copy)]
pub(crate) struct FrameHeader {
    pub lsn: Lsn,
    pub crc: u32,
    pub body_len: u32,
}

impl FrameHeader {
    /// Parse and sanity-check a header; `bytes` must be `HEADER_SIZE` long
    pub(crate) fn parse(mut bytes: &[u8]) -> Result<Self> {
        let lsn = bytes.get_u64_le();
        let crc = bytes.get_u32_le();
        let body_len = bytes.get_u32_le();

        if body_len > MAX_RECORD_SIZE {
            return Err(WalError::LogCorruption(format!(
                "Record at LSN {} claims {} bytes (max {})",
                lsn, body_len, MAX_RECORD_SIZE
            )));
        }

        Ok(Self { lsn, crc, body_len })
    }

    /// Verify the checksum and decode the body this header describes
    pub(crate) fn decode_body(&self, body: &[u8]) -> Result<LogRecord> {
        let actual = checksum(self.lsn, body);
        if actual != self.crc {
            return Err(WalError::LogCorruption(format!(
                "CRC mismatch at LSN {}: expected {:#010x}, got {:#010x}",
                self.lsn, self.crc, actual
            )));
        }

        let record: LogRecord = bincode::deserialize(body)
            .map_err(|e| WalError::LogCorruption(format!("Undecodable record body: {}", e)))?;

        if record.lsn() != self.lsn {
            return Err(WalError::LogCorruption(format!(
                "Header LSN {} does not match record LSN {}",
                self.lsn,
                record.lsn()
            )));
        }

        Ok(record)
    }
}

/// CRC32 over the LSN and the body
fn checksum(lsn: Lsn, body: &[u8]) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(&lsn.to_le_bytes());
    hasher.update(body);
    hasher.finalize()
}
