//! Log Reader
//!
//! Handles reading records back from the log file.

use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::path::Path;

use crate::error::Result;
use crate::{Lsn, TransactionId};

use super::record::{FrameHeader, HEADER_SIZE};
use super::LogRecord;

/// Statistics gathered by a forward scan of the log
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanStats {
    /// Number of valid records read
    pub records_read: u64,

    /// Number of corrupt frames hit (the scan stops at the first one)
    pub records_corrupted: u64,

    /// Highest LSN among valid records (0 if none)
    pub last_lsn: Lsn,

    /// Highest transaction id among valid records (0 if none)
    pub max_transaction_id: TransactionId,

    /// Byte length of the valid prefix of the log
    pub valid_len: u64,

    /// Whether bytes after the valid prefix were found (torn or corrupt tail)
    pub was_truncated: bool,

    /// Whether a corrupt frame was followed by further bytes
    ///
    /// A crash can only tear the last frame. Damage with more log behind it
    /// means records after the damage exist but cannot be read, so the log
    /// must not be cut back or appended to.
    pub corruption_mid_log: bool,
}

impl ScanStats {
    /// True when the bytes after the valid prefix can be dropped safely:
    /// an incomplete or corrupt final frame, nothing behind it
    pub fn has_torn_tail(&self) -> bool {
        self.was_truncated && !self.corruption_mid_log
    }
}

/// Reads records from the log file
///
/// The scan stops at the first frame that is incomplete or fails its
/// checksum. If that frame is the last one in the file it is a torn tail;
/// if more bytes follow, `ScanStats::corruption_mid_log` is set.
pub struct LogReader {
    reader: BufReader<File>,
    file_len: u64,
    stats: ScanStats,
    done: bool,
}

impl LogReader {
    /// Open a log file for reading
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let file_len = file.metadata()?.len();
        Ok(Self {
            reader: BufReader::new(file),
            file_len,
            stats: ScanStats::default(),
            done: false,
        })
    }

    /// Read every valid record, in file order
    pub fn read_all(path: &Path) -> Result<(Vec<LogRecord>, ScanStats)> {
        let mut reader = Self::open(path)?;
        let mut records = Vec::new();
        while let Some(record) = reader.next_record()? {
            records.push(record);
        }
        Ok((records, reader.stats))
    }

    /// Scan the log without keeping the records
    pub fn verify(path: &Path) -> Result<ScanStats> {
        let mut reader = Self::open(path)?;
        while reader.next_record()?.is_some() {}
        Ok(reader.stats)
    }

    /// Read the next valid record, or `None` at the end of the valid prefix
    ///
    /// Only genuine I/O failures are returned as errors; torn and corrupt
    /// frames end the scan and are reported through [`LogReader::stats`].
    pub fn next_record(&mut self) -> Result<Option<LogRecord>> {
        if self.done {
            return Ok(None);
        }

        let mut header_buf = [0u8; HEADER_SIZE];
        match read_full(&mut self.reader, &mut header_buf)? {
            0 => return Ok(self.finish(false)),
            n if n < HEADER_SIZE => return Ok(self.finish(true)),
            _ => {}
        }

        let header = match FrameHeader::parse(&header_buf) {
            Ok(header) => header,
            Err(err) => {
                tracing::warn!(offset = self.stats.valid_len, error = %err, "Corrupt log frame header");
                // The frame length is unknown: any byte past the header counts as more log
                let frame_end = self.stats.valid_len + HEADER_SIZE as u64;
                return Ok(self.finish_corrupt(frame_end));
            }
        };

        let mut body = vec![0u8; header.body_len as usize];
        if read_full(&mut self.reader, &mut body)? < body.len() {
            return Ok(self.finish(true));
        }

        match header.decode_body(&body) {
            Ok(record) => {
                self.stats.records_read += 1;
                self.stats.last_lsn = self.stats.last_lsn.max(record.lsn());
                self.stats.max_transaction_id = self.stats.max_transaction_id.max(record.taid());
                self.stats.valid_len += (HEADER_SIZE + body.len()) as u64;
                Ok(Some(record))
            }
            Err(err) => {
                tracing::warn!(offset = self.stats.valid_len, error = %err, "Corrupt log record");
                let frame_end = self.stats.valid_len + (HEADER_SIZE + body.len()) as u64;
                Ok(self.finish_corrupt(frame_end))
            }
        }
    }

    /// Iterate over all valid records
    pub fn records(self) -> LogIterator {
        LogIterator { reader: self }
    }

    /// Statistics for the records read so far
    pub fn stats(&self) -> &ScanStats {
        &self.stats
    }

    fn finish(&mut self, truncated: bool) -> Option<LogRecord> {
        self.done = true;
        self.stats.was_truncated = truncated;
        None
    }

    fn finish_corrupt(&mut self, frame_end: u64) -> Option<LogRecord> {
        self.stats.records_corrupted += 1;
        self.stats.corruption_mid_log = self.file_len > frame_end;
        self.finish(true)
    }
}

/// Iterator over log records
pub struct LogIterator {
    reader: LogReader,
}

impl LogIterator {
    pub fn stats(&self) -> &ScanStats {
        self.reader.stats()
    }
}

impl Iterator for LogIterator {
    type Item = Result<LogRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.reader.next_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => None,
            Err(err) => {
                self.reader.done = true;
                Some(Err(err))
            }
        }
    }
}

/// Fill `buf` as far as the file allows, returning the bytes read
fn read_full(reader: &mut impl Read, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(filled)
}
