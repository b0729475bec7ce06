//! Persisted page record

use crate::error::{Result, WalError};
use crate::{Lsn, PageId};

/// Stable state of one page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedPage {
    /// LSN of the log record this state came from
    pub lsn: Lsn,
    pub payload: String,
}

impl PersistedPage {
    pub fn new(lsn: Lsn, payload: impl Into<String>) -> Self {
        Self {
            lsn,
            payload: payload.into(),
        }
    }

    /// Render as `LSN,PAYLOAD`
    pub fn encode(&self) -> String {
        format!("{},{}", self.lsn, self.payload)
    }

    /// Parse the contents of a page file
    pub fn parse(page_id: PageId, contents: &str) -> Result<Self> {
        let (lsn, payload) = contents.split_once(',').ok_or_else(|| WalError::PageCorruption {
            page_id,
            reason: "missing LSN separator".to_string(),
        })?;

        let lsn = lsn.trim().parse::<Lsn>().map_err(|e| WalError::PageCorruption {
            page_id,
            reason: format!("bad LSN {:?}: {}", lsn, e),
        })?;

        Ok(Self::new(lsn, payload))
    }
}
