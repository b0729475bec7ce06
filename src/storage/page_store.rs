//! Page Store
//!
//! Reads and replaces page files in the page directory.
//!
//! ## Responsibilities
//! - Own the one naming scheme used by both flushing and recovery
//! - Read a page's persisted LSN and payload
//! - Replace a page file atomically
//! - List the pages present on disk

use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::failpoint;
use crate::{Lsn, PageId};

use super::PersistedPage;

/// File-per-page durable storage
#[derive(Debug, Clone)]
pub struct PageStore {
    /// Directory where page files are stored
    dir: PathBuf,
}

impl PageStore {
    const PREFIX: &'static str = "page_";
    const EXTENSION: &'static str = "page";
    const TEMP_EXTENSION: &'static str = "tmp";

    /// Open the page directory, creating it if missing
    ///
    /// Temp files left by a crash mid-write are deleted; the page file they
    /// were meant to replace still holds its previous state.
    pub fn open(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)?;
        let store = Self {
            dir: dir.to_path_buf(),
        };
        store.remove_stray_temp_files()?;
        Ok(store)
    }

    /// Read a page, `None` if it has never been persisted
    pub fn read(&self, page_id: PageId) -> Result<Option<PersistedPage>> {
        match fs::read_to_string(self.page_path(page_id)) {
            Ok(contents) => Ok(Some(PersistedPage::parse(page_id, &contents)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// The LSN a page currently holds, `None` if the file is absent
    pub fn persisted_lsn(&self, page_id: PageId) -> Result<Option<Lsn>> {
        Ok(self.read(page_id)?.map(|page| page.lsn))
    }

    /// Replace a page's full state
    ///
    /// Write-then-rename: the page file always holds either the previous or
    /// the new state, never a mix. On failure the temp file is removed.
    pub fn write(&self, page_id: PageId, page: &PersistedPage) -> Result<()> {
        let path = self.page_path(page_id);
        let temp_path = path.with_extension(Self::TEMP_EXTENSION);

        let result = self.replace_via(&temp_path, &path, page);
        if result.is_err() {
            if let Err(err) = fs::remove_file(&temp_path) {
                if err.kind() != ErrorKind::NotFound {
                    tracing::warn!(path = %temp_path.display(), error = %err, "Could not remove temp page file");
                }
            }
        }
        result
    }

    fn replace_via(&self, temp_path: &Path, path: &Path, page: &PersistedPage) -> Result<()> {
        let mut file = File::create(temp_path)?;
        file.write_all(page.encode().as_bytes())?;
        file.sync_all()?;
        drop(file);

        failpoint::maybe_fail(failpoint::PAGE_RENAME)?;
        fs::rename(temp_path, path)?;
        self.sync_directory()
    }

    fn remove_stray_temp_files(&self) -> Result<()> {
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            let is_temp = path.extension().and_then(|ext| ext.to_str()) == Some(Self::TEMP_EXTENSION);
            if is_temp && path.is_file() {
                tracing::debug!(path = %path.display(), "Removing stray temp page file");
                fs::remove_file(&path)?;
            }
        }
        Ok(())
    }

    /// Page ids with a page file on disk, ascending
    pub fn page_ids(&self) -> Result<Vec<PageId>> {
        let mut ids = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.is_file() {
                if let Some(id) = Self::parse_page_id(&path) {
                    ids.push(id);
                }
            }
        }
        ids.sort_unstable();
        Ok(ids)
    }

    /// File path for a page id
    pub fn page_path(&self, page_id: PageId) -> PathBuf {
        self.dir
            .join(format!("{}{}.{}", Self::PREFIX, page_id, Self::EXTENSION))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Parse a page id from a file name
    /// "page_42.page" → Some(42)
    fn parse_page_id(path: &Path) -> Option<PageId> {
        if path.extension()? != Self::EXTENSION {
            return None;
        }
        let stem = path.file_stem()?.to_str()?;
        stem.strip_prefix(Self::PREFIX)?.parse().ok()
    }

    #[cfg(unix)]
    fn sync_directory(&self) -> Result<()> {
        File::open(&self.dir)?.sync_all()?;
        Ok(())
    }

    #[cfg(not(unix))]
    fn sync_directory(&self) -> Result<()> {
        Ok(())
    }
}
