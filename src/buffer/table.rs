//! PageBuffer implementation
//!
//! HashMap-based buffer with a soft capacity.

use std::collections::HashMap;

use crate::PageId;

use super::BufferedPage;

/// In-memory map from page id to its latest pending write
pub struct PageBuffer {
    entries: HashMap<PageId, BufferedPage>,
    /// Soft limit: exceeding it asks for a flush scan, never rejects a write
    capacity: usize,
}

impl PageBuffer {
    /// Create an empty buffer with the given soft capacity
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            capacity,
        }
    }

    /// Install a write, replacing any entry for the same page regardless of
    /// its owner. Returns the displaced entry.
    pub fn install(&mut self, page: BufferedPage) -> Option<BufferedPage> {
        self.entries.insert(page.page_id, page)
    }

    pub fn get(&self, page_id: PageId) -> Option<&BufferedPage> {
        self.entries.get(&page_id)
    }

    /// True when more distinct pages are held than the capacity allows
    pub fn is_over_capacity(&self) -> bool {
        self.entries.len() > self.capacity
    }

    /// Remove every entry matching `pred`, returned in ascending LSN order
    pub fn drain_where<F>(&mut self, mut pred: F) -> Vec<BufferedPage>
    where
        F: FnMut(&BufferedPage) -> bool,
    {
        let ids: Vec<PageId> = self
            .entries
            .values()
            .filter(|page| pred(*page))
            .map(|page| page.page_id)
            .collect();

        let mut drained: Vec<BufferedPage> = ids
            .into_iter()
            .filter_map(|id| self.entries.remove(&id))
            .collect();
        drained.sort_by_key(|page| page.lsn);
        drained
    }

    /// Put back an entry whose flush failed
    ///
    /// Skipped if a newer write for the same page has been installed since.
    /// Returns whether the entry went back in.
    pub fn reinstate(&mut self, page: BufferedPage) -> bool {
        match self.entries.get(&page.page_id) {
            Some(current) if current.lsn >= page.lsn => false,
            _ => {
                self.entries.insert(page.page_id, page);
                true
            }
        }
    }

    /// Number of distinct buffered pages
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Page ids currently buffered, sorted
    pub fn page_ids(&self) -> Vec<PageId> {
        let mut ids: Vec<PageId> = self.entries.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}
