//! Page table - maps `(file, page number)` to the frame holding that page.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::common::{Error, FileId, FrameId, PageId, Result};
use crate::storage::FileHandle;

/// Associative index from resident pages to frames.
///
/// Holds at most one entry per `(file, page_no)`. Lookups of absent pages
/// return `None`; only `insert` and `remove` treat a wrong presence as an
/// error.
#[derive(Debug, Default)]
pub struct PageTable {
    map: HashMap<(FileId, PageId), FrameId>,
}

impl PageTable {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            map: HashMap::with_capacity(capacity),
        }
    }

    /// Map `(file, page_no)` to `frame_id`.
    ///
    /// # Errors
    /// `Error::DuplicateEntry` if the page is already mapped.
    pub fn insert(&mut self, file: &FileHandle, page_no: PageId, frame_id: FrameId) -> Result<()> {
        match self.map.entry((file.id(), page_no)) {
            Entry::Occupied(_) => Err(Error::DuplicateEntry {
                file: file.filename().to_string(),
                page_no,
            }),
            Entry::Vacant(slot) => {
                slot.insert(frame_id);
                Ok(())
            }
        }
    }

    /// Find the frame holding `(file, page_no)`, if any.
    #[inline]
    pub fn lookup(&self, file: &FileHandle, page_no: PageId) -> Option<FrameId> {
        self.map.get(&(file.id(), page_no)).copied()
    }

    /// Remove the mapping for `(file, page_no)` and return its frame.
    ///
    /// # Errors
    /// `Error::PageNotResident` if the page is not mapped.
    pub fn remove(&mut self, file: &FileHandle, page_no: PageId) -> Result<FrameId> {
        self.map
            .remove(&(file.id(), page_no))
            .ok_or_else(|| Error::PageNotResident {
                file: file.filename().to_string(),
                page_no,
            })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
