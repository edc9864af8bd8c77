//! File identifier type.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

static NEXT_FILE_ID: AtomicU32 = AtomicU32::new(0);

/// Identifies an open file handle.
///
/// Each call to [`FileId::next`] hands out a fresh id, so two handles opened on
/// different stores never compare equal. Together with a [`PageId`](super::PageId)
/// it forms the key of the buffer pool's page table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(pub u32);

impl FileId {
    /// Allocate a process-unique file id.
    pub fn next() -> Self {
        FileId(NEXT_FILE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "File({})", self.0)
    }
}
