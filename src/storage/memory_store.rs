//! In-memory page store.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::common::config::MAX_PAGES;
use crate::common::{Error, PageId, Result};
use crate::storage::page::Page;
use crate::storage::PageStore;

/// I/O counters shared between a [`MemoryPageStore`] and whoever holds a clone
/// of its `Arc<IoCounters>`.
///
/// The store is moved into a [`FileHandle`](super::FileHandle), so tests grab
/// the counters first and use them to prove how much I/O the buffer pool did.
#[derive(Debug, Default)]
pub struct IoCounters {
    pub reads: AtomicU64,
    pub writes: AtomicU64,
    pub allocations: AtomicU64,
    pub deletes: AtomicU64,
}

impl IoCounters {
    pub fn snapshot(&self) -> IoSnapshot {
        IoSnapshot {
            reads: self.reads.load(Ordering::Relaxed),
            writes: self.writes.load(Ordering::Relaxed),
            allocations: self.allocations.load(Ordering::Relaxed),
            deletes: self.deletes.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time copy of [`IoCounters`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IoSnapshot {
    pub reads: u64,
    pub writes: u64,
    pub allocations: u64,
    pub deletes: u64,
}

impl fmt::Display for IoSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "IO {{ reads: {}, writes: {}, allocations: {}, deletes: {} }}",
            self.reads, self.writes, self.allocations, self.deletes
        )
    }
}

/// A page store that keeps every page in memory.
///
/// Page numbers are handed out sequentially and never reused, so a deleted
/// page number stays dead for the lifetime of the store.
pub struct MemoryPageStore {
    name: String,
    pages: BTreeMap<PageId, Box<Page>>,
    next_page_no: u32,
    counters: Arc<IoCounters>,
}

impl MemoryPageStore {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pages: BTreeMap::new(),
            next_page_no: 0,
            counters: Arc::new(IoCounters::default()),
        }
    }

    /// Shared handle to this store's I/O counters.
    pub fn counters(&self) -> Arc<IoCounters> {
        Arc::clone(&self.counters)
    }

    /// Number of live pages.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn not_found(&self, page_no: PageId) -> Error {
        Error::PageNotFound {
            file: self.name.clone(),
            page_no,
        }
    }
}

impl PageStore for MemoryPageStore {
    fn read_page(&mut self, page_no: PageId) -> Result<Page> {
        let stored = self.pages.get(&page_no).ok_or_else(|| self.not_found(page_no))?;
        let mut page = Page::new();
        page.copy_from(stored);
        self.counters.reads.fetch_add(1, Ordering::Relaxed);
        Ok(page)
    }

    fn write_page(&mut self, page: &Page) -> Result<()> {
        let page_no = page.page_no();
        match self.pages.get_mut(&page_no) {
            Some(stored) => stored.copy_from(page),
            None => return Err(self.not_found(page_no)),
        }
        self.counters.writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn allocate_page(&mut self) -> Result<(PageId, Page)> {
        if self.next_page_no >= MAX_PAGES {
            return Err(Error::FileFull {
                file: self.name.clone(),
                max_pages: MAX_PAGES,
            });
        }
        let page_no = PageId::new(self.next_page_no);
        self.next_page_no += 1;

        self.pages
            .insert(page_no, Box::new(Page::with_page_no(page_no)));
        self.counters.allocations.fetch_add(1, Ordering::Relaxed);
        Ok((page_no, Page::with_page_no(page_no)))
    }

    fn delete_page(&mut self, page_no: PageId) -> Result<()> {
        if self.pages.remove(&page_no).is_none() {
            return Err(self.not_found(page_no));
        }
        self.counters.deletes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn filename(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_read_write() {
        let mut store = MemoryPageStore::new("mem");
        let (p0, page) = store.allocate_page().unwrap();
        assert_eq!(p0, PageId::new(0));
        assert_eq!(page.page_no(), p0);

        let mut page = store.read_page(p0).unwrap();
        page.data_mut()[0] = 0x42;
        store.write_page(&page).unwrap();

        assert_eq!(store.read_page(p0).unwrap().data()[0], 0x42);
        assert_eq!(
            store.counters().snapshot(),
            IoSnapshot {
                reads: 2,
                writes: 1,
                allocations: 1,
                deletes: 0
            }
        );
    }

    #[test]
    fn test_missing_pages() {
        let mut store = MemoryPageStore::new("mem");
        assert!(matches!(
            store.read_page(PageId::new(3)),
            Err(Error::PageNotFound { .. })
        ));
        assert!(store.delete_page(PageId::new(3)).is_err());
        assert!(store.write_page(&Page::with_page_no(PageId::new(3))).is_err());
        assert_eq!(store.counters().snapshot(), IoSnapshot::default());
    }

    #[test]
    fn test_allocate_stops_at_max_pages() {
        let mut store = MemoryPageStore::new("mem");
        store.next_page_no = MAX_PAGES - 1;

        let (last, _) = store.allocate_page().unwrap();
        assert_eq!(last, PageId::new(MAX_PAGES - 1));
        assert!(last.is_valid());

        assert!(matches!(
            store.allocate_page(),
            Err(Error::FileFull { .. })
        ));
        assert_eq!(store.page_count(), 1);
        assert_eq!(store.counters().snapshot().allocations, 1);
    }

    #[test]
    fn test_deleted_numbers_are_not_reused() {
        let mut store = MemoryPageStore::new("mem");
        let (p0, _) = store.allocate_page().unwrap();
        store.delete_page(p0).unwrap();
        assert!(store.read_page(p0).is_err());

        let (p1, _) = store.allocate_page().unwrap();
        assert_eq!(p1, PageId::new(1));
        assert_eq!(store.page_count(), 1);
    }
}
