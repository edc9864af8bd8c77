//! Disk Manager - a page store backed by a single file.
//!
//! The [`DiskManager`] handles all direct file operations:
//! - Reading and writing checksummed pages
//! - Allocating new pages, reusing deleted ones first
//! - Marking deleted pages free on disk

use std::collections::BTreeSet;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use tracing::debug;

use crate::common::config::{MAX_PAGES, PAGE_SIZE};
use crate::common::{Error, PageId, Result};
use crate::storage::page::{Page, PageHeader, PageType};
use crate::storage::PageStore;

/// Manages disk I/O for a single file of pages.
///
/// # File Layout
/// Pages are laid out sequentially:
/// ```text
/// ┌─────────┬─────────┬─────────┬─────────┬─────────┐
/// │ Page 0  │ Page 1  │ Page 2  │  ...    │ Page N  │
/// │ (4KB)   │ (4KB)   │ (4KB)   │         │ (4KB)   │
/// └─────────┴─────────┴─────────┴─────────┴─────────┘
/// Offset:  0      4096     8192    ...    N×4096
/// ```
///
/// Every page carries a [`PageHeader`]. Deleted pages stay in place with
/// [`PageType::Free`] and are handed out again by `allocate_page`, lowest
/// page number first.
///
/// # Durability
/// All writes are followed by `fsync()`.
pub struct DiskManager {
    file: File,
    name: String,
    /// Number of page slots in the file, live or free.
    page_count: u32,
    free_pages: BTreeSet<PageId>,
}

impl DiskManager {
    /// Create a new page file.
    ///
    /// # Errors
    /// Returns an error if the file already exists or cannot be created.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(&path)?;

        Ok(Self {
            file,
            name: path.as_ref().display().to_string(),
            page_count: 0,
            free_pages: BTreeSet::new(),
        })
    }

    /// Open an existing page file and rebuild its free list.
    ///
    /// # Errors
    /// Returns an error if the file doesn't exist or cannot be opened.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = OpenOptions::new().read(true).write(true).open(&path)?;
        let name = path.as_ref().display().to_string();
        let page_count = match u32::try_from(file.metadata()?.len() / PAGE_SIZE as u64) {
            Ok(n) if n <= MAX_PAGES => n,
            _ => {
                return Err(Error::FileFull {
                    file: name,
                    max_pages: MAX_PAGES,
                })
            }
        };

        let mut dm = Self {
            file,
            name,
            page_count,
            free_pages: BTreeSet::new(),
        };

        let mut header = [0u8; PageHeader::SIZE];
        for n in 0..page_count {
            let page_no = PageId::new(n);
            dm.file.seek(SeekFrom::Start(page_no.offset(PAGE_SIZE)))?;
            dm.file.read_exact(&mut header)?;
            if PageHeader::from_bytes(&header).page_type == PageType::Free {
                dm.free_pages.insert(page_no);
            }
        }

        debug!(
            file = %dm.name,
            pages = page_count,
            free = dm.free_pages.len(),
            "opened page file"
        );
        Ok(dm)
    }

    /// Open an existing page file, or create if it doesn't exist.
    pub fn open_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::open(path)
        } else {
            Self::create(path)
        }
    }

    /// Number of page slots in the file, including free ones.
    #[inline]
    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    /// Number of deleted pages waiting for reuse.
    #[inline]
    pub fn free_page_count(&self) -> usize {
        self.free_pages.len()
    }

    /// Get the total size of the file in bytes.
    #[inline]
    pub fn file_size(&self) -> u64 {
        PageId::new(self.page_count).offset(PAGE_SIZE)
    }

    fn is_live(&self, page_no: PageId) -> bool {
        page_no.0 < self.page_count && !self.free_pages.contains(&page_no)
    }

    fn check_live(&self, page_no: PageId) -> Result<()> {
        if self.is_live(page_no) {
            Ok(())
        } else {
            Err(Error::PageNotFound {
                file: self.name.clone(),
                page_no,
            })
        }
    }

    /// Stamp the checksum into a copy of `page` and write it at its slot.
    fn write_slot(&mut self, page: &Page) -> Result<()> {
        let mut buf = Page::new();
        buf.copy_from(page);
        buf.update_checksum();

        self.file
            .seek(SeekFrom::Start(page.page_no().offset(PAGE_SIZE)))?;
        self.file.write_all(buf.as_slice())?;
        self.file.sync_all()?;
        Ok(())
    }
}

impl PageStore for DiskManager {
    fn read_page(&mut self, page_no: PageId) -> Result<Page> {
        self.check_live(page_no)?;

        self.file.seek(SeekFrom::Start(page_no.offset(PAGE_SIZE)))?;
        let mut page = Page::new();
        self.file.read_exact(page.as_mut_slice())?;

        if !page.verify_checksum() {
            return Err(Error::ChecksumMismatch {
                file: self.name.clone(),
                page_no,
            });
        }
        Ok(page)
    }

    fn write_page(&mut self, page: &Page) -> Result<()> {
        self.check_live(page.page_no())?;
        self.write_slot(page)
    }

    fn allocate_page(&mut self) -> Result<(PageId, Page)> {
        let page_no = match self.free_pages.pop_first() {
            Some(page_no) => page_no,
            None if self.page_count < MAX_PAGES => PageId::new(self.page_count),
            None => {
                return Err(Error::FileFull {
                    file: self.name.clone(),
                    max_pages: MAX_PAGES,
                })
            }
        };

        let page = Page::with_page_no(page_no);
        if let Err(e) = self.write_slot(&page) {
            if page_no.0 < self.page_count {
                self.free_pages.insert(page_no);
            }
            return Err(e);
        }

        if page_no.0 == self.page_count {
            self.page_count += 1;
        }
        Ok((page_no, page))
    }

    fn delete_page(&mut self, page_no: PageId) -> Result<()> {
        self.check_live(page_no)?;

        let mut page = Page::new();
        page.set_header(&PageHeader::new(page_no, PageType::Free));
        self.write_slot(&page)?;

        self.free_pages.insert(page_no);
        Ok(())
    }

    fn filename(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_create_new_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.db");

        let dm = DiskManager::create(&path).unwrap();
        assert_eq!(dm.page_count(), 0);
        assert_eq!(dm.file_size(), 0);
        assert!(dm.filename().ends_with("test.db"));
    }

    #[test]
    fn test_create_existing_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.db");

        DiskManager::create(&path).unwrap();
        assert!(DiskManager::create(&path).is_err());
    }

    #[test]
    fn test_open_nonexistent_fails() {
        let dir = tempdir().unwrap();
        assert!(DiskManager::open(dir.path().join("nonexistent.db")).is_err());
    }

    #[test]
    fn test_allocate_and_read_page() {
        let dir = tempdir().unwrap();
        let mut dm = DiskManager::create(dir.path().join("test.db")).unwrap();

        let (page_no, page) = dm.allocate_page().unwrap();
        assert_eq!(page_no, PageId::new(0));
        assert_eq!(page.page_no(), page_no);
        assert_eq!(dm.page_count(), 1);

        let read = dm.read_page(page_no).unwrap();
        assert_eq!(read.page_no(), page_no);
        assert!(read.data().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_write_and_read_page() {
        let dir = tempdir().unwrap();
        let mut dm = DiskManager::create(dir.path().join("test.db")).unwrap();
        let (page_no, mut page) = dm.allocate_page().unwrap();

        page.data_mut()[0] = 0xAB;
        page.data_mut()[4000] = 0xEF;
        dm.write_page(&page).unwrap();

        let read = dm.read_page(page_no).unwrap();
        assert_eq!(read.data()[0], 0xAB);
        assert_eq!(read.data()[4000], 0xEF);
    }

    #[test]
    fn test_persistence() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.db");

        {
            let mut dm = DiskManager::create(&path).unwrap();
            let (_, mut page) = dm.allocate_page().unwrap();
            page.data_mut()[0] = 0x42;
            dm.write_page(&page).unwrap();
        }

        {
            let mut dm = DiskManager::open(&path).unwrap();
            assert_eq!(dm.page_count(), 1);
            assert_eq!(dm.read_page(PageId::new(0)).unwrap().data()[0], 0x42);
        }
    }

    #[test]
    fn test_read_and_write_missing_page() {
        let dir = tempdir().unwrap();
        let mut dm = DiskManager::create(dir.path().join("test.db")).unwrap();
        dm.allocate_page().unwrap();

        assert!(matches!(
            dm.read_page(PageId::new(1)),
            Err(Error::PageNotFound { .. })
        ));
        assert!(dm.write_page(&Page::with_page_no(PageId::new(1))).is_err());
    }

    #[test]
    fn test_delete_then_reuse() {
        let dir = tempdir().unwrap();
        let mut dm = DiskManager::create(dir.path().join("test.db")).unwrap();
        for _ in 0..3 {
            dm.allocate_page().unwrap();
        }

        dm.delete_page(PageId::new(1)).unwrap();
        assert_eq!(dm.free_page_count(), 1);
        assert!(dm.read_page(PageId::new(1)).is_err());
        assert!(dm.delete_page(PageId::new(1)).is_err());

        let (reused, _) = dm.allocate_page().unwrap();
        assert_eq!(reused, PageId::new(1));
        assert_eq!(dm.page_count(), 3);

        let (fresh, _) = dm.allocate_page().unwrap();
        assert_eq!(fresh, PageId::new(3));
    }

    #[test]
    fn test_full_file_still_reuses_free_pages() {
        let dir = tempdir().unwrap();
        let mut dm = DiskManager::create(dir.path().join("test.db")).unwrap();
        for _ in 0..2 {
            dm.allocate_page().unwrap();
        }
        dm.delete_page(PageId::new(0)).unwrap();
        dm.page_count = MAX_PAGES;

        let (reused, _) = dm.allocate_page().unwrap();
        assert_eq!(reused, PageId::new(0));
        assert!(matches!(dm.allocate_page(), Err(Error::FileFull { .. })));
        assert_eq!(dm.page_count(), MAX_PAGES);
    }

    #[test]
    fn test_free_list_survives_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.db");

        {
            let mut dm = DiskManager::create(&path).unwrap();
            for _ in 0..4 {
                dm.allocate_page().unwrap();
            }
            dm.delete_page(PageId::new(2)).unwrap();
        }

        let mut dm = DiskManager::open_or_create(&path).unwrap();
        assert_eq!(dm.page_count(), 4);
        assert_eq!(dm.free_page_count(), 1);
        assert_eq!(dm.allocate_page().unwrap().0, PageId::new(2));
    }

    #[test]
    fn test_corruption_is_detected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.db");

        {
            let mut dm = DiskManager::create(&path).unwrap();
            dm.allocate_page().unwrap();
        }

        {
            let mut file = OpenOptions::new().write(true).open(&path).unwrap();
            file.seek(SeekFrom::Start(100)).unwrap();
            file.write_all(&[0xFF]).unwrap();
        }

        let mut dm = DiskManager::open(&path).unwrap();
        assert!(matches!(
            dm.read_page(PageId::new(0)),
            Err(Error::ChecksumMismatch { .. })
        ));
    }
}
