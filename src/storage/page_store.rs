//! The page store capability and the shared handle the buffer pool holds.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::common::{FileId, PageId, Result};
use crate::storage::page::Page;

/// Durable storage of fixed-size pages within one named file.
///
/// Implementations are interchangeable behind a [`FileHandle`]; the buffer
/// pool only ever goes through these five operations.
pub trait PageStore {
    /// Read page `page_no`.
    ///
    /// # Errors
    /// `Error::PageNotFound` if the page was never allocated or was deleted.
    fn read_page(&mut self, page_no: PageId) -> Result<Page>;

    /// Write a page back. The target is the page number in its header.
    fn write_page(&mut self, page: &Page) -> Result<()>;

    /// Durably reserve a new page and return its number and initial bytes.
    fn allocate_page(&mut self) -> Result<(PageId, Page)>;

    /// Durably remove page `page_no`.
    fn delete_page(&mut self, page_no: PageId) -> Result<()>;

    /// Name of the underlying file, used for diagnostics.
    fn filename(&self) -> &str;
}

/// A clonable handle to an open page store.
///
/// Clones share the same store and the same [`FileId`]; handles compare equal
/// exactly when they refer to the same open store. The buffer pool keys its
/// page table by `(handle.id(), page_no)` and keeps a clone in every frame
/// descriptor so evicted pages can be written back.
///
/// # Example
/// ```
/// use clockbuf::storage::{FileHandle, MemoryPageStore};
///
/// let file = FileHandle::new(MemoryPageStore::new("orders"));
/// let (page_no, _) = file.allocate_page().unwrap();
/// assert_eq!(file.read_page(page_no).unwrap().page_no(), page_no);
/// assert_eq!(file.filename(), "orders");
/// ```
#[derive(Clone)]
pub struct FileHandle {
    id: FileId,
    name: Arc<str>,
    store: Arc<Mutex<Box<dyn PageStore + Send>>>,
}

impl FileHandle {
    /// Wrap a store in a new handle with a fresh [`FileId`].
    pub fn new<S: PageStore + Send + 'static>(store: S) -> Self {
        let name: Arc<str> = Arc::from(store.filename());
        Self {
            id: FileId::next(),
            name,
            store: Arc::new(Mutex::new(Box::new(store))),
        }
    }

    #[inline]
    pub fn id(&self) -> FileId {
        self.id
    }

    #[inline]
    pub fn filename(&self) -> &str {
        &self.name
    }

    pub fn read_page(&self, page_no: PageId) -> Result<Page> {
        self.store.lock().read_page(page_no)
    }

    pub fn write_page(&self, page: &Page) -> Result<()> {
        self.store.lock().write_page(page)
    }

    pub fn allocate_page(&self) -> Result<(PageId, Page)> {
        self.store.lock().allocate_page()
    }

    pub fn delete_page(&self, page_no: PageId) -> Result<()> {
        self.store.lock().delete_page(page_no)
    }
}

impl PartialEq for FileHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for FileHandle {}

impl fmt::Debug for FileHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileHandle")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish()
    }
}

impl fmt::Display for FileHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
