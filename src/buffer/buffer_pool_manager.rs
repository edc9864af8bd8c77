//! Buffer Pool Manager - the core page caching layer.
//!
//! The [`BufferPoolManager`] provides:
//! - Page caching between page stores and memory
//! - Pin-based reference counting
//! - CLOCK replacement with write-back of dirty victims
//! - Per-file flush and page disposal

use tracing::{debug, warn};

use crate::buffer::dump::BufferDump;
use crate::buffer::frame::FrameDescriptor;
use crate::buffer::page_table::PageTable;
use crate::buffer::pool::BufferPool;
use crate::buffer::replacer::{ClockReplacer, Sweep};
use crate::buffer::BufferPoolStats;
use crate::common::config::{page_table_capacity, DEFAULT_POOL_SIZE};
use crate::common::{Error, FrameId, PageId, Result};
use crate::storage::page::{Page, PageHeader, PageType};
use crate::storage::FileHandle;

/// Manages a fixed pool of frames caching pages from any number of files.
///
/// # Architecture
/// ```text
/// ┌──────────────────────────────────────────────────────────────┐
/// │                     BufferPoolManager                        │
/// │  ┌────────────────┐   ┌───────────────────────────────────┐  │
/// │  │  page_table    │   │  descriptors: Vec<FrameDescriptor>│  │
/// │  │(file,page)→Fid │──▶│  [Desc0] [Desc1] [Desc2] ...      │  │
/// │  └────────────────┘   ├───────────────────────────────────┤  │
/// │  ┌────────────────┐   │  pool: BufferPool                 │  │
/// │  │   replacer     │   │  [Page0] [Page1] [Page2] ...      │  │
/// │  │ ClockReplacer  │   └───────────────────────────────────┘  │
/// │  └────────────────┘                                          │
/// └──────────────────────────────────────────────────────────────┘
/// ```
///
/// # Pin protocol
/// Every successful `read_page` or `allocate_page` pins the page once; the
/// caller must release it with exactly one `unpin_page`. A pinned page is
/// never evicted. The returned `&mut Page` borrows the manager, but the pin
/// outlives the borrow: the page stays resident until unpinned.
///
/// # Usage
/// ```
/// use clockbuf::storage::{FileHandle, MemoryPageStore};
/// use clockbuf::BufferPoolManager;
///
/// let file = FileHandle::new(MemoryPageStore::new("demo"));
/// let mut bpm = BufferPoolManager::new(4);
///
/// let (page_no, page) = bpm.allocate_page(&file).unwrap();
/// page.data_mut()[0] = 0xAB;
/// bpm.unpin_page(&file, page_no, true).unwrap();
///
/// let page = bpm.read_page(&file, page_no).unwrap();
/// assert_eq!(page.data()[0], 0xAB);
/// bpm.unpin_page(&file, page_no, false).unwrap();
///
/// bpm.flush_file(&file).unwrap();
/// ```
pub struct BufferPoolManager {
    /// One descriptor per frame, indexed by frame id.
    descriptors: Vec<FrameDescriptor>,

    /// Page bytes, indexed like `descriptors`.
    pool: BufferPool,

    /// Maps resident `(file, page_no)` pairs to frames.
    page_table: PageTable,

    /// Clock hand and sweep.
    replacer: ClockReplacer,

    stats: BufferPoolStats,

    /// Number of frames in the pool (immutable after construction).
    pool_size: usize,
}

impl BufferPoolManager {
    /// Create a buffer pool with `pool_size` empty frames.
    ///
    /// # Panics
    /// Panics if `pool_size` is 0.
    pub fn new(pool_size: usize) -> Self {
        assert!(pool_size > 0, "pool_size must be > 0");

        Self {
            descriptors: (0..pool_size)
                .map(|i| FrameDescriptor::new(FrameId::new(i)))
                .collect(),
            pool: BufferPool::new(pool_size),
            page_table: PageTable::with_capacity(page_table_capacity(pool_size)),
            replacer: ClockReplacer::new(pool_size),
            stats: BufferPoolStats::new(),
            pool_size,
        }
    }

    // ========================================================================
    // Public API: page access
    // ========================================================================

    /// Pin page `page_no` of `file`, loading it from the store on a miss.
    ///
    /// # Errors
    /// - `Error::NoFreeFrames` if every frame is pinned
    /// - `Error::PageNotFound` (or I/O errors) from the page store
    /// - Write-back errors if the evicted victim was dirty
    pub fn read_page(&mut self, file: &FileHandle, page_no: PageId) -> Result<&mut Page> {
        let frame_id = match self.page_table.lookup(file, page_no) {
            Some(frame_id) => {
                let pins = self.descriptors[frame_id.0].pin();
                BufferPoolStats::bump(&self.stats.cache_hits);
                debug!(file = %file, page = %page_no, frame = %frame_id, pins, "cache hit");
                frame_id
            }
            None => {
                BufferPoolStats::bump(&self.stats.cache_misses);
                let frame_id = self.allocate_frame()?;

                let page = file.read_page(page_no)?;
                BufferPoolStats::bump(&self.stats.pages_read);

                self.install(file, page_no, frame_id, &page)?;
                debug!(file = %file, page = %page_no, frame = %frame_id, "cache miss");
                frame_id
            }
        };

        Ok(self.pool.page_mut(frame_id))
    }

    /// Release one pin on page `page_no` of `file`.
    ///
    /// Passing `dirty = true` marks the page dirty until it is written back;
    /// passing `false` never clears an earlier dirty mark. Unpinning a page
    /// that is not resident does nothing.
    ///
    /// # Errors
    /// `Error::PageNotPinned` if the page is resident with a pin count of 0.
    pub fn unpin_page(&mut self, file: &FileHandle, page_no: PageId, dirty: bool) -> Result<()> {
        let Some(frame_id) = self.page_table.lookup(file, page_no) else {
            return Ok(());
        };

        let desc = &mut self.descriptors[frame_id.0];
        if desc.unpin().is_none() {
            warn!(file = %file, page = %page_no, frame = %frame_id, "unpin of unpinned page");
            return Err(Error::PageNotPinned {
                file: file.filename().to_string(),
                page_no,
                frame_id,
            });
        }

        if dirty {
            desc.mark_dirty();
        }
        Ok(())
    }

    /// Allocate a new page in `file` and pin it in the pool.
    ///
    /// Returns the new page number and the page bytes.
    ///
    /// # Errors
    /// - Errors from the page store's allocation
    /// - `Error::NoFreeFrames` if every frame is pinned; the page stays
    ///   allocated in the store
    pub fn allocate_page(&mut self, file: &FileHandle) -> Result<(PageId, &mut Page)> {
        let (page_no, page) = file.allocate_page()?;
        let frame_id = self.allocate_frame()?;

        self.install(file, page_no, frame_id, &page)?;
        BufferPoolStats::bump(&self.stats.allocations);
        debug!(file = %file, page = %page_no, frame = %frame_id, "allocated page");

        Ok((page_no, self.pool.page_mut(frame_id)))
    }

    /// Permanently delete page `page_no` from `file` and drop it from the pool.
    ///
    /// The store delete runs first; the frame is only freed once it has
    /// succeeded, so a failed delete leaves the pool untouched.
    ///
    /// # Errors
    /// - `Error::PageNotResident` if the page is not in the pool; the store
    ///   is not touched
    /// - `Error::PagePinned` if a caller still holds the page
    /// - Errors from the page store's delete
    pub fn dispose_page(&mut self, file: &FileHandle, page_no: PageId) -> Result<()> {
        let frame_id = self
            .page_table
            .lookup(file, page_no)
            .ok_or_else(|| Error::PageNotResident {
                file: file.filename().to_string(),
                page_no,
            })?;

        if self.descriptors[frame_id.0].is_pinned() {
            return Err(Error::PagePinned {
                file: file.filename().to_string(),
                page_no,
                frame_id,
            });
        }

        file.delete_page(page_no)?;

        self.page_table.remove(file, page_no)?;
        self.descriptors[frame_id.0].clear();
        BufferPoolStats::bump(&self.stats.disposals);
        debug!(file = %file, page = %page_no, frame = %frame_id, "disposed page");
        Ok(())
    }

    // ========================================================================
    // Public API: flushing
    // ========================================================================

    /// Write back every dirty page of `file` and evict all of its pages.
    ///
    /// Frames are scanned in order and the scan stops at the first error;
    /// frames before it have already been flushed and freed.
    ///
    /// # Errors
    /// - `Error::PagePinned` naming the first pinned page of the file
    /// - `Error::BadBuffer` if an invalid frame is still tied to the file
    /// - Write-back errors from the page store
    pub fn flush_file(&mut self, file: &FileHandle) -> Result<()> {
        let mut flushed = 0usize;

        for i in 0..self.pool_size {
            let frame_id = FrameId::new(i);
            let desc = &self.descriptors[i];
            if !desc.belongs_to(file) {
                continue;
            }

            let page_no = desc.page_no();
            if desc.is_pinned() {
                return Err(Error::PagePinned {
                    file: file.filename().to_string(),
                    page_no,
                    frame_id,
                });
            }
            if !desc.is_valid() {
                return Err(Error::BadBuffer {
                    frame_id,
                    dirty: desc.is_dirty(),
                    valid: desc.is_valid(),
                    ref_bit: desc.ref_bit(),
                });
            }

            if desc.is_dirty() {
                self.write_back(frame_id)?;
            }
            self.page_table.remove(file, page_no)?;
            self.descriptors[i].clear();
            flushed += 1;
        }

        debug!(file = %file, frames = flushed, "flushed file");
        Ok(())
    }

    /// Write back every dirty valid page, keeping all pages resident.
    ///
    /// # Errors
    /// Stops at the first failed write-back.
    pub fn flush_all_pages(&mut self) -> Result<()> {
        for i in 0..self.pool_size {
            let desc = &self.descriptors[i];
            if desc.is_valid() && desc.is_dirty() {
                self.write_back(FrameId::new(i))?;
            }
        }
        Ok(())
    }

    // ========================================================================
    // Public API: inspection
    // ========================================================================

    /// Borrow a resident page without pinning it.
    pub fn page(&self, file: &FileHandle, page_no: PageId) -> Option<&Page> {
        self.page_table
            .lookup(file, page_no)
            .map(|frame_id| self.pool.page(frame_id))
    }

    /// Frame currently holding page `page_no` of `file`.
    pub fn frame_of(&self, file: &FileHandle, page_no: PageId) -> Option<FrameId> {
        self.page_table.lookup(file, page_no)
    }

    /// Pin count of a resident page, or `None` if it is not in the pool.
    pub fn get_pin_count(&self, file: &FileHandle, page_no: PageId) -> Option<u32> {
        self.frame_of(file, page_no)
            .map(|frame_id| self.descriptors[frame_id.0].pin_count())
    }

    /// Whether a resident page is marked dirty.
    pub fn is_dirty(&self, file: &FileHandle, page_no: PageId) -> Option<bool> {
        self.frame_of(file, page_no)
            .map(|frame_id| self.descriptors[frame_id.0].is_dirty())
    }

    /// Snapshot of every frame descriptor.
    pub fn dump(&self) -> BufferDump {
        BufferDump::new(self.descriptors.iter().map(FrameDescriptor::state).collect())
    }

    /// Print [`dump`](Self::dump) to stdout.
    pub fn print_self(&self) {
        println!("{}", self.dump());
    }

    /// Check that the page table and the descriptor table agree: a frame is
    /// valid exactly when the page table maps its page to it, and only valid
    /// frames are pinned.
    pub fn is_consistent(&self) -> bool {
        let mut valid = 0;
        for desc in &self.descriptors {
            if !desc.is_valid() {
                if desc.is_pinned() {
                    return false;
                }
                continue;
            }

            valid += 1;
            let mapped = desc
                .file()
                .and_then(|file| self.page_table.lookup(file, desc.page_no()));
            if mapped != Some(desc.frame_id()) {
                return false;
            }
        }
        valid == self.page_table.len()
    }

    pub fn stats(&self) -> &BufferPoolStats {
        &self.stats
    }

    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    /// Number of frames holding a page.
    pub fn valid_frame_count(&self) -> usize {
        self.page_table.len()
    }

    /// Frame the next clock sweep inspects first.
    pub fn clock_hand(&self) -> FrameId {
        self.replacer.hand()
    }

    // ========================================================================
    // Internal: frame allocation and eviction
    // ========================================================================

    /// Obtain an empty frame, evicting a victim if the sweep picks one.
    fn allocate_frame(&mut self) -> Result<FrameId> {
        let sweep = match self.replacer.sweep(&mut self.descriptors) {
            Some(sweep) => sweep,
            None => {
                warn!(pool_size = self.pool_size, "every frame is pinned");
                return Err(Error::NoFreeFrames {
                    pool_size: self.pool_size,
                });
            }
        };

        if let Sweep::Victim(frame_id) = sweep {
            self.evict(frame_id)?;
        }
        Ok(sweep.frame_id())
    }

    /// Write back (if dirty), unmap and clear a victim frame.
    fn evict(&mut self, frame_id: FrameId) -> Result<()> {
        if self.descriptors[frame_id.0].is_dirty() {
            self.write_back(frame_id)?;
        }

        let desc = &self.descriptors[frame_id.0];
        let page_no = desc.page_no();
        if let Some(file) = desc.file().cloned() {
            self.page_table.remove(&file, page_no)?;
            debug!(file = %file, page = %page_no, frame = %frame_id, "evicted page");
        }

        self.descriptors[frame_id.0].clear();
        BufferPoolStats::bump(&self.stats.evictions);
        Ok(())
    }

    /// Write a frame's page to its store and clear the dirty flag.
    ///
    /// The header is restamped from the descriptor first: callers hold
    /// `&mut Page` and may have overwritten it, but the store places the
    /// page by its header.
    fn write_back(&mut self, frame_id: FrameId) -> Result<()> {
        let desc = &self.descriptors[frame_id.0];
        if let Some(file) = desc.file() {
            let page_no = desc.page_no();
            let page = self.pool.page_mut(frame_id);
            page.set_header(&PageHeader::new(page_no, PageType::Data));

            file.write_page(page)?;
            BufferPoolStats::bump(&self.stats.pages_written);
            debug!(file = %file, page = %page_no, frame = %frame_id, "wrote back page");
        }

        self.descriptors[frame_id.0].clear_dirty();
        Ok(())
    }

    /// Copy `page` into a free frame and map it, pinned once.
    fn install(
        &mut self,
        file: &FileHandle,
        page_no: PageId,
        frame_id: FrameId,
        page: &Page,
    ) -> Result<()> {
        self.pool.page_mut(frame_id).copy_from(page);
        self.page_table.insert(file, page_no, frame_id)?;
        self.descriptors[frame_id.0].set(file.clone(), page_no);
        Ok(())
    }
}

impl Default for BufferPoolManager {
    fn default() -> Self {
        Self::new(DEFAULT_POOL_SIZE)
    }
}

impl Drop for BufferPoolManager {
    /// Write back every dirty page before the pool's memory goes away.
    fn drop(&mut self) {
        for i in 0..self.pool_size {
            let desc = &self.descriptors[i];
            if !(desc.is_valid() && desc.is_dirty()) {
                continue;
            }

            let frame_id = FrameId::new(i);
            if let Err(e) = self.write_back(frame_id) {
                warn!(frame = %frame_id, error = %e, "failed to write back page on shutdown");
            }
        }
    }
}
