//! Configuration constants for clockbuf.

/// Size of a page in bytes (4KB).
///
/// Matches the OS page size on most systems, so pages can be aligned to
/// 4096 bytes for efficient Direct I/O.
pub const PAGE_SIZE: usize = 4096;

/// Number of page numbers a store may hand out.
///
/// Page numbers run from 0 to `MAX_PAGES - 1`; `u32::MAX` is reserved for
/// [`PageId::INVALID`](crate::PageId::INVALID).
pub const MAX_PAGES: u32 = u32::MAX;

/// Number of frames used by [`BufferPoolManager::default`](crate::BufferPoolManager).
pub const DEFAULT_POOL_SIZE: usize = 64;

/// Page table slots reserved per frame.
///
/// The page table is pre-sized to `pool_size * PAGE_TABLE_LOAD_FACTOR + 1`
/// entries so it never rehashes while the pool is full.
pub const PAGE_TABLE_LOAD_FACTOR: f64 = 1.2;

/// Initial capacity of the page table for a pool of `pool_size` frames.
pub fn page_table_capacity(pool_size: usize) -> usize {
    (pool_size as f64 * PAGE_TABLE_LOAD_FACTOR) as usize + 1
}
