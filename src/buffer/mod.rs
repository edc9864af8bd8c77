//! Buffer pool management.
//!
//! The buffer pool is the in-memory cache between callers and page stores.
//! It manages a fixed pool of frames, each holding at most one page.
//!
//! # Components
//! - [`BufferPoolManager`] - The page cache and its operations
//! - [`FrameDescriptor`] - Residency metadata for one frame
//! - [`PageTable`] - Index from `(file, page)` to frame
//! - [`BufferPool`] - The page arena itself
//! - [`replacer`] - CLOCK victim selection
//! - [`BufferPoolStats`] - Performance statistics

mod buffer_pool_manager;
mod dump;
mod frame;
mod page_table;
mod pool;
pub mod replacer;
mod stats;

pub use buffer_pool_manager::BufferPoolManager;
pub use dump::BufferDump;
pub use frame::{FrameDescriptor, FrameState};
pub use page_table::PageTable;
pub use pool::BufferPool;
pub use stats::{BufferPoolStats, StatsSnapshot};
