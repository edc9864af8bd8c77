//! Storage layer - page stores and page formats.
//!
//! The buffer pool never touches durable storage directly; it talks to a
//! [`PageStore`] through a shared [`FileHandle`]:
//! - [`DiskManager`] - Pages in a single file on disk
//! - [`MemoryPageStore`] - In-memory store with I/O counters, used by tests
//! - [`page`] - Page types and layouts

mod disk_manager;
mod memory_store;
pub mod page;
mod page_store;

pub use disk_manager::DiskManager;
pub use memory_store::{IoCounters, IoSnapshot, MemoryPageStore};
pub use page_store::{FileHandle, PageStore};
