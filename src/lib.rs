//! clockbuf - a page buffer cache with CLOCK replacement.
//!
//! # Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                            clockbuf                             │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │              Buffer Pool (buffer/)                       │   │
//! │  │   BufferPoolManager: read / unpin / allocate /           │   │
//! │  │   dispose / flush_file                                   │   │
//! │  │   ┌─────────────┐ ┌──────────────┐ ┌────────────────┐   │   │
//! │  │   │  PageTable  │ │ Descriptors  │ │ ClockReplacer  │   │   │
//! │  │   └─────────────┘ └──────────────┘ └────────────────┘   │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │           Storage Layer (storage/)                       │   │
//! │  │   FileHandle → dyn PageStore                             │   │
//! │  │   DiskManager | MemoryPageStore                          │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//! - [`common`] - Shared primitives (PageId, FrameId, FileId, Error, config)
//! - [`buffer`] - Buffer pool management and the CLOCK replacer
//! - [`storage`] - Page stores and page formats
//!
//! # Quick Start
//! ```no_run
//! use clockbuf::storage::{DiskManager, FileHandle};
//! use clockbuf::BufferPoolManager;
//!
//! let file = FileHandle::new(DiskManager::open_or_create("my_table.db").unwrap());
//! let mut bpm = BufferPoolManager::new(64);
//!
//! let (page_no, page) = bpm.allocate_page(&file).unwrap();
//! page.data_mut()[0] = 1;
//! bpm.unpin_page(&file, page_no, true).unwrap();
//! bpm.flush_file(&file).unwrap();
//! ```
//!
//! # Logging
//! The crate logs through [`tracing`]; install a subscriber to see cache
//! hits, misses, evictions and write-backs.

pub mod buffer;
pub mod common;
pub mod storage;

pub use common::config::PAGE_SIZE;
pub use common::{Error, FileId, FrameId, PageId, Result};

pub use buffer::{BufferDump, BufferPoolManager, BufferPoolStats, StatsSnapshot};
pub use storage::page::{Page, PageHeader, PageType};
pub use storage::{DiskManager, FileHandle, MemoryPageStore, PageStore};
