//! The page arena backing the buffer pool.

use crate::common::FrameId;
use crate::storage::page::Page;

/// Fixed array of page slots, one per frame, addressed by [`FrameId`].
pub struct BufferPool {
    pages: Vec<Page>,
}

impl BufferPool {
    /// Allocate `pool_size` zeroed pages.
    pub fn new(pool_size: usize) -> Self {
        Self {
            pages: (0..pool_size).map(|_| Page::new()).collect(),
        }
    }

    /// # Panics
    /// Panics if `frame_id` is out of range.
    #[inline]
    pub fn page(&self, frame_id: FrameId) -> &Page {
        &self.pages[frame_id.0]
    }

    /// # Panics
    /// Panics if `frame_id` is out of range.
    #[inline]
    pub fn page_mut(&mut self, frame_id: FrameId) -> &mut Page {
        &mut self.pages[frame_id.0]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}
