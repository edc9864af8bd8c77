//! Frame descriptors - residency metadata for each buffer pool slot.
//!
//! A [`FrameDescriptor`] records which page a frame holds and the flags
//! the clock sweep and the pin protocol depend on:
//! - `valid`: the frame holds a real page
//! - `pin_count`: number of callers currently holding the page
//! - `dirty`: the in-memory copy differs from the store's copy
//! - `ref_bit`: touched since the clock hand last passed

use std::fmt;

use crate::common::{FrameId, PageId};
use crate::storage::FileHandle;

/// Metadata for one frame in the buffer pool.
///
/// # Invariants
/// - `pin_count > 0` implies `valid`
/// - `file` and `page_no` are meaningful only while `valid`
pub struct FrameDescriptor {
    frame_id: FrameId,
    file: Option<FileHandle>,
    page_no: PageId,
    pin_count: u32,
    dirty: bool,
    valid: bool,
    ref_bit: bool,
}

impl FrameDescriptor {
    /// Create an empty (invalid) descriptor for `frame_id`.
    pub fn new(frame_id: FrameId) -> Self {
        Self {
            frame_id,
            file: None,
            page_no: PageId::INVALID,
            pin_count: 0,
            dirty: false,
            valid: false,
            ref_bit: false,
        }
    }

    /// Record that this frame now holds `page_no` of `file`, pinned once.
    pub fn set(&mut self, file: FileHandle, page_no: PageId) {
        self.file = Some(file);
        self.page_no = page_no;
        self.pin_count = 1;
        self.dirty = false;
        self.valid = true;
        self.ref_bit = true;
    }

    /// Reset to the empty state.
    pub fn clear(&mut self) {
        self.file = None;
        self.page_no = PageId::INVALID;
        self.pin_count = 0;
        self.dirty = false;
        self.valid = false;
        self.ref_bit = false;
    }

    #[inline]
    pub fn frame_id(&self) -> FrameId {
        self.frame_id
    }

    #[inline]
    pub fn file(&self) -> Option<&FileHandle> {
        self.file.as_ref()
    }

    /// Whether this frame is associated with `file`, valid or not.
    #[inline]
    pub fn belongs_to(&self, file: &FileHandle) -> bool {
        self.file.as_ref().is_some_and(|f| f == file)
    }

    #[inline]
    pub fn page_no(&self) -> PageId {
        self.page_no
    }

    // ========================================================================
    // Pin count
    // ========================================================================

    /// Pin the frame and mark it recently used. Returns the new pin count.
    #[inline]
    pub fn pin(&mut self) -> u32 {
        self.pin_count += 1;
        self.ref_bit = true;
        self.pin_count
    }

    /// Decrement the pin count. Returns `None` if it was already zero.
    #[inline]
    pub fn unpin(&mut self) -> Option<u32> {
        self.pin_count = self.pin_count.checked_sub(1)?;
        Some(self.pin_count)
    }

    #[inline]
    pub fn pin_count(&self) -> u32 {
        self.pin_count
    }

    #[inline]
    pub fn is_pinned(&self) -> bool {
        self.pin_count > 0
    }

    // ========================================================================
    // Flags
    // ========================================================================

    #[inline]
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    #[inline]
    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    #[inline]
    pub fn ref_bit(&self) -> bool {
        self.ref_bit
    }

    #[inline]
    pub fn clear_ref_bit(&mut self) {
        self.ref_bit = false;
    }

    /// Force the valid flag without touching anything else.
    #[cfg(test)]
    pub(crate) fn set_valid(&mut self, valid: bool) {
        self.valid = valid;
    }

    /// Copy out the descriptor's state for diagnostics.
    pub fn state(&self) -> FrameState {
        FrameState {
            frame_id: self.frame_id,
            file: self.file.as_ref().map(|f| f.filename().to_string()),
            page_no: self.page_no,
            pin_count: self.pin_count,
            dirty: self.dirty,
            valid: self.valid,
            ref_bit: self.ref_bit,
        }
    }
}

impl fmt::Debug for FrameDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.state(), f)
    }
}

/// Owned copy of a [`FrameDescriptor`], as reported by the pool dump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameState {
    pub frame_id: FrameId,
    pub file: Option<String>,
    pub page_no: PageId,
    pub pin_count: u32,
    pub dirty: bool,
    pub valid: bool,
    pub ref_bit: bool,
}

impl fmt::Display for FrameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} file:{} page:{} valid:{} pin:{} dirty:{} ref:{}",
            self.frame_id,
            self.file.as_deref().unwrap_or("NULL"),
            self.page_no,
            self.valid,
            self.pin_count,
            self.dirty,
            self.ref_bit
        )
    }
}
