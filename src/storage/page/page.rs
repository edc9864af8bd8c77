//! Page - the fundamental 4KB unit of storage.
//!
//! A [`Page`] is a raw 4KB byte array that serves as the unit of I/O
//! between a page store and the buffer pool.

use std::fmt;

use crate::common::config::PAGE_SIZE;
use crate::common::PageId;

use super::page_header::{PageHeader, PageType};

/// A page of data (4KB, 4KB-aligned).
///
/// The first [`PageHeader::SIZE`] bytes hold the header; the rest, exposed
/// through [`Page::data`], belongs to the caller.
///
/// # Clone Implementation
/// `Page` does NOT implement `Clone` in production code: copying 4KB should
/// be explicit, so use [`Page::copy_from`]. A `#[cfg(test)]` Clone is provided
/// for tests.
///
/// # Example
/// ```
/// use clockbuf::{Page, PageId};
///
/// let mut page = Page::with_page_no(PageId::new(3));
/// page.data_mut()[0] = 0xFF;
/// assert_eq!(page.page_no(), PageId::new(3));
/// assert_eq!(page.data()[0], 0xFF);
/// ```
#[repr(align(4096))]
pub struct Page {
    data: [u8; PAGE_SIZE],
}

impl Page {
    /// Create a new zeroed page.
    #[inline]
    pub fn new() -> Self {
        Self {
            data: [0u8; PAGE_SIZE],
        }
    }

    /// Create a zeroed data page stamped with its page number.
    pub fn with_page_no(page_no: PageId) -> Self {
        let mut page = Self::new();
        page.set_header(&PageHeader::new(page_no, PageType::Data));
        page
    }

    /// Get immutable slice of the whole page, header included.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Get mutable slice of the whole page, header included.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// The payload area after the header.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data[PageHeader::SIZE..]
    }

    #[inline]
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data[PageHeader::SIZE..]
    }

    /// Overwrite this page with the bytes of `other`.
    #[inline]
    pub fn copy_from(&mut self, other: &Page) {
        self.data.copy_from_slice(&other.data);
    }

    /// Zero out the entire page.
    pub fn reset(&mut self) {
        self.data.fill(0);
    }

    /// Number of the page as recorded in its header.
    #[inline]
    pub fn page_no(&self) -> PageId {
        self.header().page_no
    }

    /// Read the page header.
    pub fn header(&self) -> PageHeader {
        PageHeader::from_bytes(&self.data)
    }

    /// Write a page header.
    pub fn set_header(&mut self, header: &PageHeader) {
        header.write_to(&mut self.data);
    }

    /// Compute and store checksum in the header.
    ///
    /// Call this after all modifications to the page are complete.
    pub fn update_checksum(&mut self) {
        let checksum = PageHeader::compute_checksum(&self.data);
        self.data[PageHeader::OFFSET_CHECKSUM..PageHeader::OFFSET_CHECKSUM + 4]
            .copy_from_slice(&checksum.to_le_bytes());
    }

    /// Verify the page checksum is valid.
    pub fn verify_checksum(&self) -> bool {
        self.header().verify_checksum(&self.data)
    }
}

impl fmt::Debug for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let header = self.header();
        f.debug_struct("Page")
            .field("page_no", &header.page_no)
            .field("page_type", &header.page_type)
            .finish_non_exhaustive()
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new()
    }
}

// Clone only available in tests - forces explicit copying in production
#[cfg(test)]
impl Clone for Page {
    fn clone(&self) -> Self {
        let mut new_page = Page::new();
        new_page.copy_from(self);
        new_page
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_size_and_alignment() {
        assert_eq!(std::mem::size_of::<Page>(), PAGE_SIZE);
        assert_eq!(std::mem::align_of::<Page>(), 4096);
    }

    #[test]
    fn test_with_page_no_stamps_header() {
        let page = Page::with_page_no(PageId::new(17));
        assert_eq!(page.page_no(), PageId::new(17));
        assert_eq!(page.header().page_type, PageType::Data);
        assert!(page.data().iter().all(|&b| b == 0));
        assert_eq!(page.data().len(), PAGE_SIZE - PageHeader::SIZE);
    }

    #[test]
    fn test_data_does_not_touch_header() {
        let mut page = Page::with_page_no(PageId::new(5));
        page.data_mut().fill(0xEE);
        assert_eq!(page.page_no(), PageId::new(5));
        assert_eq!(page.as_slice()[PageHeader::SIZE], 0xEE);
    }

    #[test]
    fn test_copy_from() {
        let mut src = Page::with_page_no(PageId::new(2));
        src.data_mut()[10] = 0xAB;

        let mut dst = Page::new();
        dst.copy_from(&src);
        assert_eq!(dst.page_no(), PageId::new(2));
        assert_eq!(dst.data()[10], 0xAB);
    }

    #[test]
    fn test_checksum_roundtrip() {
        let mut page = Page::with_page_no(PageId::new(1));
        page.data_mut()[0] = 7;
        page.update_checksum();
        assert!(page.verify_checksum());

        page.data_mut()[0] = 8;
        assert!(!page.verify_checksum());
    }

    #[test]
    fn test_page_reset() {
        let mut page = Page::with_page_no(PageId::new(9));
        page.data_mut()[0] = 0xFF;
        page.reset();
        assert_eq!(page.as_slice().iter().filter(|&&b| b != 0).count(), 0);
    }
}
