//! Page number type.

use std::fmt;

/// Page number within a single file.
///
/// Page numbers are only unique per file; the buffer pool always pairs them
/// with a [`FileId`](super::FileId). A `u32` allows for 4 billion pages per
/// file (16TB at 4KB pages).
///
/// # Example
/// ```
/// use clockbuf::PageId;
///
/// let page_no = PageId::new(42);
/// assert!(page_no.is_valid());
/// assert_eq!(page_no.0, 42);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageId(pub u32);

impl PageId {
    /// Sentinel for "no page"; stored in cleared frame descriptors.
    pub const INVALID: PageId = PageId(u32::MAX);

    #[inline]
    pub fn new(id: u32) -> Self {
        PageId(id)
    }

    /// Check if this page number is a real one (not the sentinel).
    #[inline]
    pub fn is_valid(&self) -> bool {
        *self != Self::INVALID
    }

    /// Byte offset of this page in a file of fixed-size pages.
    #[inline]
    pub fn offset(&self, page_size: usize) -> u64 {
        self.0 as u64 * page_size as u64
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::INVALID {
            write!(f, "Page(INVALID)")
        } else {
            write!(f, "Page({})", self.0)
        }
    }
}
