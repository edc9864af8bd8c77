//! Error types for clockbuf.

use thiserror::Error;

use super::{FrameId, PageId};

/// Convenient Result type alias.
///
/// Instead of writing `Result<T, Error>` everywhere, we can write `Result<T>`.
pub type Result<T> = std::result::Result<T, Error>;

/// All possible errors raised by the page stores and the buffer pool.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error from disk operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The page store has no page with this number (never allocated or deleted).
    #[error("{page_no} not found in file {file}")]
    PageNotFound { file: String, page_no: PageId },

    /// Every frame is pinned; the clock sweep could not find a victim.
    #[error("No free frames available in buffer pool of {pool_size} frames")]
    NoFreeFrames { pool_size: usize },

    /// Attempted to unpin a page whose pin count is already zero.
    ///
    /// This indicates a bug - unpinning should match pinning.
    #[error("{page_no} of file {file} in {frame_id} is not pinned")]
    PageNotPinned {
        file: String,
        page_no: PageId,
        frame_id: FrameId,
    },

    /// The page is still held by a caller and cannot be flushed or disposed.
    #[error("{page_no} of file {file} in {frame_id} is pinned")]
    PagePinned {
        file: String,
        page_no: PageId,
        frame_id: FrameId,
    },

    /// A frame is associated with a file while marked invalid.
    #[error("Bad buffer in {frame_id} (dirty: {dirty}, valid: {valid}, ref: {ref_bit})")]
    BadBuffer {
        frame_id: FrameId,
        dirty: bool,
        valid: bool,
        ref_bit: bool,
    },

    /// The page has no entry in the page table.
    #[error("{page_no} of file {file} is not resident in the buffer pool")]
    PageNotResident { file: String, page_no: PageId },

    /// The page table already maps this page to a frame.
    #[error("{page_no} of file {file} is already mapped in the page table")]
    DuplicateEntry { file: String, page_no: PageId },

    /// The store has handed out every page number it can address.
    #[error("File {file} is full ({max_pages} pages)")]
    FileFull { file: String, max_pages: u32 },

    /// Page bytes read from disk do not match their stored checksum.
    #[error("Checksum mismatch for {page_no} in file {file}")]
    ChecksumMismatch { file: String, page_no: PageId },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::PageNotFound {
            file: "a.db".into(),
            page_no: PageId::new(42),
        };
        assert_eq!(format!("{}", err), "Page(42) not found in file a.db");

        let err = Error::NoFreeFrames { pool_size: 3 };
        assert_eq!(
            format!("{}", err),
            "No free frames available in buffer pool of 3 frames"
        );

        let err = Error::PagePinned {
            file: "a.db".into(),
            page_no: PageId::new(7),
            frame_id: FrameId::new(2),
        };
        assert_eq!(format!("{}", err), "Page(7) of file a.db in Frame(2) is pinned");
    }

    #[test]
    fn test_file_full_display() {
        let err = Error::FileFull {
            file: "a.db".into(),
            max_pages: 8,
        };
        assert_eq!(format!("{}", err), "File a.db is full (8 pages)");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();

        match err {
            Error::Io(_) => {} // Success
            _ => panic!("Expected Io error"),
        }
    }

    #[test]
    fn test_io_error_source() {
        use std::error::Error as _;

        let err: Error = std::io::Error::new(std::io::ErrorKind::Other, "boom").into();
        assert!(err.source().is_some());
        assert!(Error::NoFreeFrames { pool_size: 1 }.source().is_none());
    }
}
