//! Page header and type definitions.
//!
//! Every page starts with a [`PageHeader`] containing:
//! - the page's own number, so a page can be written back without a separate id
//! - a [`PageType`] discriminator
//! - a CRC32 checksum for integrity

use crate::common::PageId;

/// Type of page stored on disk.
///
/// Uses `#[repr(u8)]` to guarantee a 1-byte representation for serialization.
#[repr(u8)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum PageType {
    /// Uninitialized or corrupted page.
    #[default]
    Invalid = 0,
    /// Live page handed out by `allocate_page`.
    Data = 1,
    /// Deleted page waiting on the store's free list.
    Free = 2,
}

impl PageType {
    /// Convert from u8, returning Invalid for unknown values.
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => PageType::Data,
            2 => PageType::Free,
            _ => PageType::Invalid,
        }
    }
}

/// Metadata stored at the beginning of every page.
///
/// # Layout (9 bytes)
/// ```text
/// Offset  Size  Field
/// ------  ----  -----
/// 0       4     page_no (little-endian)
/// 4       1     page_type (PageType as u8)
/// 5       4     checksum (CRC32, little-endian)
/// ```
///
/// # Checksum
/// The checksum is computed over the entire page with the checksum field
/// itself set to zero. This allows verification without special handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageHeader {
    /// Number of this page within its file.
    pub page_no: PageId,
    /// Type of this page.
    pub page_type: PageType,
    /// CRC32 checksum of the page contents.
    pub checksum: u32,
}

impl Default for PageHeader {
    fn default() -> Self {
        Self::new(PageId::INVALID, PageType::Invalid)
    }
}

impl PageHeader {
    /// Size of the header in bytes.
    pub const SIZE: usize = 9;

    pub const OFFSET_PAGE_NO: usize = 0;
    pub const OFFSET_PAGE_TYPE: usize = 4;
    pub const OFFSET_CHECKSUM: usize = 5;

    /// Create a header with a zero checksum.
    pub fn new(page_no: PageId, page_type: PageType) -> Self {
        Self {
            page_no,
            page_type,
            checksum: 0,
        }
    }

    /// Read a header from the beginning of a byte slice.
    ///
    /// # Panics
    /// Panics if `data.len() < PageHeader::SIZE`.
    pub fn from_bytes(data: &[u8]) -> Self {
        assert!(data.len() >= Self::SIZE, "buffer too small for PageHeader");

        let page_no = u32::from_le_bytes([
            data[Self::OFFSET_PAGE_NO],
            data[Self::OFFSET_PAGE_NO + 1],
            data[Self::OFFSET_PAGE_NO + 2],
            data[Self::OFFSET_PAGE_NO + 3],
        ]);

        let checksum = u32::from_le_bytes([
            data[Self::OFFSET_CHECKSUM],
            data[Self::OFFSET_CHECKSUM + 1],
            data[Self::OFFSET_CHECKSUM + 2],
            data[Self::OFFSET_CHECKSUM + 3],
        ]);

        Self {
            page_no: PageId::new(page_no),
            page_type: PageType::from_u8(data[Self::OFFSET_PAGE_TYPE]),
            checksum,
        }
    }

    /// Write this header to the beginning of a byte slice.
    ///
    /// # Panics
    /// Panics if `data.len() < PageHeader::SIZE`.
    pub fn write_to(&self, data: &mut [u8]) {
        assert!(data.len() >= Self::SIZE, "buffer too small for PageHeader");

        data[Self::OFFSET_PAGE_NO..Self::OFFSET_PAGE_NO + 4]
            .copy_from_slice(&self.page_no.0.to_le_bytes());
        data[Self::OFFSET_PAGE_TYPE] = self.page_type as u8;
        data[Self::OFFSET_CHECKSUM..Self::OFFSET_CHECKSUM + 4]
            .copy_from_slice(&self.checksum.to_le_bytes());
    }

    /// Compute the CRC32 checksum of a full page, skipping the checksum field.
    pub fn compute_checksum(page_data: &[u8]) -> u32 {
        let mut hasher = crc32fast::Hasher::new();
        hasher.update(&page_data[..Self::OFFSET_CHECKSUM]);
        hasher.update(&[0u8; 4]);
        hasher.update(&page_data[Self::OFFSET_CHECKSUM + 4..]);
        hasher.finalize()
    }

    /// Verify that the stored checksum matches the computed checksum.
    pub fn verify_checksum(&self, page_data: &[u8]) -> bool {
        self.checksum == Self::compute_checksum(page_data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::config::PAGE_SIZE;

    #[test]
    fn test_page_type_from_u8() {
        assert_eq!(PageType::from_u8(0), PageType::Invalid);
        assert_eq!(PageType::from_u8(1), PageType::Data);
        assert_eq!(PageType::from_u8(2), PageType::Free);
        assert_eq!(PageType::from_u8(255), PageType::Invalid);
    }

    #[test]
    fn test_page_header_default_is_invalid() {
        let header = PageHeader::default();
        assert_eq!(header.page_no, PageId::INVALID);
        assert_eq!(header.page_type, PageType::Invalid);
    }

    #[test]
    fn test_page_header_byte_layout() {
        let header = PageHeader {
            page_no: PageId::new(0x04030201),
            page_type: PageType::Free,
            checksum: 0x08070605,
        };

        let mut buffer = [0u8; PageHeader::SIZE];
        header.write_to(&mut buffer);

        assert_eq!(buffer, [0x01, 0x02, 0x03, 0x04, 2, 0x05, 0x06, 0x07, 0x08]);
        assert_eq!(PageHeader::from_bytes(&buffer), header);
    }

    #[test]
    fn test_checksum_ignores_checksum_field() {
        let mut page_data = [0u8; PAGE_SIZE];
        page_data[100] = 0xAB;

        let checksum1 = PageHeader::compute_checksum(&page_data);
        page_data[PageHeader::OFFSET_CHECKSUM..PageHeader::OFFSET_CHECKSUM + 4]
            .copy_from_slice(&[0xFF; 4]);
        let checksum2 = PageHeader::compute_checksum(&page_data);

        assert_eq!(checksum1, checksum2);
    }

    #[test]
    fn test_checksum_detects_corruption() {
        let mut page_data = [0u8; PAGE_SIZE];
        page_data[100] = 0xAB;

        let header = PageHeader {
            page_no: PageId::new(1),
            page_type: PageType::Data,
            checksum: PageHeader::compute_checksum(&page_data),
        };
        assert!(header.verify_checksum(&page_data));

        page_data[100] = 0xFF;
        assert!(!header.verify_checksum(&page_data));
    }
}
