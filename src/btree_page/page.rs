use bytes::Bytes;

use crate::dbheader::HEADER_SIZE;
use crate::error::Result;
use crate::primitives::{self, window};
use crate::varint;

/// One page-sized window of the database file.
///
/// `data` always starts at the page's raw file offset, so cell pointers
/// (which are relative to the start of the page) index it directly. Page 1
/// shares its first 100 bytes with the database header.
#[derive(Debug, Clone)]
pub struct Page {
  pub data: Bytes,
  pub page_number: u32,
}

impl Page {
  pub fn new(page_number: u32, data: Bytes) -> Self {
    Self { data, page_number }
  }

  /// Where the b-tree page header begins inside `data`.
  pub fn header_offset(&self) -> usize {
    if self.page_number == 1 {
      HEADER_SIZE
    } else {
      0
    }
  }

  pub fn read_u8(&self, offset: usize) -> Result<u8> {
    primitives::read_u8(&self.data, offset)
  }

  pub fn read_u16(&self, offset: usize) -> Result<u16> {
    primitives::read_u16(&self.data, offset)
  }

  pub fn read_u32(&self, offset: usize) -> Result<u32> {
    primitives::read_u32(&self.data, offset)
  }

  pub fn read_varint(&self, offset: usize) -> Result<(u64, usize)> {
    varint::decode(&self.data, offset)
  }

  /// Shares `size` bytes starting at `offset` without copying.
  pub fn read_bytes(&self, offset: usize, size: usize) -> Result<Bytes> {
    window(&self.data, offset, size)?;
    Ok(self.data.slice(offset..offset + size))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn page_one_skips_the_file_header() {
    let page = Page::new(1, Bytes::from(vec![0u8; 512]));
    assert_eq!(page.header_offset(), 100);
    let page = Page::new(2, Bytes::from(vec![0u8; 512]));
    assert_eq!(page.header_offset(), 0);
  }

  #[test]
  fn read_bytes_is_bounds_checked() {
    let page = Page::new(2, Bytes::from_static(&[1, 2, 3, 4]));
    assert_eq!(&page.read_bytes(1, 2).unwrap()[..], &[2, 3]);
    assert!(page.read_bytes(3, 2).is_err());
    assert!(page.read_u32(1).is_err());
  }
}
