//! Page store: fetches page windows from a [`ByteSource`] and stitches
//! spilled payloads back together from their overflow chains.

use bytes::{Bytes, BytesMut};
use tracing::trace;

use crate::btree_page::page::Page;
use crate::dbheader::DbHeader;
use crate::error::{Error, Result};
use crate::source::ByteSource;

#[derive(Debug)]
pub struct Pager<S> {
  source: S,
  page_size: u32,
  usable_size: u32,
  page_count: u32,
}

impl<S: ByteSource> Pager<S> {
  pub fn new(source: S, header: &DbHeader) -> Self {
    let page_count = (source.len() / header.page_size as u64).min(u32::MAX as u64) as u32;
    Self {
      source,
      page_size: header.page_size,
      usable_size: header.usable_size(),
      page_count,
    }
  }

  pub fn page_size(&self) -> u32 {
    self.page_size
  }

  pub fn usable_size(&self) -> u32 {
    self.usable_size
  }

  /// Number of whole pages in the source.
  pub fn page_count(&self) -> u32 {
    self.page_count
  }

  /// Reads page `page_number` (1-based) in full.
  pub fn fetch(&self, page_number: u32) -> Result<Page> {
    if page_number == 0 || page_number > self.page_count {
      return Err(Error::PageOutOfRange {
        page: page_number as u64,
        page_count: self.page_count,
      });
    }

    let offset = (page_number as u64 - 1) * self.page_size as u64;
    let mut data = vec![0u8; self.page_size as usize];
    self.source.read_exact_at(offset, &mut data)?;
    Ok(Page::new(page_number, Bytes::from(data)))
  }

  /// Rebuilds a payload of `total_size` bytes whose first bytes are `local`
  /// and whose remainder lives in the overflow chain starting at `first`.
  ///
  /// Each overflow page is a 4-byte next-page number followed by up to
  /// `usable_size - 4` bytes of content.
  pub fn read_overflow(&self, local: &Bytes, total_size: u64, first: u32) -> Result<Bytes> {
    let per_page = self.usable_size as usize - 4;
    let capacity = local.len() as u64 + self.page_count as u64 * per_page as u64;
    if total_size > capacity {
      return Err(Error::BrokenOverflowChain {
        page: first,
        reason: format!("payload of {total_size} bytes cannot fit in the database"),
      });
    }
    let total_size = total_size as usize;

    let mut payload = BytesMut::with_capacity(total_size);
    payload.extend_from_slice(local);

    let mut next = first;
    let mut hops = 0u32;
    while payload.len() < total_size {
      if next == 0 {
        return Err(Error::BrokenOverflowChain {
          page: first,
          reason: format!(
            "chain ended with {} of {total_size} bytes read",
            payload.len()
          ),
        });
      }
      hops += 1;
      if hops > self.page_count {
        return Err(Error::BrokenOverflowChain {
          page: first,
          reason: "chain is longer than the database".to_string(),
        });
      }

      let page = self.fetch(next)?;
      let take = per_page.min(total_size - payload.len());
      trace!(page = next, bytes = take, "overflow page");
      payload.extend_from_slice(&page.read_bytes(4, take)?);
      next = page.read_u32(0)?;
    }

    Ok(payload.freeze())
  }
}
