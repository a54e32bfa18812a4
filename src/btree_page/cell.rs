use bytes::Bytes;

use super::page::Page;
use crate::error::Result;

/// Table B-Tree Leaf Cell (header 0x0d):
///
/// ```text
///         A varint which is the total number of bytes of payload, including any overflow
///         A varint which is the integer key, a.k.a. "rowid"
///         The initial portion of the payload that does not spill to overflow pages.
///         A 4-byte big-endian integer page number for the first page of the overflow page list - omitted if all payload fits on the b-tree page.
/// ```
///
/// Table B-Tree Interior Cell (header 0x05):
///
/// ```text
///         A 4-byte big-endian page number which is the left child pointer.
///         A varint which is the integer key
/// ```
///
/// Index cells (0x02, 0x0a) are never decoded: index trees do not produce rows.
#[derive(Debug, Clone)]
pub struct TableLeafCell {
  pub payload_size: u64,
  pub row_id: u64,
  pub payload: Bytes, // Local payload bytes
  pub overflow_page: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableInteriorCell {
  pub left_child_page: u32,
  pub row_id: u64,
}

impl TableLeafCell {
  pub fn read(page: &Page, cell_offset: usize, usable_size: u32) -> Result<Self> {
    let (payload_size, offset) = page.read_varint(cell_offset)?;
    let (row_id, offset) = page.read_varint(offset)?;

    let local = local_payload_size(payload_size, usable_size);
    let payload = page.read_bytes(offset, local)?;
    let overflow_page = if (local as u64) < payload_size {
      Some(page.read_u32(offset + local)?)
    } else {
      None
    };

    Ok(Self {
      payload_size,
      row_id,
      payload,
      overflow_page,
    })
  }
}

impl TableInteriorCell {
  pub fn read(page: &Page, cell_offset: usize) -> Result<Self> {
    let left_child_page = page.read_u32(cell_offset)?;
    let (row_id, _) = page.read_varint(cell_offset + 4)?;
    Ok(Self {
      left_child_page,
      row_id,
    })
  }
}

/// How many payload bytes a table leaf cell keeps on its own page.
///
/// Payloads up to `usable - 35` bytes are stored whole. Larger ones keep
/// between `min_local` and `max_local` bytes locally, chosen so the spilled
/// part fills its last overflow page as fully as possible.
pub fn local_payload_size(payload_size: u64, usable_size: u32) -> usize {
  let usable = usable_size as u64;
  let max_local = usable - 35;
  if payload_size <= max_local {
    return payload_size as usize;
  }

  let min_local = (usable - 12) * 32 / 255 - 23;
  let surplus = min_local + (payload_size - min_local) % (usable - 4);
  if surplus <= max_local {
    surplus as usize
  } else {
    min_local as usize
  }
}
