pub mod cell;
pub mod page;

use std::collections::HashSet;

use bytes::Bytes;
use tracing::{debug, trace};

use crate::config::ChildOrder;
use crate::error::{Error, Result};
use crate::pager::Pager;
use crate::source::ByteSource;
use cell::{TableInteriorCell, TableLeafCell};
use page::Page;

/// Two variants of b-trees are used by SQLite. "Table b-trees" use a 64-bit signed integer key and store all data in the leaves.
/// "Index b-trees" use arbitrary keys and store no data at all.
///
/// A b-tree page is divided into regions in the following order:
///   1. The 100-byte database file header (found on page 1 only)
///   2. The 8 or 12 byte b-tree page header
///   3. The cell pointer array
///   4. Unallocated space
///   5. The cell content area
///   6. The reserved region.
///
/// +------+----+--------------------------------------------------------------------------------------------------------------------------------------------------------------------+
/// |Offset|Size|Description                                                                                                                                                         |
/// +------+----+--------------------------------------------------------------------------------------------------------------------------------------------------------------------|
/// |0     |1   |The one-byte flag at offset 0 indicating the b-tree page type.                                                                                                      |
/// |1     |2   |The two-byte integer at offset 1 gives the start of the first freeblock on the page or is zero if there are no freeblocks.                                          |
/// |3     |2   |The two-byte integer at offset 3 gives the number of cells on the page.                                                                                             |
/// |5     |2   |The two-byte integer at offset 5 designates the start of the cell content area. A zero value for this integer is interpreted as 65536.                              |
/// |7     |1   |The one-byte integer at offset 7 gives the number of fragmented free bytes within the cell content area.                                                            |
/// |8     |4   |The four-byte page number at offset 8 is the right-most pointer. This value appears in the header of interior b-tree pages only and is omitted from all other pages.|
/// +------+----+--------------------------------------------------------------------------------------------------------------------------------------------------------------------+
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageType {
  /// A zeroed page. Never part of a well-formed tree, but tolerated.
  Unallocated,
  IndexInterior,
  TableInterior,
  IndexLeaf,
  TableLeaf,
}

impl PageType {
  pub fn from_tag(page: u32, tag: u8) -> Result<Self> {
    match tag {
      0x00 => Ok(PageType::Unallocated),
      0x02 => Ok(PageType::IndexInterior),
      0x05 => Ok(PageType::TableInterior),
      0x0a => Ok(PageType::IndexLeaf),
      0x0d => Ok(PageType::TableLeaf),
      tag => Err(Error::UnknownPageType { page, tag }),
    }
  }

}

#[derive(Debug, Clone, Copy)]
pub struct Header {
  pub page_type: PageType,
  pub num_cells: u16,
  pub right_most_pointer: Option<u32>,
  /// Offset of the cell pointer array within the page.
  pub cell_pointer_offset: usize,
}

impl Header {
  pub fn parse(page: &Page) -> Result<Self> {
    let base = page.header_offset();
    let page_type = PageType::from_tag(page.page_number, page.read_u8(base)?)?;
    let num_cells = page.read_u16(base + 3)?;

    // Index pages are never descended into, so only table interior pages
    // read the right-most pointer.
    let (right_most_pointer, header_len) = if page_type == PageType::TableInterior {
      (Some(page.read_u32(base + 8)?), 12)
    } else {
      (None, 8)
    };

    Ok(Self {
      page_type,
      num_cells,
      right_most_pointer,
      cell_pointer_offset: base + header_len,
    })
  }

  /// Cell offsets, relative to the start of the page, in stored order.
  pub fn cell_pointers(&self, page: &Page) -> Result<Vec<usize>> {
    (0..self.num_cells as usize)
      .map(|i| Ok(page.read_u16(self.cell_pointer_offset + i * 2)? as usize))
      .collect()
  }
}

#[derive(Default)]
struct WalkState {
  /// Pages between the root and the current page.
  path: Vec<u32>,
  visited: HashSet<u32>,
}

/// Depth-first walk over a table b-tree, handing every leaf cell's row id and
/// full payload to a callback.
pub struct BTree<'a, S> {
  pager: &'a Pager<S>,
  child_order: ChildOrder,
}

impl<'a, S: ByteSource> BTree<'a, S> {
  pub fn new(pager: &'a Pager<S>, child_order: ChildOrder) -> Self {
    Self { pager, child_order }
  }

  /// Walks the tree rooted at `root`. The first error, from the tree or from
  /// `on_cell`, stops the walk and is returned.
  ///
  /// Every page is read at most once per walk.
  pub fn walk<F>(&self, root: u32, on_cell: &mut F) -> Result<()>
  where
    F: FnMut(u64, Bytes) -> Result<()>,
  {
    let mut state = WalkState::default();
    self.visit(root, &mut state, on_cell)
  }

  fn visit<F>(&self, page_number: u32, state: &mut WalkState, on_cell: &mut F) -> Result<()>
  where
    F: FnMut(u64, Bytes) -> Result<()>,
  {
    state.visited.insert(page_number);
    state.path.push(page_number);
    let result = self.visit_page(page_number, state, on_cell);
    state.path.pop();
    result
  }

  // A pointer back into `path` would never terminate; any other page seen
  // before has already delivered its rows.
  fn descend<F>(&self, from: u32, target: u32, state: &mut WalkState, on_cell: &mut F) -> Result<()>
  where
    F: FnMut(u64, Bytes) -> Result<()>,
  {
    if state.path.contains(&target) {
      return Err(Error::Cycle { page: from, target });
    }
    if state.visited.contains(&target) {
      debug!(page = from, target, "skipping page already visited");
      return Ok(());
    }
    self.visit(target, state, on_cell)
  }

  fn visit_page<F>(&self, page_number: u32, state: &mut WalkState, on_cell: &mut F) -> Result<()>
  where
    F: FnMut(u64, Bytes) -> Result<()>,
  {
    let page = self.pager.fetch(page_number)?;
    let header = Header::parse(&page)?;
    trace!(
      page = page_number,
      page_type = ?header.page_type,
      cells = header.num_cells,
      "visit page"
    );

    match header.page_type {
      PageType::Unallocated | PageType::IndexInterior | PageType::IndexLeaf => Ok(()),
      PageType::TableInterior => {
        let right_most = header.right_most_pointer.unwrap_or_default();
        let pointers = header.cell_pointers(&page)?;
        for (i, &offset) in pointers.iter().enumerate() {
          let left_child_page = TableInteriorCell::read(&page, offset)?.left_child_page;

          let last = i + 1 == pointers.len();
          if last && self.child_order == ChildOrder::Span {
            for child in left_child_page..=right_most {
              self.descend(page_number, child, state, on_cell)?;
            }
          } else {
            self.descend(page_number, left_child_page, state, on_cell)?;
          }
        }

        if self.child_order == ChildOrder::Pointers {
          self.descend(page_number, right_most, state, on_cell)?;
        }
        Ok(())
      }
      PageType::TableLeaf => {
        for offset in header.cell_pointers(&page)? {
          let cell = TableLeafCell::read(&page, offset, self.pager.usable_size())?;
          let payload = match cell.overflow_page {
            Some(first) => self.pager.read_overflow(&cell.payload, cell.payload_size, first)?,
            None => cell.payload,
          };
          on_cell(cell.row_id, payload)?;
        }
        Ok(())
      }
    }
  }
}
