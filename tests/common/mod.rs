//! Builds small database images page by page.

#![allow(dead_code)]

use sqlite_reader::varint;

pub const MAGIC: &[u8; 16] = b"SQLite format 3\0";

/// A column for [`record`]; each variant picks its serial type.
pub enum Col {
  Null,
  I8(i8),
  I16(i16),
  I24(i32),
  I32(i32),
  I48(i64),
  I64(i64),
  Float(f64),
  Zero,
  One,
  Blob(Vec<u8>),
  Text(String),
  /// A raw serial type code followed by raw body bytes.
  Raw(u64, Vec<u8>),
}

pub fn text(s: &str) -> Col {
  Col::Text(s.to_string())
}

impl Col {
  fn encode(&self) -> (u64, Vec<u8>) {
    match self {
      Col::Null => (0, vec![]),
      Col::I8(v) => (1, v.to_be_bytes().to_vec()),
      Col::I16(v) => (2, v.to_be_bytes().to_vec()),
      Col::I24(v) => (3, v.to_be_bytes()[1..].to_vec()),
      Col::I32(v) => (4, v.to_be_bytes().to_vec()),
      Col::I48(v) => (5, v.to_be_bytes()[2..].to_vec()),
      Col::I64(v) => (6, v.to_be_bytes().to_vec()),
      Col::Float(v) => (7, v.to_bits().to_be_bytes().to_vec()),
      Col::Zero => (8, vec![]),
      Col::One => (9, vec![]),
      Col::Blob(b) => (12 + 2 * b.len() as u64, b.clone()),
      Col::Text(s) => (13 + 2 * s.len() as u64, s.as_bytes().to_vec()),
      Col::Raw(code, body) => (*code, body.clone()),
    }
  }
}

/// Encodes a record payload: header length, serial types, then the body.
pub fn record(cols: &[Col]) -> Vec<u8> {
  let mut types = Vec::new();
  let mut body = Vec::new();
  for col in cols {
    let (code, bytes) = col.encode();
    types.extend(varint::encode(code));
    body.extend(bytes);
  }

  let mut len_len = 1;
  loop {
    let needed = varint::encoded_len((types.len() + len_len) as u64);
    if needed == len_len {
      break;
    }
    len_len = needed;
  }

  let mut out = varint::encode((types.len() + len_len) as u64);
  out.extend(types);
  out.extend(body);
  out
}

/// A `sqlite_schema` row.
pub fn schema_row(kind: &str, name: &str, root_page: i32, sql: &str) -> Vec<u8> {
  record(&[
    text(kind),
    text(name),
    text(name),
    Col::I32(root_page),
    text(sql),
  ])
}

pub struct DbBuilder {
  page_size: usize,
  pages: Vec<Vec<u8>>,
}

impl DbBuilder {
  /// Starts an image whose page 1 is an empty schema leaf.
  pub fn new(page_size: usize) -> Self {
    let mut builder = Self {
      page_size,
      pages: vec![vec![0; page_size]],
    };
    builder.leaf(1, &[]);
    builder
  }

  pub fn page_size(&self) -> usize {
    self.page_size
  }

  /// Appends a zeroed page and returns its number.
  pub fn add_page(&mut self) -> u32 {
    self.pages.push(vec![0; self.page_size]);
    self.pages.len() as u32
  }

  /// Appends zeroed pages until `page` exists.
  pub fn ensure_page(&mut self, page: u32) {
    while self.pages.len() < page as usize {
      self.add_page();
    }
  }

  pub fn raw(&mut self, page: u32) -> &mut Vec<u8> {
    self.ensure_page(page);
    &mut self.pages[page as usize - 1]
  }

  /// Writes the schema page with the given rows, row ids starting at 1.
  pub fn schema(&mut self, rows: &[Vec<u8>]) -> &mut Self {
    let cells: Vec<(u64, Vec<u8>)> = rows
      .iter()
      .enumerate()
      .map(|(i, payload)| (i as u64 + 1, payload.clone()))
      .collect();
    self.leaf(1, &cells)
  }

  /// Writes a table leaf page. Payloads must fit on the page.
  pub fn leaf(&mut self, page: u32, cells: &[(u64, Vec<u8>)]) -> &mut Self {
    let cells = cells
      .iter()
      .map(|(row_id, payload)| {
        let mut cell = varint::encode(payload.len() as u64);
        cell.extend(varint::encode(*row_id));
        cell.extend(payload);
        cell
      })
      .collect::<Vec<_>>();
    self.write_page(page, 0x0d, None, &cells)
  }

  /// Writes a table interior page from `(left_child, key)` cells.
  pub fn interior(&mut self, page: u32, cells: &[(u32, u64)], right_most: u32) -> &mut Self {
    let cells = cells
      .iter()
      .map(|(left, key)| {
        let mut cell = left.to_be_bytes().to_vec();
        cell.extend(varint::encode(*key));
        cell
      })
      .collect::<Vec<_>>();
    self.write_page(page, 0x05, Some(right_most), &cells)
  }

  /// Writes a leaf page holding one cell whose payload spills onto freshly
  /// appended overflow pages.
  pub fn leaf_with_overflow(&mut self, page: u32, row_id: u64, payload: &[u8]) -> &mut Self {
    let usable = self.page_size;
    let max_local = usable - 35;
    let min_local = (usable - 12) * 32 / 255 - 23;
    let local = if payload.len() <= max_local {
      payload.len()
    } else {
      let surplus = min_local + (payload.len() - min_local) % (usable - 4);
      if surplus <= max_local {
        surplus
      } else {
        min_local
      }
    };

    self.ensure_page(page);
    let mut rest = &payload[local..];
    let mut first_overflow = 0u32;
    let mut previous: Option<u32> = None;
    while !rest.is_empty() {
      let overflow = self.add_page();
      let take = rest.len().min(usable - 4);
      let data = &mut self.pages[overflow as usize - 1];
      data[4..4 + take].copy_from_slice(&rest[..take]);
      rest = &rest[take..];
      match previous {
        Some(prev) => self.pages[prev as usize - 1][..4].copy_from_slice(&overflow.to_be_bytes()),
        None => first_overflow = overflow,
      }
      previous = Some(overflow);
    }

    let mut cell = varint::encode(payload.len() as u64);
    cell.extend(varint::encode(row_id));
    cell.extend(&payload[..local]);
    if local < payload.len() {
      cell.extend(first_overflow.to_be_bytes());
    }
    self.write_page(page, 0x0d, None, &[cell])
  }

  fn write_page(&mut self, page: u32, tag: u8, right_most: Option<u32>, cells: &[Vec<u8>]) -> &mut Self {
    self.ensure_page(page);
    let page_size = self.page_size;
    let data = &mut self.pages[page as usize - 1];
    let base = if page == 1 { 100 } else { 0 };
    data[base..].fill(0);

    data[base] = tag;
    data[base + 3..base + 5].copy_from_slice(&(cells.len() as u16).to_be_bytes());
    let mut pointer_offset = base + 8;
    if let Some(right) = right_most {
      data[base + 8..base + 12].copy_from_slice(&right.to_be_bytes());
      pointer_offset += 4;
    }

    let mut content_start = page_size;
    for (i, cell) in cells.iter().enumerate() {
      content_start -= cell.len();
      assert!(
        content_start >= pointer_offset + 2 * cells.len(),
        "cells do not fit on page {page}"
      );
      data[content_start..content_start + cell.len()].copy_from_slice(cell);
      let slot = pointer_offset + 2 * i;
      data[slot..slot + 2].copy_from_slice(&(content_start as u16).to_be_bytes());
    }
    let content_field = if content_start == 65536 { 0 } else { content_start as u16 };
    data[base + 5..base + 7].copy_from_slice(&content_field.to_be_bytes());
    self
  }

  /// The finished image, with the file header written over page 1.
  pub fn build(&self) -> Vec<u8> {
    let mut image: Vec<u8> = self.pages.concat();
    image[..16].copy_from_slice(MAGIC);
    let size_field = if self.page_size == 65536 { 1 } else { self.page_size as u16 };
    image[16..18].copy_from_slice(&size_field.to_be_bytes());
    image[18] = 1;
    image[19] = 1;
    image[20] = 0;
    image[21] = 64;
    image[22] = 32;
    image[23] = 32;
    image[28..32].copy_from_slice(&(self.pages.len() as u32).to_be_bytes());
    image[44..48].copy_from_slice(&4u32.to_be_bytes());
    image[56..60].copy_from_slice(&1u32.to_be_bytes());
    image
  }
}
