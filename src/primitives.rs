//! Fixed-width big-endian readers.
//!
//! Every multibyte integer in the file format is stored most significant byte
//! first. The odd widths (24 and 48 bits) only show up as record column
//! values, where they are two's complement.

use bytes::Buf;

use crate::error::{Error, Result};

/// Returns `buf[offset..offset + len]`, or an out-of-bounds error.
pub fn window(buf: &[u8], offset: usize, len: usize) -> Result<&[u8]> {
  offset
    .checked_add(len)
    .and_then(|end| buf.get(offset..end))
    .ok_or_else(|| Error::out_of_bounds(offset, len, buf.len()))
}

/// Reads a `width`-byte unsigned big-endian integer, `1 <= width <= 8`.
pub fn read_uint(buf: &[u8], offset: usize, width: usize) -> Result<u64> {
  debug_assert!((1..=8).contains(&width));
  let mut bytes = window(buf, offset, width)?;
  Ok(bytes.get_uint(width))
}

/// Reads a `width`-byte two's complement big-endian integer, sign-extended.
pub fn read_int(buf: &[u8], offset: usize, width: usize) -> Result<i64> {
  let shift = 64 - 8 * width as u32;
  let raw = read_uint(buf, offset, width)?;
  Ok(((raw << shift) as i64) >> shift)
}

pub fn read_u8(buf: &[u8], offset: usize) -> Result<u8> {
  buf
    .get(offset)
    .copied()
    .ok_or_else(|| Error::out_of_bounds(offset, 1, buf.len()))
}

pub fn read_u16(buf: &[u8], offset: usize) -> Result<u16> {
  Ok(window(buf, offset, 2)?.get_u16())
}

pub fn read_u32(buf: &[u8], offset: usize) -> Result<u32> {
  Ok(window(buf, offset, 4)?.get_u32())
}

pub fn read_u64(buf: &[u8], offset: usize) -> Result<u64> {
  Ok(window(buf, offset, 8)?.get_u64())
}
