//! The file format's variable-length integer.
//!
//! A varint is 1 to 9 bytes long, most significant group first. The first
//! eight bytes each carry 7 bits of value and use the high bit as a
//! continuation flag. A ninth byte, when present, carries a full 8 bits and
//! always ends the integer.

use crate::error::{Error, Result};

pub const MAX_LEN: usize = 9;

/// Decodes the varint at `offset`, returning the value and the offset of the
/// first byte after it.
pub fn decode(buf: &[u8], offset: usize) -> Result<(u64, usize)> {
  let mut value = 0u64;
  for i in 0..MAX_LEN {
    let byte = *buf
      .get(offset + i)
      .ok_or_else(|| Error::out_of_bounds(offset, i + 1, buf.len()))?;

    if i == MAX_LEN - 1 {
      value = (value << 8) | byte as u64;
      break;
    }

    value = (value << 7) | (byte & 0x7f) as u64;
    if byte & 0x80 == 0 {
      return Ok((value, offset + i + 1));
    }
  }
  Ok((value, offset + MAX_LEN))
}

pub fn encoded_len(value: u64) -> usize {
  if value >> 56 != 0 {
    return MAX_LEN;
  }
  let bits = 64 - value.leading_zeros() as usize;
  bits.div_ceil(7).max(1)
}

pub fn encode(value: u64) -> Vec<u8> {
  if value >> 56 != 0 {
    let mut out = vec![0u8; MAX_LEN];
    out[MAX_LEN - 1] = value as u8;
    let mut rest = value >> 8;
    for byte in out[..MAX_LEN - 1].iter_mut().rev() {
      *byte = (rest & 0x7f) as u8 | 0x80;
      rest >>= 7;
    }
    return out;
  }

  let mut out = Vec::with_capacity(encoded_len(value));
  let mut rest = value;
  loop {
    out.push((rest & 0x7f) as u8);
    rest >>= 7;
    if rest == 0 {
      break;
    }
  }
  out.reverse();
  let last = out.len() - 1;
  for byte in &mut out[..last] {
    *byte |= 0x80;
  }
  out
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::error::ErrorKind;

  #[test]
  fn single_byte() {
    assert_eq!(decode(&[0x00], 0).unwrap(), (0, 1));
    assert_eq!(decode(&[0x7f], 0).unwrap(), (127, 1));
  }

  #[test]
  fn multi_byte_is_big_endian() {
    assert_eq!(decode(&[0x81, 0x00], 0).unwrap(), (128, 2));
    assert_eq!(decode(&[0x82, 0x2c], 0).unwrap(), (300, 2));
    assert_eq!(decode(&[0xff, 0x7f], 0).unwrap(), (16383, 2));
  }

  #[test]
  fn respects_offset() {
    let buf = [0xaa, 0xbb, 0x81, 0x01, 0x05];
    assert_eq!(decode(&buf, 2).unwrap(), (129, 4));
    assert_eq!(decode(&buf, 4).unwrap(), (5, 5));
  }

  #[test]
  fn ninth_byte_uses_all_bits() {
    let buf = [0xff; 9];
    assert_eq!(decode(&buf, 0).unwrap(), (u64::MAX, 9));

    let mut buf = [0x80; 10];
    buf[8] = 0xff;
    assert_eq!(decode(&buf, 0).unwrap(), (0xff, 9));
  }

  #[test]
  fn truncated_varint_is_an_error() {
    let err = decode(&[0x81, 0x82], 0).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Bounds);
    assert!(decode(&[], 0).is_err());
    assert!(decode(&[0x01], 1).is_err());
  }

  #[test]
  fn encode_matches_known_bytes() {
    assert_eq!(encode(0), vec![0x00]);
    assert_eq!(encode(300), vec![0x82, 0x2c]);
    assert_eq!(encode(u64::MAX), vec![0xff; 9]);
  }

  #[test]
  fn round_trip() {
    let mut values = vec![0, 1, 127, 128, 16383, 16384, u64::MAX];
    for shift in 0..64 {
      values.push(1u64 << shift);
      values.push((1u64 << shift) - 1);
      values.push((1u64 << shift) + 1);
    }

    for value in values {
      let bytes = encode(value);
      assert_eq!(bytes.len(), encoded_len(value), "length of {value}");
      assert_eq!(decode(&bytes, 0).unwrap(), (value, bytes.len()), "value {value}");
    }
  }

  #[test]
  fn encoded_len_boundaries() {
    assert_eq!(encoded_len(0x7f), 1);
    assert_eq!(encoded_len(0x80), 2);
    assert_eq!(encoded_len((1 << 56) - 1), 8);
    assert_eq!(encoded_len(1 << 56), 9);
  }
}
