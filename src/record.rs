use bytes::Bytes;

use crate::dbheader::TextEncoding;
use crate::error::{Error, Result};
use crate::primitives::{read_int, read_u64, window};
use crate::value::Value;
use crate::varint;

/// # [Record Format](https://www.sqlite.org/fileformat.html#record-format)
///
/// A record contains a header and a body, in that order. The header begins with a single varint which determines the total number of bytes in the header.
/// The varint value is the size of the header in bytes including the size varint itself.
/// Following the size varint are one or more additional varints, one per column.
/// These additional varints are called "serial type" numbers and determine the datatype of each column, according to the following chart:
/// +-------------+------------+--------------------------------------------------------------------------+
/// |Serial Type  |Content Size|Meaning                                                                   |
/// +-------------+------------+--------------------------------------------------------------------------|
/// |0            |0           |Value is a NULL.                                                          |
/// |1            |1           |Value is an 8-bit twos-complement integer.                                |
/// |2            |2           |Value is a big-endian 16-bit twos-complement integer.                     |
/// |3            |3           |Value is a big-endian 24-bit twos-complement integer.                     |
/// |4            |4           |Value is a big-endian 32-bit twos-complement integer.                     |
/// |5            |6           |Value is a big-endian 48-bit twos-complement integer.                     |
/// |6            |8           |Value is a big-endian 64-bit twos-complement integer.                     |
/// |7            |8           |Value is a big-endian IEEE 754-2008 64-bit floating point number.         |
/// |8            |0           |Value is the integer 0. (Only available for schema format 4 and higher.)  |
/// |9            |0           |Value is the integer 1. (Only available for schema format 4 and higher.)  |
/// |10,11        |variable    |Reserved for internal use. Never valid in a database file.                |
/// |N≥12 and even|(N-12)/2    |Value is a BLOB that is (N-12)/2 bytes in length.                         |
/// |N≥13 and odd |(N-13)/2    |Value is a string in the text encoding and (N-13)/2 bytes in length.      |
/// +-------------+------------+--------------------------------------------------------------------------+
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
  pub values: Vec<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SerialType {
  Null,
  Int8,
  Int16,
  Int24,
  Int32,
  Int48,
  Int64,
  Float,
  Zero,
  One,
  Blob(usize),
  Text(usize),
}

impl TryFrom<u64> for SerialType {
  type Error = Error;

  fn try_from(code: u64) -> Result<Self> {
    // Lengths beyond the address space can never be in bounds; saturate
    // and let the body read fail.
    let len = |base: u64| usize::try_from((code - base) / 2).unwrap_or(usize::MAX);
    Ok(match code {
      0 => SerialType::Null,
      1 => SerialType::Int8,
      2 => SerialType::Int16,
      3 => SerialType::Int24,
      4 => SerialType::Int32,
      5 => SerialType::Int48,
      6 => SerialType::Int64,
      7 => SerialType::Float,
      8 => SerialType::Zero,
      9 => SerialType::One,
      n if n >= 12 && n % 2 == 0 => SerialType::Blob(len(12)),
      n if n >= 13 => SerialType::Text(len(13)),
      n => return Err(Error::UnknownSerialType(n)),
    })
  }
}

impl SerialType {
  /// Number of body bytes the value occupies.
  pub fn content_size(self) -> usize {
    match self {
      SerialType::Null | SerialType::Zero | SerialType::One => 0,
      SerialType::Int8 => 1,
      SerialType::Int16 => 2,
      SerialType::Int24 => 3,
      SerialType::Int32 => 4,
      SerialType::Int48 => 6,
      SerialType::Int64 | SerialType::Float => 8,
      SerialType::Blob(len) | SerialType::Text(len) => len,
    }
  }
}

impl Record {
  /// Decodes a full (overflow already reassembled) record payload.
  pub fn decode(payload: &Bytes, encoding: TextEncoding) -> Result<Self> {
    let (header_size, mut offset) = varint::decode(payload, 0)?;
    if header_size > payload.len() as u64 {
      return Err(Error::HeaderTooLong {
        header_len: header_size,
        payload_len: payload.len(),
      });
    }
    let header_size = header_size as usize;
    let header = &payload[..header_size];

    let mut serial_types = Vec::new();
    while offset < header_size {
      let (code, next) = varint::decode(header, offset)?;
      serial_types.push(SerialType::try_from(code)?);
      offset = next;
    }

    let mut values = Vec::with_capacity(serial_types.len());
    let mut offset = header_size;
    for serial_type in serial_types {
      let size = serial_type.content_size();
      values.push(Self::parse_value(serial_type, payload, offset, encoding)?);
      offset += size;
    }

    Ok(Record { values })
  }

  fn parse_value(
    serial_type: SerialType,
    payload: &Bytes,
    offset: usize,
    encoding: TextEncoding,
  ) -> Result<Value> {
    let value = match serial_type {
      SerialType::Null => Value::Null,
      SerialType::Zero => Value::Zero,
      SerialType::One => Value::One,
      SerialType::Int8 => Value::Int8(read_int(payload, offset, 1)? as i8),
      SerialType::Int16 => Value::Int16(read_int(payload, offset, 2)? as i16),
      SerialType::Int24 => Value::Int24(read_int(payload, offset, 3)? as i32),
      SerialType::Int32 => Value::Int32(read_int(payload, offset, 4)? as i32),
      SerialType::Int48 => Value::Int48(read_int(payload, offset, 6)?),
      SerialType::Int64 => Value::Int64(read_int(payload, offset, 8)?),
      SerialType::Float => Value::Float(f64::from_bits(read_u64(payload, offset)?)),
      SerialType::Blob(len) => {
        window(payload, offset, len)?;
        Value::Blob(payload.slice(offset..offset + len))
      }
      SerialType::Text(len) => Value::Text(decode_text(window(payload, offset, len)?, encoding)?),
    };
    Ok(value)
  }
}

fn decode_text(bytes: &[u8], encoding: TextEncoding) -> Result<String> {
  let utf16 = |to_unit: fn([u8; 2]) -> u16| -> Result<String> {
    if bytes.len() % 2 != 0 {
      return Err(Error::InvalidText(format!(
        "odd length {} for UTF-16 text",
        bytes.len()
      )));
    }
    let units: Vec<u16> = bytes
      .chunks_exact(2)
      .map(|pair| to_unit([pair[0], pair[1]]))
      .collect();
    String::from_utf16(&units).map_err(|e| Error::InvalidText(e.to_string()))
  };

  match encoding {
    TextEncoding::Utf8 => {
      String::from_utf8(bytes.to_vec()).map_err(|e| Error::InvalidText(e.to_string()))
    }
    TextEncoding::Utf16Le => utf16(u16::from_le_bytes),
    TextEncoding::Utf16Be => utf16(u16::from_be_bytes),
  }
}
