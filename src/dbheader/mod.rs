use crate::error::{Error, Result};
use crate::primitives::{read_u16, read_u32, read_u8};
use crate::source::ByteSource;

pub const HEADER_SIZE: usize = 100;
pub const MAGIC: &[u8; 16] = b"SQLite format 3\0";

/// Sqlite Database Header
///
/// The first 100 bytes of the database file comprise the database file header.
/// All multibyte fields are stored big-endian.
///
/// +------+----+-----------------------------------------------------------------------------------------------------------------------------------------+
/// |Offset|Size|Description                                                                                                                              |
/// +------+----+-----------------------------------------------------------------------------------------------------------------------------------------|
/// |0     |16  |The header string: "SQLite format 3\000"                                                                                                 |
/// |16    |2   |The database page size in bytes. Must be a power of two between 512 and 32768 inclusive or the value 1 representing a page size of 65536.|
/// |18    |1   |File format write version. 1 for legacy; 2 for WAL.                                                                                      |
/// |19    |1   |File format read version. 1 for legacy; 2 for WAL.                                                                                       |
/// |20    |1   |Bytes of unused "reserved" space at the end of each page. Usually 0.                                                                     |
/// |28    |4   |Size of the database file in pages. The "in-header database size".                                                                       |
/// |44    |4   |The schema format number. Supported schema formats are 1 2 3 and 4.                                                                      |
/// |56    |4   |The database text encoding. A value of 1 means UTF-8. A value of 2 means UTF-16le. A value of 3 means UTF-16be.                          |
/// |96    |4   |SQLITE_VERSION_NUMBER                                                                                                                    |
/// +------+----+-----------------------------------------------------------------------------------------------------------------------------------------+
///
/// Only the fields a reader needs are kept. The in-header page count is
/// informational; the page range is derived from the source length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DbHeader {
  pub page_size: u32,
  pub file_format_write_version: u8,
  pub file_format_read_version: u8,
  pub reserved_space: u8,
  pub database_size: u32,
  pub schema_format_number: u32,
  pub text_encoding: TextEncoding,
  pub sqlite_version_number: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextEncoding {
  #[default]
  Utf8,
  Utf16Le,
  Utf16Be,
}

impl TextEncoding {
  fn from_header(value: u32) -> Result<Self> {
    match value {
      // Zero shows up in databases that were never written to.
      0 | 1 => Ok(TextEncoding::Utf8),
      2 => Ok(TextEncoding::Utf16Le),
      3 => Ok(TextEncoding::Utf16Be),
      other => Err(Error::InvalidText(format!("unknown text encoding {other}"))),
    }
  }
}

impl DbHeader {
  /// Reads and validates the header at the start of `source`. The magic
  /// string is checked before anything else is interpreted.
  pub fn read<S: ByteSource + ?Sized>(source: &S) -> Result<Self> {
    let available = source.len().min(HEADER_SIZE as u64) as usize;
    let mut bytes = [0u8; HEADER_SIZE];
    source.read_exact_at(0, &mut bytes[..available])?;

    if available < MAGIC.len() || &bytes[..MAGIC.len()] != MAGIC {
      return Err(Error::BadMagic {
        found: bytes[..available.min(MAGIC.len())].to_vec(),
      });
    }
    if available < HEADER_SIZE {
      return Err(Error::TruncatedHeader {
        len: available as u64,
      });
    }

    DbHeader::try_from(&bytes)
  }

  /// Page size minus the reserved region at the end of every page.
  pub fn usable_size(&self) -> u32 {
    self.page_size - self.reserved_space as u32
  }
}

impl TryFrom<&[u8; HEADER_SIZE]> for DbHeader {
  type Error = Error;

  fn try_from(bytes: &[u8; HEADER_SIZE]) -> Result<Self> {
    if &bytes[..MAGIC.len()] != MAGIC {
      return Err(Error::BadMagic {
        found: bytes[..MAGIC.len()].to_vec(),
      });
    }

    let page_size = match read_u16(bytes, 16)? {
      1 => 65536,
      n if n.is_power_of_two() && n >= 512 => n as u32,
      n => return Err(Error::InvalidPageSize(n as u32)),
    };

    let header = DbHeader {
      page_size,
      file_format_write_version: read_u8(bytes, 18)?,
      file_format_read_version: read_u8(bytes, 19)?,
      reserved_space: read_u8(bytes, 20)?,
      database_size: read_u32(bytes, 28)?,
      schema_format_number: read_u32(bytes, 44)?,
      text_encoding: TextEncoding::from_header(read_u32(bytes, 56)?)?,
      sqlite_version_number: read_u32(bytes, 96)?,
    };

    // The smallest usable size the format allows.
    if header.usable_size() < 480 {
      return Err(Error::InvalidPageSize(page_size));
    }

    Ok(header)
  }
}
