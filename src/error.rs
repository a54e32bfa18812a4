use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Broad classification of an [`Error`], for callers that only care about
/// which class of failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  /// The bytes do not follow the file format.
  Format,
  /// A read ran past the end of the buffer it was given.
  Bounds,
  /// Structurally valid bytes that point somewhere they must not.
  Corruption,
  /// A catalog lookup missed.
  NotFound,
  /// A caller supplied callback failed or asked to stop.
  Callback,
  Io,
}

#[derive(Error, Debug)]
pub enum Error {
  #[error("I/O error: {0}")]
  Io(#[from] std::io::Error),

  #[error("bad magic: expected \"SQLite format 3\\0\", found {found:02x?}")]
  BadMagic { found: Vec<u8> },

  #[error("database header is truncated: {len} bytes, need 100")]
  TruncatedHeader { len: u64 },

  #[error("invalid page size {0}")]
  InvalidPageSize(u32),

  #[error("unknown b-tree page type 0x{tag:02x} on page {page}")]
  UnknownPageType { page: u32, tag: u8 },

  #[error("record header length {header_len} exceeds payload length {payload_len}")]
  HeaderTooLong { header_len: u64, payload_len: usize },

  #[error("unknown serial type {0}")]
  UnknownSerialType(u64),

  #[error("invalid text value: {0}")]
  InvalidText(String),

  #[error("malformed schema row {row_id}: {reason}")]
  MalformedSchema { row_id: i64, reason: String },

  #[error("read of {len} bytes at offset {offset} exceeds buffer of {available} bytes")]
  OutOfBounds {
    offset: u64,
    len: u64,
    available: u64,
  },

  #[error("page {page} is out of range (database has {page_count} pages)")]
  PageOutOfRange { page: u64, page_count: u32 },

  #[error("page {page} points at page {target}, which is already being read")]
  Cycle { page: u32, target: u32 },

  #[error("broken overflow chain at page {page}: {reason}")]
  BrokenOverflowChain { page: u32, reason: String },

  #[error("table not found: {0}")]
  TableNotFound(String),

  #[error(transparent)]
  Callback(Box<dyn std::error::Error + Send + Sync + 'static>),
}

impl Error {
  pub fn kind(&self) -> ErrorKind {
    match self {
      Error::Io(_) => ErrorKind::Io,
      Error::BadMagic { .. }
      | Error::TruncatedHeader { .. }
      | Error::InvalidPageSize(_)
      | Error::UnknownPageType { .. }
      | Error::HeaderTooLong { .. }
      | Error::UnknownSerialType(_)
      | Error::InvalidText(_)
      | Error::MalformedSchema { .. } => ErrorKind::Format,
      Error::OutOfBounds { .. } => ErrorKind::Bounds,
      Error::PageOutOfRange { .. } | Error::Cycle { .. } | Error::BrokenOverflowChain { .. } => {
        ErrorKind::Corruption
      }
      Error::TableNotFound(_) => ErrorKind::NotFound,
      Error::Callback(_) => ErrorKind::Callback,
    }
  }

  /// Wraps a caller error so it can travel back out of a row read.
  pub fn callback<E>(err: E) -> Self
  where
    E: Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
  {
    Error::Callback(err.into())
  }

  pub(crate) fn out_of_bounds(offset: usize, len: usize, available: usize) -> Self {
    Error::OutOfBounds {
      offset: offset as u64,
      len: len as u64,
      available: available as u64,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[derive(Debug, thiserror::Error)]
  #[error("stop")]
  struct Stop;

  #[test]
  fn callback_errors_keep_the_original() {
    let err = Error::callback(Stop);
    assert_eq!(err.kind(), ErrorKind::Callback);
    match err {
      Error::Callback(inner) => assert!(inner.downcast_ref::<Stop>().is_some()),
      other => panic!("unexpected error: {other}"),
    }
  }

  #[test]
  fn kinds() {
    assert_eq!(Error::UnknownSerialType(10).kind(), ErrorKind::Format);
    assert_eq!(Error::out_of_bounds(4, 2, 5).kind(), ErrorKind::Bounds);
    assert_eq!(Error::Cycle { page: 2, target: 2 }.kind(), ErrorKind::Corruption);
    assert_eq!(Error::TableNotFound("t".into()).kind(), ErrorKind::NotFound);
  }
}
