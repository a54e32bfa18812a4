use std::fmt::{self, Display, Formatter};

use bytes::Bytes;

/// A decoded column value.
///
/// There is one variant per serial type, so the stored width and signedness
/// of an integer survive decoding. Use [`Value::as_integer`] to compare
/// integers regardless of width.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
  Null,
  Int8(i8),
  Int16(i16),
  Int24(i32),
  Int32(i32),
  Int48(i64),
  Int64(i64),
  Float(f64),
  /// Serial type 8, the integer 0 stored without a body.
  Zero,
  /// Serial type 9, the integer 1 stored without a body.
  One,
  Blob(Bytes),
  Text(String),
}

impl Value {
  pub fn is_null(&self) -> bool {
    matches!(self, Value::Null)
  }

  /// Any integer variant, widened to `i64`.
  pub fn as_integer(&self) -> Option<i64> {
    match *self {
      Value::Int8(v) => Some(v as i64),
      Value::Int16(v) => Some(v as i64),
      Value::Int24(v) | Value::Int32(v) => Some(v as i64),
      Value::Int48(v) | Value::Int64(v) => Some(v),
      Value::Zero => Some(0),
      Value::One => Some(1),
      _ => None,
    }
  }

  pub fn as_float(&self) -> Option<f64> {
    match self {
      Value::Float(value) => Some(*value),
      _ => None,
    }
  }

  pub fn as_blob(&self) -> Option<&[u8]> {
    match self {
      Value::Blob(value) => Some(value),
      _ => None,
    }
  }

  pub fn as_text(&self) -> Option<&str> {
    match self {
      Value::Text(value) => Some(value),
      _ => None,
    }
  }

  /// Short name of the value's storage class, for error messages.
  pub fn type_name(&self) -> &'static str {
    match self {
      Value::Null => "null",
      Value::Float(_) => "float",
      Value::Blob(_) => "blob",
      Value::Text(_) => "text",
      _ => "integer",
    }
  }
}

impl Display for Value {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    match self {
      Value::Null => write!(f, "NULL"),
      Value::Float(value) => write!(f, "{}", value),
      Value::Blob(value) => write!(f, "{:?}", value),
      Value::Text(value) => write!(f, "{}", value),
      other => match other.as_integer() {
        Some(value) => write!(f, "{}", value),
        None => Ok(()),
      },
    }
  }
}
