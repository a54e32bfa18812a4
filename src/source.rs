//! Positioned, read-only access to a database image.

use std::{fs::File, path::Path, sync::Arc};

use bytes::Bytes;

use crate::error::{Error, Result};

/// A fixed-size byte range that supports reads at arbitrary offsets.
///
/// Reads take `&self`, so a `Sync` source can serve several readers at once.
pub trait ByteSource {
  /// Total length of the source in bytes.
  fn len(&self) -> u64;

  /// Fills `buf` with the bytes starting at `offset`. A read that would run
  /// past [`ByteSource::len`] fails without touching `buf`.
  fn read_exact_at(&self, offset: u64, buf: &mut [u8]) -> Result<()>;

  fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

impl ByteSource for [u8] {
  fn len(&self) -> u64 {
    <[u8]>::len(self) as u64
  }

  fn read_exact_at(&self, offset: u64, buf: &mut [u8]) -> Result<()> {
    let start = usize::try_from(offset)
      .map_err(|_| Error::out_of_bounds(usize::MAX, buf.len(), <[u8]>::len(self)))?;
    let src = crate::primitives::window(self, start, buf.len())?;
    buf.copy_from_slice(src);
    Ok(())
  }
}

impl ByteSource for Vec<u8> {
  fn len(&self) -> u64 {
    self.as_slice().len() as u64
  }

  fn read_exact_at(&self, offset: u64, buf: &mut [u8]) -> Result<()> {
    self.as_slice().read_exact_at(offset, buf)
  }
}

impl ByteSource for Bytes {
  fn len(&self) -> u64 {
    self.as_ref().len() as u64
  }

  fn read_exact_at(&self, offset: u64, buf: &mut [u8]) -> Result<()> {
    self.as_ref().read_exact_at(offset, buf)
  }
}

impl<S: ByteSource + ?Sized> ByteSource for &S {
  fn len(&self) -> u64 {
    (**self).len()
  }

  fn read_exact_at(&self, offset: u64, buf: &mut [u8]) -> Result<()> {
    (**self).read_exact_at(offset, buf)
  }
}

impl<S: ByteSource + ?Sized> ByteSource for Arc<S> {
  fn len(&self) -> u64 {
    (**self).len()
  }

  fn read_exact_at(&self, offset: u64, buf: &mut [u8]) -> Result<()> {
    (**self).read_exact_at(offset, buf)
  }
}

/// A database file read with positioned reads, so no seek cursor is shared
/// between readers.
#[derive(Debug)]
pub struct FileSource {
  file: File,
  len: u64,
}

impl FileSource {
  pub fn open(path: impl AsRef<Path>) -> Result<Self> {
    let file = File::open(path)?;
    Self::from_file(file)
  }

  pub fn from_file(file: File) -> Result<Self> {
    let len = file.metadata()?.len();
    Ok(Self { file, len })
  }
}

impl ByteSource for FileSource {
  fn len(&self) -> u64 {
    self.len
  }

  fn read_exact_at(&self, offset: u64, buf: &mut [u8]) -> Result<()> {
    let end = offset.checked_add(buf.len() as u64);
    if end.map_or(true, |end| end > self.len) {
      return Err(Error::OutOfBounds {
        offset,
        len: buf.len() as u64,
        available: self.len,
      });
    }
    read_file_at(&self.file, offset, buf)
  }
}

#[cfg(unix)]
fn read_file_at(file: &File, offset: u64, buf: &mut [u8]) -> Result<()> {
  use std::os::unix::fs::FileExt;
  file.read_exact_at(buf, offset)?;
  Ok(())
}

#[cfg(windows)]
fn read_file_at(file: &File, offset: u64, buf: &mut [u8]) -> Result<()> {
  use std::os::windows::fs::FileExt;
  let mut done = 0;
  while done < buf.len() {
    match file.seek_read(&mut buf[done..], offset + done as u64)? {
      0 => return Err(std::io::Error::from(std::io::ErrorKind::UnexpectedEof).into()),
      n => done += n,
    }
  }
  Ok(())
}
