use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use bytes::Bytes;
use tracing::{debug, warn};

use crate::btree_page::BTree;
use crate::catalog::Table;
use crate::dbheader::DbHeader;
use crate::pager::Pager;
use crate::record::Record;

pub mod btree_page;
pub mod catalog;
pub mod config;
pub mod dbheader;
pub mod error;
pub mod pager;
pub mod primitives;
pub mod record;
pub mod source;
pub mod table;
pub mod value;
pub mod varint;

pub use config::{ChildOrder, DuplicateRows, ReadOptions};
pub use error::{Error, ErrorKind, Result};
pub use source::{ByteSource, FileSource};
pub use table::{Row, TableHandle};
pub use value::Value;

/// A read-only SQLite database.
///
/// The table catalog is read once when the database is opened. Rows are read
/// straight from the source on every call; nothing is cached.
#[derive(Debug)]
pub struct Database<S> {
  pager: Pager<S>,
  db_header: DbHeader,
  options: ReadOptions,
  tables: BTreeMap<String, Table>,
}

impl Database<Bytes> {
  /// Opens an in-memory database image.
  pub fn from_bytes(data: impl Into<Bytes>) -> Result<Self> {
    Self::open(data.into())
  }
}

impl Database<FileSource> {
  pub fn open_path(path: impl AsRef<Path>) -> Result<Self> {
    Self::open(FileSource::open(path)?)
  }
}

impl<S: ByteSource> Database<S> {
  pub fn open(source: S) -> Result<Self> {
    Self::open_with(source, ReadOptions::default())
  }

  pub fn open_with(source: S, options: ReadOptions) -> Result<Self> {
    let db_header = DbHeader::read(&source)?;
    let pager = Pager::new(source, &db_header);
    let mut db = Database {
      pager,
      db_header,
      options,
      tables: BTreeMap::new(),
    };
    db.tables = catalog::load(&db)?;

    debug!(
      page_size = db.page_size(),
      page_count = db.page_count(),
      tables = db.tables.len(),
      "opened database"
    );
    Ok(db)
  }

  pub fn header(&self) -> &DbHeader {
    &self.db_header
  }

  pub fn options(&self) -> &ReadOptions {
    &self.options
  }

  pub fn page_size(&self) -> u32 {
    self.pager.page_size()
  }

  pub fn page_count(&self) -> u32 {
    self.pager.page_count()
  }

  pub fn pager(&self) -> &Pager<S> {
    &self.pager
  }

  /// Names of every table in the schema, sorted.
  pub fn table_names(&self) -> Vec<&str> {
    self.tables.keys().map(String::as_str).collect()
  }

  pub fn table(&self, name: &str) -> Result<TableHandle<'_, S>> {
    self
      .tables
      .get(name)
      .map(|table| TableHandle::new(self, table))
      .ok_or_else(|| Error::TableNotFound(name.to_string()))
  }

  /// Decodes every row of the table b-tree rooted at `root_page`.
  pub(crate) fn scan<F>(&self, root_page: u32, mut on_row: F) -> Result<()>
  where
    F: FnMut(Row) -> Result<()>,
  {
    let btree = BTree::new(&self.pager, self.options.child_order);
    let encoding = self.db_header.text_encoding;
    let mut seen = HashSet::new();

    btree.walk(root_page, &mut |row_id: u64, payload: Bytes| {
      if self.options.duplicate_rows == DuplicateRows::Skip && !seen.insert(row_id) {
        warn!(root_page, row_id, "skipping duplicate row id");
        return Ok(());
      }

      let record = Record::decode(&payload, encoding)?;
      on_row(Row {
        row_id: row_id as i64,
        values: record.values,
      })
    })
  }
}
