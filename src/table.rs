use std::error::Error as StdError;

use crate::catalog::Table;
use crate::error::{Error, Result};
use crate::source::ByteSource;
use crate::value::Value;
use crate::Database;

/// One decoded table row.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
  pub row_id: i64,
  pub values: Vec<Value>,
}

impl Row {
  pub fn get(&self, column: usize) -> Option<&Value> {
    self.values.get(column)
  }
}

/// A table bound to the database it was discovered in.
#[derive(Debug)]
pub struct TableHandle<'db, S> {
  db: &'db Database<S>,
  table: &'db Table,
}

impl<'db, S: ByteSource> TableHandle<'db, S> {
  pub(crate) fn new(db: &'db Database<S>, table: &'db Table) -> Self {
    Self { db, table }
  }

  pub fn name(&self) -> &'db str {
    &self.table.name
  }

  /// The `CREATE TABLE` statement exactly as stored in the schema.
  pub fn sql(&self) -> &'db str {
    &self.table.sql
  }

  pub fn root_page(&self) -> u32 {
    self.table.root_page
  }

  pub fn table(&self) -> &'db Table {
    self.table
  }

  /// Streams every row to `on_row` in b-tree order.
  ///
  /// Returning an error from `on_row` stops the read; it comes back wrapped
  /// in [`Error::Callback`]. Rows already delivered stay delivered.
  pub fn read_rows<F, E>(&self, mut on_row: F) -> Result<()>
  where
    F: FnMut(Row) -> std::result::Result<(), E>,
    E: Into<Box<dyn StdError + Send + Sync + 'static>>,
  {
    self
      .db
      .scan(self.table.root_page, |row| on_row(row).map_err(Error::callback))
  }

  /// Reads the whole table into memory.
  pub fn rows(&self) -> Result<Vec<Row>> {
    let mut rows = Vec::new();
    self.db.scan(self.table.root_page, |row| {
      rows.push(row);
      Ok(())
    })?;
    Ok(rows)
  }
}
