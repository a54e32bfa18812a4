//! The schema table rooted at page 1, and the table catalog built from it.
//!
//! Schema rows have the shape `(type, name, tbl_name, rootpage, sql)`. Only
//! rows whose type is `table` become catalog entries.

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::{Error, Result};
use crate::source::ByteSource;
use crate::table::Row;
use crate::value::Value;
use crate::Database;

pub const SCHEMA_ROOT_PAGE: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
  pub name: String,
  pub root_page: u32,
  pub sql: String,
}

/// Reads every schema row and keeps the tables.
pub(crate) fn load<S: ByteSource>(db: &Database<S>) -> Result<BTreeMap<String, Table>> {
  let mut tables = BTreeMap::new();
  db.scan(SCHEMA_ROOT_PAGE, |row| {
    if let Some(table) = table_from_row(&row)? {
      debug!(name = %table.name, root_page = table.root_page, "found table");
      tables.insert(table.name.clone(), table);
    }
    Ok(())
  })?;
  Ok(tables)
}

fn table_from_row(row: &Row) -> Result<Option<Table>> {
  if expect_text(row, 0, "type")? != "table" {
    return Ok(None);
  }

  let name = expect_text(row, 1, "name")?.to_string();
  let root_page = column(row, 3, "rootpage")?;
  let root_page = root_page
    .as_integer()
    .ok_or_else(|| malformed(row, format!("rootpage is {}", root_page.type_name())))?;
  let root_page =
    u32::try_from(root_page).map_err(|_| malformed(row, format!("rootpage {root_page} is out of range")))?;
  let sql = expect_text(row, 4, "sql")?.to_string();

  Ok(Some(Table {
    name,
    root_page,
    sql,
  }))
}

fn column<'r>(row: &'r Row, index: usize, name: &str) -> Result<&'r Value> {
  row
    .get(index)
    .ok_or_else(|| malformed(row, format!("missing {name} column")))
}

fn expect_text<'r>(row: &'r Row, index: usize, name: &str) -> Result<&'r str> {
  let value = column(row, index, name)?;
  value
    .as_text()
    .ok_or_else(|| malformed(row, format!("{name} is {}, expected text", value.type_name())))
}

fn malformed(row: &Row, reason: String) -> Error {
  Error::MalformedSchema {
    row_id: row.row_id,
    reason,
  }
}
