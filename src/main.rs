use anyhow::{bail, Context, Result};
use sqlite_reader::{Database, FileSource, Row};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
  init_tracing();

  // Parse arguments
  let args = std::env::args().collect::<Vec<_>>();
  match args.len() {
    0 | 1 => bail!("Missing <database path> and <command>"),
    2 => bail!("Missing <command>"),
    _ => {}
  }

  let db = Database::open_path(&args[1]).with_context(|| format!("Failed to open {}", args[1]))?;

  // Parse command and act accordingly
  let command = &args[2];
  match command.as_str() {
    ".dbinfo" => {
      println!("database page size: {}", db.page_size());
      println!("number of tables: {}", db.table_names().len());
    }
    ".tables" => println!("{}", db.table_names().join(" ")),
    ".schema" => {
      for name in db.table_names() {
        println!("{};", db.table(name)?.sql());
      }
    }
    "dump" => {
      let names = match args.get(3) {
        Some(name) => vec![name.as_str()],
        None => db.table_names(),
      };
      for name in names {
        dump(&db, name)?;
      }
    }
    _ => bail!("Missing or invalid command passed: {}", command),
  }

  Ok(())
}

fn dump(db: &Database<FileSource>, name: &str) -> Result<()> {
  let table = db.table(name)?;
  info!(name, sql = table.sql(), "table");
  table
    .read_rows(|row: Row| -> Result<()> {
      let line = row
        .values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("|");
      println!("{line}");
      Ok(())
    })
    .with_context(|| format!("Failed to read table {name}"))
}

fn init_tracing() {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .with_target(false)
    .init();
}
