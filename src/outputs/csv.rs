//! Interim CSV output for normalized tables.

use crate::error::Result;
use crate::table::Table;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;
use tracing::{info, instrument};

/// Write `table` to `path`, creating the parent directory on first use.
#[instrument(level = "info", skip_all, fields(path = %path.display(), rows = table.len()))]
pub fn write_table(table: &Table, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = File::create(path)?;
    table.to_csv_writer(BufWriter::new(file))?;
    info!(columns = table.columns().len(), "Wrote normalized table");
    Ok(())
}

/// Load a CSV file with a header row.
#[instrument(level = "debug", skip_all, fields(path = %path.display()))]
pub fn read_table(path: &Path) -> Result<Table> {
    let file = File::open(path)?;
    Table::from_csv_reader(file)
}
