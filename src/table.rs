//! A minimal in-memory table: ordered column names and rows of nullable
//! string cells.
//!
//! Only the operations the normalizers need are provided. Cells are kept as
//! text; an empty CSV field loads as null and null is written back as an
//! empty field. Placeholder tokens such as `NA`, `N/A`, `NaN` or `null` are
//! ordinary text here, so rows holding them are not dropped as missing.

use crate::error::{PipelineError, Result};
use std::io::{Read, Write};

pub type Cell = Option<String>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Empty table with the given header.
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Append a row. Short rows are padded with nulls; long rows are an error.
    pub fn push_row(&mut self, mut row: Vec<Cell>) -> Result<()> {
        if row.len() > self.columns.len() {
            return Err(PipelineError::MalformedRecord(format!(
                "row has {} cells but the table has {} columns",
                row.len(),
                self.columns.len()
            )));
        }
        row.resize(self.columns.len(), None);
        self.rows.push(row);
        Ok(())
    }

    /// Column names in order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of column `name`.
    ///
    /// # Errors
    ///
    /// [`PipelineError::MissingColumn`] when the table has no such column.
    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| PipelineError::MissingColumn {
                column: name.to_string(),
            })
    }

    /// Rename columns in place; `f` returns the new name or `None` to keep it.
    pub fn rename_columns(&mut self, f: impl Fn(&str) -> Option<String>) {
        for column in &mut self.columns {
            if let Some(new_name) = f(column) {
                *column = new_name;
            }
        }
    }

    /// Keep only rows whose `column` equals `value` exactly. Nulls never match.
    pub fn filter_eq(&mut self, column: &str, value: &str) -> Result<usize> {
        let idx = self.column_index(column)?;
        let before = self.rows.len();
        self.rows.retain(|r| r[idx].as_deref() == Some(value));
        Ok(before - self.rows.len())
    }

    /// Drop the named columns that exist; absent names are ignored.
    /// Returns how many columns were removed.
    pub fn drop_columns<S: AsRef<str>>(&mut self, names: &[S]) -> usize {
        let keep: Vec<bool> = self
            .columns
            .iter()
            .map(|c| !names.iter().any(|n| n.as_ref() == c))
            .collect();
        let removed = keep.iter().filter(|k| !**k).count();
        if removed == 0 {
            return 0;
        }

        self.columns = retain_by_mask(std::mem::take(&mut self.columns), &keep);
        for row in &mut self.rows {
            *row = retain_by_mask(std::mem::take(row), &keep);
        }
        removed
    }

    /// Remove rows holding a null in any of `columns`. Returns the number removed.
    pub fn drop_nulls<S: AsRef<str>>(&mut self, columns: &[S]) -> Result<usize> {
        let idxs = self.indexes(columns)?;
        let before = self.rows.len();
        self.rows.retain(|r| idxs.iter().all(|&i| r[i].is_some()));
        Ok(before - self.rows.len())
    }

    /// Replace nulls in `columns` with `fill`. Returns the number of cells filled.
    pub fn fill_nulls<S: AsRef<str>>(&mut self, columns: &[S], fill: &str) -> Result<usize> {
        let idxs = self.indexes(columns)?;
        let mut filled = 0;
        for row in &mut self.rows {
            for &i in &idxs {
                if row[i].is_none() {
                    row[i] = Some(fill.to_string());
                    filled += 1;
                }
            }
        }
        Ok(filled)
    }

    /// Append `new_column` computed from the cells of `source`.
    pub fn derive_column(
        &mut self,
        source: &str,
        new_column: &str,
        f: impl Fn(Option<&str>) -> Cell,
    ) -> Result<()> {
        let idx = self.column_index(source)?;
        for row in &mut self.rows {
            let derived = f(row[idx].as_deref());
            row.push(derived);
        }
        self.columns.push(new_column.to_string());
        Ok(())
    }

    /// Parse CSV with a header row. Ragged rows are an error.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);
        let columns = rdr.headers()?.iter().map(str::to_string).collect();
        let mut table = Table::new(columns);
        for record in rdr.records() {
            let record = record?;
            let row = record
                .iter()
                .map(|field| (!field.is_empty()).then(|| field.to_string()))
                .collect();
            table.push_row(row)?;
        }
        Ok(table)
    }

    /// Write the header and every row as CSV.
    ///
    /// # Arguments
    ///
    /// * `writer` - Destination; flushed before returning
    ///
    /// # Returns
    ///
    /// `Ok(())` once every record is written, or the first CSV or I/O error.
    pub fn to_csv_writer<W: Write>(&self, writer: W) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(&self.columns)?;
        for row in &self.rows {
            wtr.write_record(row.iter().map(|c| c.as_deref().unwrap_or("")))?;
        }
        wtr.flush()?;
        Ok(())
    }

    fn indexes<S: AsRef<str>>(&self, columns: &[S]) -> Result<Vec<usize>> {
        columns
            .iter()
            .map(|c| self.column_index(c.as_ref()))
            .collect()
    }
}

#[cfg(test)]
impl Table {
    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// Cell at `row` in column `name`, `None` when null.
    pub fn value(&self, row: usize, name: &str) -> Result<Option<&str>> {
        let idx = self.column_index(name)?;
        Ok(self
            .rows
            .get(row)
            .and_then(|r| r[idx].as_deref()))
    }

    /// Every cell of column `name`, top to bottom.
    pub fn column_values(&self, name: &str) -> Result<Vec<Option<&str>>> {
        let idx = self.column_index(name)?;
        Ok(self.rows.iter().map(|r| r[idx].as_deref()).collect())
    }
}

fn retain_by_mask<T>(items: Vec<T>, keep: &[bool]) -> Vec<T> {
    items
        .into_iter()
        .zip(keep)
        .filter_map(|(item, &k)| k.then_some(item))
        .collect()
}
