//! Source normalizers: raw exports in, cleaned interim tables out.
//!
//! Each source is described by a [`SourceProfile`] and run through the same
//! [`normalize_table`] routine:
//!
//! 1. keep rows matching the profile's categorical filters
//! 2. drop administrative columns
//! 3. drop (or fill) rows with nulls in the required text columns
//! 4. append a cleaned column per text column, dropping the raw one
//! 5. append a word-count column per cleaned column
//!
//! | Source | Module | Input | Output |
//! |--------|--------|-------|--------|
//! | New York Times | [`nyt`] | `raw/nyt_headlines/*.csv` | `interim/nyt_data/` |
//! | Guardian API | [`guardian`] | `raw/guardian/*.json` | `interim/gu_data/` |
//! | Guardian tweets | [`twitter`] | `raw/gu_twitter/gu_tweets.csv` | `interim/gu_twitter_data/` |
//!
//! Files are processed one at a time and independently: a file that fails
//! is recorded in the [`RunReport`] and the next one proceeds.

pub mod guardian;
pub mod nyt;
pub mod twitter;

use crate::clean::{WordCountMode, clean_txt, word_count};
use crate::config::NullPolicy;
use crate::error::Result;
use crate::outputs::csv::write_table;
use crate::table::Table;
use crate::utils::csv_output_path;
use itertools::Itertools;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, instrument, warn};

/// A free-text column and the names of the columns derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextColumn {
    pub source: &'static str,
    pub cleaned: &'static str,
    pub count: &'static str,
    /// Keep the raw column next to the cleaned one.
    pub keep_source: bool,
}

impl TextColumn {
    /// `<name>` -> `cl_<name>` / `word_count_<name>`, raw column dropped.
    pub const fn standard(source: &'static str, cleaned: &'static str, count: &'static str) -> Self {
        Self {
            source,
            cleaned,
            count,
            keep_source: false,
        }
    }
}

/// Everything that differs between sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceProfile {
    pub name: &'static str,
    /// `(column, value)` pairs that must all match exactly.
    pub filters: &'static [(&'static str, &'static str)],
    pub drop_columns: &'static [&'static str],
    /// Columns that must be non-null before cleaning.
    pub required: &'static [&'static str],
    pub null_policy: NullPolicy,
    pub text_columns: &'static [TextColumn],
}

/// Apply `profile` to `table` and return the normalized table.
#[instrument(level = "debug", skip_all, fields(source = profile.name, rows_in = table.len()))]
pub fn normalize_table(mut table: Table, profile: &SourceProfile, mode: WordCountMode) -> Result<Table> {
    for (column, value) in profile.filters {
        let removed = table.filter_eq(column, value)?;
        debug!(column, value, removed, "Applied filter");
    }

    let dropped = table.drop_columns(profile.drop_columns);
    debug!(dropped, "Dropped administrative columns");

    match profile.null_policy {
        NullPolicy::Drop => {
            let removed = table.drop_nulls(profile.required)?;
            debug!(removed, "Dropped rows with missing text");
        }
        NullPolicy::Fill => {
            let filled = table.fill_nulls(profile.required, "")?;
            debug!(filled, "Filled missing text with empty strings");
        }
    }

    for text in profile.text_columns {
        table.derive_column(text.source, text.cleaned, |v| Some(clean_txt(v.unwrap_or(""))))?;
    }
    let raw_columns: Vec<&str> = profile
        .text_columns
        .iter()
        .filter(|t| !t.keep_source)
        .map(|t| t.source)
        .collect();
    table.drop_columns(&raw_columns);

    for text in profile.text_columns {
        table.derive_column(text.cleaned, text.count, |v| {
            v.map(|s| word_count(s, mode).to_string())
        })?;
    }

    debug!(rows_out = table.len(), "Normalized table");
    Ok(table)
}

/// Result of processing one raw file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    Written { output: PathBuf, rows: usize },
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub source: &'static str,
    pub input: PathBuf,
    pub outcome: FileOutcome,
}

/// Per-file outcomes of a normalization run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub files: Vec<FileReport>,
}

impl RunReport {
    pub fn record(&mut self, source: &'static str, input: &Path, outcome: FileOutcome) {
        self.files.push(FileReport {
            source,
            input: input.to_path_buf(),
            outcome,
        });
    }

    pub fn succeeded(&self) -> usize {
        self.files
            .iter()
            .filter(|f| matches!(f.outcome, FileOutcome::Written { .. }))
            .count()
    }

    pub fn failed(&self) -> Vec<&FileReport> {
        self.files
            .iter()
            .filter(|f| matches!(f.outcome, FileOutcome::Failed { .. }))
            .collect()
    }

    pub fn has_failures(&self) -> bool {
        !self.failed().is_empty()
    }

    pub fn log_summary(&self) {
        for (source, files) in &self.files.iter().chunk_by(|f| f.source) {
            let files: Vec<_> = files.collect();
            let rows: usize = files
                .iter()
                .map(|f| match f.outcome {
                    FileOutcome::Written { rows, .. } => rows,
                    FileOutcome::Failed { .. } => 0,
                })
                .sum();
            info!(source, files = files.len(), rows, "Source summary");
        }

        for file in &self.files {
            match &file.outcome {
                FileOutcome::Written { output, rows } => {
                    debug!(input = %file.input.display(), output = %output.display(), rows, "Written");
                }
                FileOutcome::Failed { error } => {
                    warn!(input = %file.input.display(), %error, "Failed");
                }
            }
        }

        let failed = self.failed();
        if failed.is_empty() {
            info!(succeeded = self.succeeded(), "All files normalized");
        } else {
            error!(
                succeeded = self.succeeded(),
                failed = failed.len(),
                files = %failed.iter().map(|f| f.input.display()).join(", "),
                "Some files failed to normalize"
            );
        }
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} file(s) normalized, {} failed",
            self.succeeded(),
            self.failed().len()
        )
    }
}

/// Normalize each of `inputs` with `load_and_normalize`, writing the result
/// to `out_dir` under the input's stem with a `.csv` extension.
pub fn normalize_files(
    source: &'static str,
    inputs: &[PathBuf],
    out_dir: &Path,
    report: &mut RunReport,
    load_and_normalize: impl Fn(&Path) -> Result<Table>,
) {
    if inputs.is_empty() {
        warn!(source, "No raw files found; skipping source");
        return;
    }
    for input in inputs {
        info!(source, input = %input.display(), "Processing file");
        let output = csv_output_path(input, out_dir);
        let outcome = load_and_normalize(input.as_path())
            .and_then(|table| write_table(&table, &output).map(|_| table.len()));
        match outcome {
            Ok(rows) => report.record(source, input, FileOutcome::Written { output, rows }),
            Err(e) => {
                error!(source, input = %input.display(), error = %e, "File failed; continuing");
                report.record(source, input, FileOutcome::Failed { error: e.to_string() });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;
    use tempfile::TempDir;

    const PROFILE: SourceProfile = SourceProfile {
        name: "test",
        filters: &[("kind", "article")],
        drop_columns: &["junk"],
        required: &["title"],
        null_policy: NullPolicy::Drop,
        text_columns: &[TextColumn::standard("title", "cl_title", "word_count_title")],
    };

    fn table(csv: &str) -> Table {
        Table::from_csv_reader(csv.as_bytes()).unwrap()
    }

    #[test]
    fn test_normalize_table_pipeline() {
        let input = table(
            "id,kind,junk,title\n\
             1,article,x,Storm hits 3 towns!\n\
             2,blog,x,Ignored\n\
             3,article,x,\n",
        );
        let out = normalize_table(input, &PROFILE, WordCountMode::Delimiter).unwrap();

        assert_eq!(out.columns(), ["id", "kind", "cl_title", "word_count_title"]);
        assert_eq!(out.len(), 1);
        assert_eq!(out.value(0, "cl_title").unwrap(), Some("Storm hits towns"));
        assert_eq!(out.value(0, "word_count_title").unwrap(), Some("3"));
    }

    #[test]
    fn test_fill_policy_keeps_rows() {
        let profile = SourceProfile {
            null_policy: NullPolicy::Fill,
            ..PROFILE
        };
        let input = table("id,kind,junk,title\n1,article,x,\n");
        let out = normalize_table(input, &profile, WordCountMode::Delimiter).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out.value(0, "cl_title").unwrap(), Some(""));
        assert_eq!(out.value(0, "word_count_title").unwrap(), Some("1"));

        let input = table("id,kind,junk,title\n1,article,x,\n");
        let out = normalize_table(input, &profile, WordCountMode::Tokens).unwrap();
        assert_eq!(out.value(0, "word_count_title").unwrap(), Some("0"));
    }

    #[test]
    fn test_keep_source_column() {
        let profile = SourceProfile {
            text_columns: &[TextColumn {
                source: "title",
                cleaned: "clean_text",
                count: "word_count",
                keep_source: true,
            }],
            ..PROFILE
        };
        let input = table("kind,title\narticle,Hello #World\n");
        let out = normalize_table(input, &profile, WordCountMode::Delimiter).unwrap();
        assert_eq!(out.columns(), ["kind", "title", "clean_text", "word_count"]);
        assert_eq!(out.value(0, "title").unwrap(), Some("Hello #World"));
        assert_eq!(out.value(0, "clean_text").unwrap(), Some("Hello World"));
    }

    #[test]
    fn test_missing_filter_column_is_an_error() {
        let input = table("id,title\n1,x\n");
        let err = normalize_table(input, &PROFILE, WordCountMode::Delimiter).unwrap_err();
        assert!(matches!(err, PipelineError::MissingColumn { column } if column == "kind"));
    }

    #[test]
    fn test_normalize_files_isolates_failures() {
        let dir = TempDir::new().unwrap();
        let out_dir = dir.path().join("out");
        let inputs = vec![dir.path().join("good.csv"), dir.path().join("bad.csv")];
        let mut report = RunReport::default();

        normalize_files("test", &inputs, &out_dir, &mut report, |path| {
            if path.ends_with("bad.csv") {
                return Err(PipelineError::MalformedRecord("bad".into()));
            }
            let mut t = Table::new(vec!["a".into()]);
            t.push_row(vec![Some("1".into())])?;
            Ok(t)
        });

        assert_eq!(report.succeeded(), 1);
        assert!(report.has_failures());
        assert_eq!(report.failed()[0].input, inputs[1]);
        assert!(out_dir.join("good.csv").exists());
        assert!(!out_dir.join("bad.csv").exists());
        assert_eq!(report.to_string(), "1 file(s) normalized, 1 failed");
    }
}
