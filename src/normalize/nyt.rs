//! New York Times CSV exports.
//!
//! Only news articles are kept (`doc_type == "article"` and
//! `material_type == "News"`). Headline and abstract are cleaned; snippet
//! and lead paragraph are dropped.

use super::{RunReport, SourceProfile, TextColumn, normalize_files, normalize_table};
use crate::config::{DataLayout, NullPolicy, PipelineConfig};
use crate::error::Result;
use crate::outputs::csv::read_table;
use crate::table::Table;
use crate::utils::list_files;
use std::path::Path;
use tracing::instrument;

pub const SOURCE: &str = "nyt";

pub const PROFILE: SourceProfile = SourceProfile {
    name: SOURCE,
    filters: &[("doc_type", "article"), ("material_type", "News")],
    drop_columns: &["doc_type", "material_type", "snippet", "lead_paragraph"],
    required: &["headline", "abstract"],
    null_policy: NullPolicy::Drop,
    text_columns: &[
        TextColumn::standard("headline", "cl_headline", "word_count_headline"),
        TextColumn::standard("abstract", "cl_abstract", "word_count_abstract"),
    ],
};

pub fn profile(config: &PipelineConfig) -> SourceProfile {
    SourceProfile {
        null_policy: config.nyt.null_policy,
        ..PROFILE
    }
}

/// Load and normalize one NYT export.
pub fn normalize_file(path: &Path, config: &PipelineConfig) -> Result<Table> {
    let table = read_table(path)?;
    normalize_table(table, &profile(config), config.word_count)
}

/// Normalize every `*.csv` in the NYT raw directory.
#[instrument(level = "info", skip_all, fields(dir = %layout.nyt_raw_dir.display()))]
pub fn run(layout: &DataLayout, config: &PipelineConfig, report: &mut RunReport) -> Result<()> {
    let inputs = list_files(&layout.nyt_raw_dir, "csv")?;
    normalize_files(SOURCE, &inputs, &layout.nyt_interim_dir, report, |path| {
        normalize_file(path, config)
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::FileOutcome;
    use std::fs;
    use tempfile::TempDir;

    const HEADER: &str = "headline,abstract,snippet,lead_paragraph,doc_type,material_type,pub_date,web_url";

    fn write_raw(dir: &Path, name: &str, rows: &[&str]) -> std::path::PathBuf {
        fs::create_dir_all(dir).unwrap();
        let path = dir.join(name);
        let mut text = format!("{HEADER}\n");
        for row in rows {
            text.push_str(row);
            text.push('\n');
        }
        fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn test_only_news_articles_survive() {
        let dir = TempDir::new().unwrap();
        let path = write_raw(
            dir.path(),
            "2022-01.csv",
            &[
                "Markets rally 5%,Stocks up.,s,l,article,News,2022-01-03,https://nyt.com/a",
                "A blog post,Blog abstract,s,l,blog,News,2022-01-03,https://nyt.com/b",
                "Op-ed title,Opinion,s,l,article,Op-Ed,2022-01-03,https://nyt.com/c",
            ],
        );

        let table = normalize_file(&path, &PipelineConfig::default()).unwrap();

        assert_eq!(
            table.columns(),
            [
                "pub_date",
                "web_url",
                "cl_headline",
                "cl_abstract",
                "word_count_headline",
                "word_count_abstract"
            ]
        );
        assert_eq!(table.len(), 1);
        assert_eq!(table.value(0, "web_url").unwrap(), Some("https://nyt.com/a"));
        assert_eq!(table.value(0, "cl_headline").unwrap(), Some("Markets rally"));
        assert_eq!(table.value(0, "word_count_headline").unwrap(), Some("2"));
        assert_eq!(table.value(0, "cl_abstract").unwrap(), Some("Stocks up"));
    }

    #[test]
    fn test_null_policy_drop_and_fill() {
        let dir = TempDir::new().unwrap();
        let path = write_raw(
            dir.path(),
            "2022-02.csv",
            &[
                "Has both,An abstract,s,l,article,News,2022-02-01,u1",
                ",Abstract only,s,l,article,News,2022-02-01,u2",
            ],
        );

        let dropped = normalize_file(&path, &PipelineConfig::default()).unwrap();
        assert_eq!(dropped.len(), 1);

        let mut config = PipelineConfig::default();
        config.nyt.null_policy = NullPolicy::Fill;
        let filled = normalize_file(&path, &config).unwrap();
        assert_eq!(filled.len(), 2);
        assert_eq!(filled.value(1, "cl_headline").unwrap(), Some(""));
    }

    #[test]
    fn test_run_writes_same_basename() {
        let dir = TempDir::new().unwrap();
        let layout = DataLayout::new(dir.path());
        write_raw(
            &layout.nyt_raw_dir,
            "nyt_2022.csv",
            &["Title,Abstract,s,l,article,News,2022-03-01,u"],
        );
        fs::write(layout.nyt_raw_dir.join("broken.csv"), "headline,abstract\nx,y\n").unwrap();

        let mut report = RunReport::default();
        run(&layout, &PipelineConfig::default(), &mut report).unwrap();

        let written = layout.nyt_interim_dir.join("nyt_2022.csv");
        assert!(written.exists());
        assert_eq!(report.succeeded(), 1);
        let failed = report.failed();
        assert_eq!(failed.len(), 1);
        assert!(matches!(&failed[0].outcome, FileOutcome::Failed { error } if error.contains("doc_type")));
    }
}
