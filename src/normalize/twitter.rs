//! Guardian Twitter export (`gu_tweets.csv`).
//!
//! Unlike the article sources, every input column is kept, including the
//! raw `text`; the cleaned copy goes to `clean_text` and its count to
//! `word_count`.

use super::{RunReport, SourceProfile, TextColumn, normalize_files, normalize_table};
use crate::config::{DataLayout, NullPolicy, PipelineConfig};
use crate::error::Result;
use crate::outputs::csv::read_table;
use crate::table::Table;
use std::path::Path;
use tracing::{instrument, warn};

pub const SOURCE: &str = "twitter";

pub const PROFILE: SourceProfile = SourceProfile {
    name: SOURCE,
    filters: &[],
    drop_columns: &[],
    required: &["text"],
    null_policy: NullPolicy::Drop,
    text_columns: &[TextColumn {
        source: "text",
        cleaned: "clean_text",
        count: "word_count",
        keep_source: true,
    }],
};

pub fn normalize_file(path: &Path, config: &PipelineConfig) -> Result<Table> {
    let table = read_table(path)?;
    normalize_table(table, &PROFILE, config.word_count)
}

/// Normalize the single tweets export, if present.
#[instrument(level = "info", skip_all, fields(path = %layout.twitter_raw_file.display()))]
pub fn run(layout: &DataLayout, config: &PipelineConfig, report: &mut RunReport) -> Result<()> {
    if !layout.twitter_raw_file.is_file() {
        warn!("Tweets export not found; skipping source");
        return Ok(());
    }
    let inputs = [layout.twitter_raw_file.clone()];
    normalize_files(SOURCE, &inputs, &layout.twitter_interim_dir, report, |path| {
        normalize_file(path, config)
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clean::WordCountMode;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_tweets_keep_text_and_drop_empty() {
        let dir = TempDir::new().unwrap();
        let layout = DataLayout::new(dir.path());
        fs::create_dir_all(layout.twitter_raw_file.parent().unwrap()).unwrap();
        fs::write(
            &layout.twitter_raw_file,
            "id,created_at,text\n\
             1,2022-01-01,\"Live: 10 things 🔥 https://t.co/xyz #news\"\n\
             2,2022-01-02,\n\
             3,2022-01-03,Plain   words here\n",
        )
        .unwrap();

        let mut report = RunReport::default();
        run(&layout, &PipelineConfig::default(), &mut report).unwrap();
        assert_eq!(report.succeeded(), 1);

        let out = crate::outputs::csv::read_table(&layout.twitter_interim_dir.join("gu_tweets.csv")).unwrap();
        assert_eq!(out.columns(), ["id", "created_at", "text", "clean_text", "word_count"]);
        assert_eq!(out.column_values("id").unwrap(), vec![Some("1"), Some("3")]);
        assert_eq!(out.value(0, "clean_text").unwrap(), Some("Live things news"));
        assert_eq!(out.value(0, "word_count").unwrap(), Some("3"));
        assert_eq!(out.value(1, "text").unwrap(), Some("Plain   words here"));
        assert_eq!(out.value(1, "clean_text").unwrap(), Some("Plain words here"));
    }

    #[test]
    fn test_missing_export_is_skipped() {
        let dir = TempDir::new().unwrap();
        let layout = DataLayout::new(dir.path());
        let mut report = RunReport::default();
        run(&layout, &PipelineConfig::default(), &mut report).unwrap();
        assert!(report.files.is_empty());
    }

    #[test]
    fn test_tokens_mode() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("gu_tweets.csv");
        fs::write(&path, "text\n\"!!!\"\n").unwrap();
        let mut config = PipelineConfig::default();
        config.word_count = WordCountMode::Tokens;
        let out = normalize_file(&path, &config).unwrap();
        assert_eq!(out.value(0, "clean_text").unwrap(), Some(""));
        assert_eq!(out.value(0, "word_count").unwrap(), Some("0"));
    }
}
