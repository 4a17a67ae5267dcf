//! Pipeline configuration and the on-disk data layout.
//!
//! Every setting has a default, so the pipeline runs with no configuration
//! file at all. A YAML file (see [`PipelineConfig::load`]) may override any
//! subset of fields; command-line flags are applied on top by
//! [`PipelineConfig::apply_cli`].

use crate::clean::WordCountMode;
use crate::cli::Cli;
use crate::error::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

pub const DEFAULT_GUARDIAN_ENDPOINT: &str = "https://content.guardianapis.com/search";

/// How rows with a null in a required text column are handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NullPolicy {
    /// Remove the row.
    #[default]
    Drop,
    /// Keep the row with the null replaced by an empty string.
    Fill,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Root of the `raw/`, `interim/` and `processed/` trees.
    pub data_dir: PathBuf,
    pub word_count: WordCountMode,
    pub guardian: GuardianConfig,
    pub nyt: NytConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardianConfig {
    pub endpoint: String,
    pub page_size: u32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Prefix stripped from flattened column names (`fields.headline` -> `headline`).
    pub field_prefix: String,
    /// Appended to cache file names; bump it to refetch after an upstream schema change.
    pub cache_tag: Option<String>,
    /// Never read from the config file; comes from the CLI or `GUARDIAN_API_KEY`.
    #[serde(skip)]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NytConfig {
    pub null_policy: NullPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            word_count: WordCountMode::default(),
            guardian: GuardianConfig::default(),
            nyt: NytConfig::default(),
        }
    }
}

impl Default for GuardianConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_GUARDIAN_ENDPOINT.to_string(),
            page_size: 50,
            start_date: NaiveDate::from_ymd_opt(2021, 9, 27).unwrap_or_default(),
            end_date: NaiveDate::from_ymd_opt(2022, 9, 27).unwrap_or_default(),
            field_prefix: "fields.".to_string(),
            cache_tag: None,
            api_key: None,
        }
    }
}

impl PipelineConfig {
    /// Load a YAML configuration file. An empty file yields the defaults.
    #[instrument(level = "info", skip_all, fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let config = Self::from_yaml(&text)?;
        info!("Loaded configuration");
        Ok(config)
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }

    /// Build the effective configuration: file (if any), then CLI overrides.
    pub fn resolve(cli: &Cli) -> Result<Self> {
        let mut config = match &cli.config {
            Some(path) => Self::load(Path::new(path))?,
            None => Self::default(),
        };
        config.apply_cli(cli);
        Ok(config)
    }

    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(dir) = &cli.data_dir {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(key) = cli.guardian_api_key.as_ref().filter(|k| !k.trim().is_empty()) {
            self.guardian.api_key = Some(key.clone());
        }
    }

    pub fn layout(&self) -> DataLayout {
        DataLayout::new(&self.data_dir)
    }
}

/// Every directory the pipeline reads from or writes to, derived from `data_dir`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataLayout {
    pub raw_dir: PathBuf,
    pub interim_dir: PathBuf,
    pub processed_dir: PathBuf,
    pub nyt_raw_dir: PathBuf,
    pub guardian_raw_dir: PathBuf,
    pub twitter_raw_file: PathBuf,
    pub nyt_interim_dir: PathBuf,
    pub guardian_interim_dir: PathBuf,
    pub twitter_interim_dir: PathBuf,
}

impl DataLayout {
    pub fn new(data_dir: &Path) -> Self {
        let raw_dir = data_dir.join("raw");
        let interim_dir = data_dir.join("interim");
        Self {
            nyt_raw_dir: raw_dir.join("nyt_headlines"),
            guardian_raw_dir: raw_dir.join("guardian"),
            twitter_raw_file: raw_dir.join("gu_twitter").join("gu_tweets.csv"),
            nyt_interim_dir: interim_dir.join("nyt_data"),
            guardian_interim_dir: interim_dir.join("gu_data"),
            twitter_interim_dir: interim_dir.join("gu_twitter_data"),
            processed_dir: data_dir.join("processed"),
            raw_dir,
            interim_dir,
        }
    }

    /// Create the directories every later stage assumes exist.
    #[instrument(level = "info", skip_all, fields(raw = %self.raw_dir.display()))]
    pub fn bootstrap(&self) -> Result<()> {
        for dir in [
            &self.guardian_raw_dir,
            &self.interim_dir,
            &self.processed_dir,
        ] {
            fs::create_dir_all(dir)?;
        }
        info!("Data directories ready");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.word_count, WordCountMode::Delimiter);
        assert_eq!(config.guardian.page_size, 50);
        assert_eq!(config.guardian.endpoint, DEFAULT_GUARDIAN_ENDPOINT);
        assert_eq!(config.guardian.start_date.to_string(), "2021-09-27");
        assert_eq!(config.guardian.end_date.to_string(), "2022-09-27");
        assert_eq!(config.nyt.null_policy, NullPolicy::Drop);
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(PipelineConfig::from_yaml("").unwrap(), PipelineConfig::default());
        assert_eq!(PipelineConfig::from_yaml("  \n").unwrap(), PipelineConfig::default());
    }

    #[test]
    fn test_partial_yaml_overrides() {
        let yaml = r#"
data_dir: /srv/headlines
word_count: tokens
guardian:
  page_size: 200
  start_date: 2022-01-01
  cache_tag: v2
nyt:
  null_policy: fill
"#;
        let config = PipelineConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/srv/headlines"));
        assert_eq!(config.word_count, WordCountMode::Tokens);
        assert_eq!(config.guardian.page_size, 200);
        assert_eq!(config.guardian.start_date.to_string(), "2022-01-01");
        assert_eq!(config.guardian.end_date.to_string(), "2022-09-27");
        assert_eq!(config.guardian.cache_tag.as_deref(), Some("v2"));
        assert_eq!(config.guardian.field_prefix, "fields.");
        assert_eq!(config.nyt.null_policy, NullPolicy::Fill);
    }

    #[test]
    fn test_unknown_policy_is_rejected() {
        assert!(PipelineConfig::from_yaml("nyt:\n  null_policy: impute\n").is_err());
    }

    #[test]
    fn test_cli_overrides_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pipeline.yaml");
        fs::write(&path, "data_dir: from_file\n").unwrap();

        let cli = Cli::parse_from([
            "headline_pipeline",
            "--config",
            path.to_str().unwrap(),
            "--data-dir",
            "from_cli",
            "--guardian-api-key",
            "secret",
        ]);
        let config = PipelineConfig::resolve(&cli).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("from_cli"));
        assert_eq!(config.guardian.api_key.as_deref(), Some("secret"));
    }

    #[test]
    fn test_layout_paths() {
        let layout = DataLayout::new(Path::new("data"));
        assert_eq!(layout.nyt_raw_dir, PathBuf::from("data/raw/nyt_headlines"));
        assert_eq!(layout.guardian_raw_dir, PathBuf::from("data/raw/guardian"));
        assert_eq!(
            layout.twitter_raw_file,
            PathBuf::from("data/raw/gu_twitter/gu_tweets.csv")
        );
        assert_eq!(layout.nyt_interim_dir, PathBuf::from("data/interim/nyt_data"));
        assert_eq!(layout.guardian_interim_dir, PathBuf::from("data/interim/gu_data"));
        assert_eq!(
            layout.twitter_interim_dir,
            PathBuf::from("data/interim/gu_twitter_data")
        );
        assert_eq!(layout.processed_dir, PathBuf::from("data/processed"));
    }

    #[test]
    fn test_bootstrap_creates_directories() {
        let dir = TempDir::new().unwrap();
        let layout = DataLayout::new(dir.path());
        layout.bootstrap().unwrap();
        assert!(layout.guardian_raw_dir.is_dir());
        assert!(layout.interim_dir.is_dir());
        assert!(layout.processed_dir.is_dir());
    }
}
