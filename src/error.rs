//! Error type shared by every pipeline stage.

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Invalid glob pattern: {0}")]
    Glob(#[from] glob::PatternError),

    #[error("Invalid date range: {start} is after {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[error("GUARDIAN_API_KEY is not set and {pending} date range(s) still need downloading")]
    MissingApiKey { pending: usize },

    #[error("Missing column: {column}")]
    MissingColumn { column: String },

    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    #[error("Unexpected shape: {0}")]
    UnexpectedShape(String),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
