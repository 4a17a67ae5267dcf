//! Utility functions for logging, file enumeration and output directories.

use crate::error::Result;
use glob::glob;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, instrument, warn};

const WRITE_CHECK_FILE: &str = ".headline_pipeline_write_check";

/// Truncate a string for logging purposes.
///
/// Long strings are cut to at most `max` bytes (on a char boundary) with an
/// ellipsis and a count of the dropped bytes appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}

/// List the files in `dir` with the given extension, sorted by path.
///
/// A missing directory yields an empty list rather than an error.
#[instrument(level = "debug", skip_all, fields(dir = %dir.display(), extension = %extension))]
pub fn list_files(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        warn!("Directory does not exist");
        return Ok(Vec::new());
    }
    let pattern = format!("{}/*.{}", glob::Pattern::escape(&dir.to_string_lossy()), extension);
    let mut files = Vec::new();
    for entry in glob(&pattern)? {
        match entry {
            Ok(path) if path.is_file() => files.push(path),
            Ok(_) => {}
            Err(e) => warn!(error = %e, "Unreadable directory entry"),
        }
    }
    files.sort();
    debug!(count = files.len(), "Listed files");
    Ok(files)
}

/// Output path for `input` inside `out_dir`, keeping the file stem and
/// forcing a `.csv` extension.
pub fn csv_output_path(input: &Path, out_dir: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    out_dir.join(format!("{stem}.csv"))
}

/// Ensure a directory exists and is writable.
///
/// Creates `path` (and its parents) if needed, then writes and removes a
/// marker file. A marker that cannot be removed is logged, not returned.
///
/// # Arguments
///
/// * `path` - Directory the pipeline is about to write into
///
/// # Errors
///
/// [`PipelineError::Io`](crate::error::PipelineError::Io) when the directory
/// cannot be created or the marker file cannot be written.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn ensure_writable_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).await?;
    let marker = path.join(WRITE_CHECK_FILE);
    fs::write(&marker, b"").await?;
    if let Err(e) = fs::remove_file(&marker).await {
        warn!(marker = %marker.display(), error = %e, "Could not remove write-check file");
    }
    info!("Directory is writable");
    Ok(())
}
