//! Raw batch persistence for the Guardian fetch cache.
//!
//! One file per date range, holding a pretty-printed JSON array of every
//! article returned for that range:
//!
//! ```text
//! data/raw/guardian/
//! ├── ga_2021-09-27_2021-10-26.json
//! ├── ga_2021-10-27_2021-11-26.json
//! └── ...
//! ```

use crate::error::Result;
use crate::models::{DateRange, RawArticleBatch};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument};

/// Cache file for `range` inside `dir`: `ga_<from>_<to>[_<tag>].json`.
pub fn batch_path(dir: &Path, range: &DateRange, cache_tag: Option<&str>) -> PathBuf {
    let name = match cache_tag {
        Some(tag) => format!("ga_{}_{}_{}.json", range.from_param(), range.to_param(), tag),
        None => format!("ga_{}_{}.json", range.from_param(), range.to_param()),
    };
    dir.join(name)
}

/// Write `batch` as an indented JSON array, creating the parent directory.
#[instrument(level = "info", skip_all, fields(path = %path.display(), articles = batch.len()))]
pub async fn write_batch(batch: &RawArticleBatch, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(batch)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }
    fs::write(path, json).await?;
    info!("Wrote raw article batch");
    Ok(())
}

/// Read a cached batch back. The file must hold a JSON array.
pub fn read_batch(path: &Path) -> Result<RawArticleBatch> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}
