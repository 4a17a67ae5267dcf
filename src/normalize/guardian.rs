//! Guardian content API batches (the fetch cache).
//!
//! Each cached JSON array is flattened into a table: nested objects become
//! `parent.child` columns, and the `fields.` prefix the API puts on article
//! fields is stripped so `fields.headline` becomes `headline`. Tag ids,
//! titles and URLs are pulled out of the `tags` array into their own
//! columns before the array itself is dropped.
//!
//! Tag columns hold compact JSON arrays (`["a","b"]`), not the
//! single-quoted list form (`['a', 'b']`) found in older interim datasets,
//! so those files need regenerating before they are compared or merged.

use super::{RunReport, SourceProfile, TextColumn, normalize_files, normalize_table};
use crate::clean::coerce_text;
use crate::config::{DataLayout, NullPolicy, PipelineConfig};
use crate::error::{PipelineError, Result};
use crate::outputs::json::read_batch;
use crate::table::{Cell, Table};
use crate::utils::list_files;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, instrument, warn};

pub const SOURCE: &str = "guardian";

/// Administrative metadata with no use in text analysis.
pub const DROP_COLUMNS: &[&str] = &[
    "isHosted",
    "displayHint",
    "firstPublicationDate",
    "isInappropriateForSponsorship",
    "isPremoderated",
    "lastModified",
    "productionOffice",
    "shortUrl",
    "shouldHideAdverts",
    "showInRelatedContent",
    "thumbnail",
    "legallySensitive",
    "isLive",
    "shouldHideReaderRevenue",
    "showAffiliateLinks",
    "newspaperPageNumber",
    "newspaperEditionDate",
    "commentCloseDate",
    "commentable",
    "starRating",
    "liveBloggingNow",
    "sensitive",
    "type",
    "main",
    "webTitle",
    "standfirst",
    "tags",
];

pub const PROFILE: SourceProfile = SourceProfile {
    name: SOURCE,
    filters: &[("type", "article")],
    drop_columns: DROP_COLUMNS,
    required: &["headline", "trailText", "body", "bodyText"],
    null_policy: NullPolicy::Drop,
    text_columns: &[
        TextColumn::standard("headline", "cl_headline", "word_count_headline"),
        TextColumn::standard("trailText", "cl_trailText", "word_count_trailText"),
    ],
};

/// Derived from each entry of the `tags` array: `(column, tag key)`.
const TAG_COLUMNS: [(&str, &str); 3] = [
    ("tag_ids", "id"),
    ("tag_webTitles", "webTitle"),
    ("tag_webUrls", "webUrl"),
];

/// Flatten nested objects into dotted keys. Arrays and scalars are leaves;
/// an empty nested object contributes no key.
pub fn flatten_record(record: &Map<String, Value>) -> Vec<(String, Value)> {
    let mut out = Vec::new();
    flatten_into(record, "", &mut out);
    out
}

fn flatten_into(map: &Map<String, Value>, prefix: &str, out: &mut Vec<(String, Value)>) {
    for (key, value) in map {
        let name = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match value {
            Value::Object(inner) => flatten_into(inner, &name, out),
            leaf => out.push((name, leaf.clone())),
        }
    }
}

/// For each tag column, a JSON array of that key across every tag that has it.
fn tag_cells(record: &Map<String, Value>) -> Vec<Cell> {
    let tags = record
        .get("tags")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();
    TAG_COLUMNS
        .iter()
        .map(|(_, key)| {
            let values: Vec<&Value> = tags.iter().filter_map(|tag| tag.get(key)).collect();
            Some(Value::from(values.into_iter().cloned().collect::<Vec<_>>()).to_string())
        })
        .collect()
}

/// Build a table from a batch of article objects.
///
/// Columns appear in first-seen order across the batch; a record missing a
/// column gets null there. Every record must be a JSON object and at least
/// one must carry `tags`.
pub fn batch_to_table(batch: &[Value], field_prefix: &str) -> Result<Table> {
    let mut columns: Vec<String> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut flat_rows: Vec<Vec<(usize, Value)>> = Vec::with_capacity(batch.len());
    let mut tag_rows: Vec<Vec<Cell>> = Vec::with_capacity(batch.len());
    let mut saw_tags = false;

    for (i, record) in batch.iter().enumerate() {
        let object = record.as_object().ok_or_else(|| {
            PipelineError::MalformedRecord(format!("article {i} is not a JSON object"))
        })?;
        saw_tags |= object.contains_key("tags");

        let mut row = Vec::new();
        for (key, value) in flatten_record(object) {
            let idx = *positions.entry(key.clone()).or_insert_with(|| {
                columns.push(key);
                columns.len() - 1
            });
            row.push((idx, value));
        }
        flat_rows.push(row);
        tag_rows.push(tag_cells(object));
    }

    if !batch.is_empty() && !saw_tags {
        return Err(PipelineError::MissingColumn {
            column: "tags".to_string(),
        });
    }

    let width = columns.len();
    columns.extend(TAG_COLUMNS.iter().map(|(name, _)| name.to_string()));
    let mut table = Table::new(columns);
    for (flat, tags) in flat_rows.into_iter().zip(tag_rows) {
        let mut cells: Vec<Cell> = vec![None; width];
        for (idx, value) in flat {
            cells[idx] = (!value.is_null()).then(|| coerce_text(&value));
        }
        cells.extend(tags);
        table.push_row(cells)?;
    }
    if !field_prefix.is_empty() {
        table.rename_columns(|c| c.strip_prefix(field_prefix).map(str::to_string));
    }
    debug!(rows = table.len(), columns = table.columns().len(), "Flattened batch");
    Ok(table)
}

/// Table with no rows but every column [`PROFILE`] reads, so an empty batch
/// normalizes to a header-only CSV.
fn empty_batch_table() -> Table {
    let columns = PROFILE
        .filters
        .iter()
        .map(|(column, _)| *column)
        .chain(PROFILE.required.iter().copied())
        .chain(TAG_COLUMNS.iter().map(|(name, _)| *name))
        .map(str::to_string)
        .collect();
    Table::new(columns)
}

/// Load and normalize one cached batch file.
///
/// # Arguments
///
/// * `path` - A `ga_<from>_<to>.json` cache file
/// * `config` - Supplies the field prefix and word-count mode
///
/// # Returns
///
/// The normalized table. A range with no articles is cached as `[]` and
/// yields an empty table with the usual output columns.
pub fn normalize_file(path: &Path, config: &PipelineConfig) -> Result<Table> {
    let batch = read_batch(path)?;
    let table = if batch.is_empty() {
        warn!(path = %path.display(), "Cached batch holds no articles");
        empty_batch_table()
    } else {
        batch_to_table(&batch, &config.guardian.field_prefix)?
    };
    normalize_table(table, &PROFILE, config.word_count)
}

/// Normalize every `*.json` batch in the Guardian raw directory.
#[instrument(level = "info", skip_all, fields(dir = %layout.guardian_raw_dir.display()))]
pub fn run(layout: &DataLayout, config: &PipelineConfig, report: &mut RunReport) -> Result<()> {
    let inputs = list_files(&layout.guardian_raw_dir, "json")?;
    normalize_files(SOURCE, &inputs, &layout.guardian_interim_dir, report, |path| {
        normalize_file(path, config)
    });
    Ok(())
}
