//! Guardian content API client and the per-range fetch loop.
//!
//! # Architecture
//!
//! - [`SearchApi`]: one search request for a date range and page number
//! - [`GuardianClient`]: reqwest-backed implementation against the live API
//! - [`fetch_range`]: pages through one range and writes the cache file
//! - [`fetch_all`]: runs [`fetch_range`] over every range, one after another
//!
//! There is no retry: the first transport or decoding error aborts the
//! stage, and no file is written for the range that failed.

use crate::config::GuardianConfig;
use crate::error::{PipelineError, Result};
use crate::models::{DateRange, RawArticleBatch, SearchEnvelope, SearchPage};
use crate::outputs::json::{batch_path, write_batch};
use crate::utils::truncate_for_log;
use reqwest::Client;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

/// A paginated search endpoint.
pub trait SearchApi {
    /// Request one page of results for `range`. Pages are 1-based.
    async fn search(&self, range: &DateRange, page: u32) -> Result<SearchPage>;
}

/// [`SearchApi`] over HTTP against the Guardian content API.
#[derive(Clone)]
pub struct GuardianClient {
    http: Client,
    endpoint: Url,
    api_key: String,
    page_size: u32,
}

impl fmt::Debug for GuardianClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GuardianClient")
            .field("endpoint", &self.endpoint.as_str())
            .field("page_size", &self.page_size)
            .finish_non_exhaustive()
    }
}

impl GuardianClient {
    /// Build a client for `endpoint`.
    ///
    /// # Arguments
    ///
    /// * `endpoint` - Search URL without query string
    /// * `api_key` - Sent as the `api-key` parameter on every request
    /// * `page_size` - Results requested per page
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Url`] if `endpoint` does not parse.
    pub fn new(endpoint: &str, api_key: String, page_size: u32) -> Result<Self> {
        Ok(Self {
            http: Client::new(),
            endpoint: Url::parse(endpoint)?,
            api_key,
            page_size,
        })
    }

    pub fn from_config(config: &GuardianConfig, api_key: String) -> Result<Self> {
        Self::new(&config.endpoint, api_key, config.page_size)
    }

    /// Full request URL for one page, query parameters included.
    pub fn request_url(&self, range: &DateRange, page: u32) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("from-date", &range.from_param())
            .append_pair("to-date", &range.to_param())
            .append_pair("show-fields", "all")
            .append_pair("show-tags", "all")
            .append_pair("page-size", &self.page_size.to_string())
            .append_pair("api-key", &self.api_key)
            .append_pair("page", &page.to_string());
        url
    }
}

impl SearchApi for GuardianClient {
    #[instrument(level = "debug", skip_all, fields(%range, page = page))]
    async fn search(&self, range: &DateRange, page: u32) -> Result<SearchPage> {
        let t0 = Instant::now();
        let response = self
            .http
            .get(self.request_url(range, page))
            .send()
            .await?
            .error_for_status()?;
        let body = response.text().await?;
        debug!(bytes = body.len(), elapsed_ms = t0.elapsed().as_millis() as u64, "Received page");

        match serde_json::from_str::<SearchEnvelope>(&body) {
            Ok(envelope) => Ok(envelope.response),
            Err(e) => {
                warn!(
                    error = %e,
                    body_preview = %truncate_for_log(&body, 300),
                    "Search reply did not match the expected shape"
                );
                Err(e.into())
            }
        }
    }
}

/// What [`fetch_range`] did for one range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The cache file already existed; no request was made.
    Cached { path: PathBuf },
    /// Every page was downloaded and written to `path`.
    Downloaded {
        path: PathBuf,
        pages: u32,
        articles: usize,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchSummary {
    pub downloaded: usize,
    pub cached: usize,
    pub articles: usize,
}

/// Fetch every page of `range` into one cache file under `dir`.
///
/// Skips the range entirely when its cache file exists. Otherwise requests
/// pages 1, 2, ... until the page number passes the page count reported by
/// the latest reply, concatenating `results` in page order.
#[instrument(level = "info", skip_all, fields(%range, cache_tag = ?cache_tag))]
pub async fn fetch_range<A: SearchApi>(
    api: &A,
    range: &DateRange,
    dir: &Path,
    cache_tag: Option<&str>,
) -> Result<FetchOutcome> {
    let path = batch_path(dir, range, cache_tag);
    if path.exists() {
        info!(path = %path.display(), "Range already cached; skipping");
        return Ok(FetchOutcome::Cached { path });
    }

    info!("Downloading range");
    let mut batch: RawArticleBatch = Vec::new();
    let mut current_page = 1;
    let mut total_pages = 1;

    while current_page <= total_pages {
        let page = api.search(range, current_page).await?;
        total_pages = page.pages;
        debug!(
            page = current_page,
            total_pages,
            total_items = page.total,
            results = page.results.len(),
            "Fetched page"
        );
        batch.extend(page.results);
        current_page += 1;
    }

    write_batch(&batch, &path).await?;
    let pages = current_page - 1;
    info!(pages, articles = batch.len(), path = %path.display(), "Range downloaded");
    Ok(FetchOutcome::Downloaded {
        path,
        pages,
        articles: batch.len(),
    })
}

/// Ranges whose cache file does not exist yet.
pub fn pending_ranges<'a>(
    ranges: &'a [DateRange],
    dir: &Path,
    cache_tag: Option<&str>,
) -> Vec<&'a DateRange> {
    ranges
        .iter()
        .filter(|r| !batch_path(dir, r, cache_tag).exists())
        .collect()
}

/// Fetch `ranges` sequentially. The first error aborts the whole stage.
#[instrument(level = "info", skip_all, fields(ranges = ranges.len(), dir = %dir.display()))]
pub async fn fetch_all<A: SearchApi>(
    api: &A,
    ranges: &[DateRange],
    dir: &Path,
    cache_tag: Option<&str>,
) -> Result<FetchSummary> {
    let mut summary = FetchSummary::default();
    for range in ranges {
        match fetch_range(api, range, dir, cache_tag).await {
            Ok(FetchOutcome::Cached { path }) => {
                debug!(path = %path.display(), "Cached");
                summary.cached += 1;
            }
            Ok(FetchOutcome::Downloaded { path, pages, articles }) => {
                debug!(path = %path.display(), pages, articles, "Downloaded");
                summary.downloaded += 1;
                summary.articles += articles;
            }
            Err(e) => {
                error!(%range, error = %e, "Fetch failed; aborting fetch stage");
                return Err(e);
            }
        }
    }
    info!(
        downloaded = summary.downloaded,
        cached = summary.cached,
        articles = summary.articles,
        "Fetch stage complete"
    );
    Ok(summary)
}

/// Build a live client for `config`, failing early when ranges still need
/// downloading and no API key is available.
pub fn client_for_pending(
    config: &GuardianConfig,
    pending: usize,
) -> Result<Option<GuardianClient>> {
    if pending == 0 {
        return Ok(None);
    }
    match config.api_key.clone() {
        Some(key) => Ok(Some(GuardianClient::from_config(config, key)?)),
        None => Err(PipelineError::MissingApiKey { pending }),
    }
}
