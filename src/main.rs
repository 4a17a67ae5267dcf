//! # Headline Pipeline
//!
//! Data acquisition and cleaning for a news-headline research dataset.
//!
//! ## Features
//!
//! - Fetches Guardian articles month by month from the content search API,
//!   caching one JSON file per month so reruns only download what is missing
//! - Normalizes three raw sources (Guardian JSON, New York Times CSV exports
//!   and a Guardian Twitter CSV export) into interim CSV tables
//! - Cleans free text (digits, hashtags, e-mails, URLs, emoji, punctuation,
//!   whitespace) and adds word counts
//!
//! ## Usage
//!
//! ```sh
//! GUARDIAN_API_KEY=... headline_pipeline
//! headline_pipeline --skip-fetch -c pipeline.yaml
//! ```
//!
//! ## Architecture
//!
//! Stages run one after another and hand off only through the data directory:
//! 1. **Bootstrap**: create the `raw/`, `interim/` and `processed/` trees
//! 2. **Fetch**: page every uncached month range into `raw/guardian/`
//! 3. **Normalize**: NYT, Guardian and Twitter sources into `interim/`
//! 4. **Report**: per-file summary; any failed file makes the run fail

use clap::Parser;
use std::error::Error;
use tracing::{debug, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod clean;
mod cli;
mod config;
mod error;
mod fetch;
mod models;
mod normalize;
mod outputs;
mod table;
mod utils;

use cli::Cli;
use config::{DataLayout, PipelineConfig};
use normalize::{RunReport, guardian, nyt, twitter};
use utils::ensure_writable_dir;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    if dotenv::dotenv().is_ok() {
        debug!("Loaded .env");
    }

    let start_time = std::time::Instant::now();
    info!("headline_pipeline starting up");

    let args = Cli::parse();
    debug!(?args.config, ?args.data_dir, skip_fetch = args.skip_fetch, "Parsed CLI arguments");

    let config = PipelineConfig::resolve(&args)?;
    let layout = config.layout();
    info!(data_dir = %config.data_dir.display(), "Using data directory");

    ensure_writable_dir(&layout.interim_dir).await?;
    layout.bootstrap()?;

    // ---- Fetch ----
    if args.skip_fetch {
        warn!("Fetch stage skipped (--skip-fetch)");
    } else {
        run_fetch_stage(&config, &layout).await?;
    }

    // ---- Normalize ----
    let mut report = RunReport::default();
    nyt::run(&layout, &config, &mut report)?;
    guardian::run(&layout, &config, &mut report)?;
    twitter::run(&layout, &config, &mut report)?;
    report.log_summary();

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    if report.has_failures() {
        return Err(report.to_string().into());
    }
    Ok(())
}

#[instrument(level = "info", skip_all, fields(
    from = %config.guardian.start_date,
    to = %config.guardian.end_date
))]
async fn run_fetch_stage(config: &PipelineConfig, layout: &DataLayout) -> error::Result<()> {
    let ranges = fetch::build_month_ranges(config.guardian.start_date, config.guardian.end_date)?;
    let cache_tag = config.guardian.cache_tag.as_deref();
    let pending = fetch::pending_ranges(&ranges, &layout.guardian_raw_dir, cache_tag).len();
    info!(ranges = ranges.len(), pending, "Planned Guardian date ranges");

    match fetch::client_for_pending(&config.guardian, pending)? {
        Some(client) => {
            debug!(?client, "Guardian client ready");
            fetch::fetch_all(&client, &ranges, &layout.guardian_raw_dir, cache_tag).await?;
        }
        None => info!("Every range is already cached; nothing to download"),
    }
    Ok(())
}
