//! Command-line interface definitions for the headline pipeline.
//!
//! Every flag is optional: running the binary with no arguments executes the
//! whole pipeline with the default configuration.

use clap::Parser;

/// Command-line arguments for the headline pipeline.
///
/// # Examples
///
/// ```sh
/// # Fetch missing Guardian ranges, then normalize everything under ./data
/// headline_pipeline
///
/// # Use a config file and a different data root
/// headline_pipeline -c pipeline.yaml -d /srv/headlines
///
/// # Offline: only normalize what is already on disk
/// headline_pipeline --skip-fetch
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a YAML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Root data directory (overrides `data_dir` from the config file)
    #[arg(short, long)]
    pub data_dir: Option<String>,

    /// Guardian content API key
    #[arg(long, env = "GUARDIAN_API_KEY", hide_env_values = true)]
    pub guardian_api_key: Option<String>,

    /// Do not contact the Guardian API; normalize the raw files already on disk
    #[arg(long)]
    pub skip_fetch: bool,
}
