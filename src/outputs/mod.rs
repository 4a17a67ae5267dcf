//! File outputs for both pipeline stages.
//!
//! # Submodules
//!
//! - [`json`]: raw article batches written by the fetcher (the fetch cache)
//! - [`csv`]: normalized tables written by the source normalizers
//!
//! # Output Structure
//!
//! ```text
//! data/
//! ├── raw/guardian/ga_<from>_<to>.json
//! └── interim/
//!     ├── nyt_data/<input name>.csv
//!     ├── gu_data/<input stem>.csv
//!     └── gu_twitter_data/gu_tweets.csv
//! ```

pub mod csv;
pub mod json;
