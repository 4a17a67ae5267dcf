//! Data models shared by the fetch and normalize stages.
//!
//! - [`DateRange`]: one calendar span, the unit of API paging and caching
//! - [`SearchEnvelope`] / [`SearchPage`]: one decoded reply of the Guardian
//!   content search API
//! - [`RawArticleBatch`]: every article of one date range, as stored on disk
//!
//! Article objects are kept as opaque [`serde_json::Value`]s: the fetcher
//! never inspects them and the Guardian normalizer flattens whatever keys
//! they carry.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Date format used in API queries and cache file names.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// An inclusive calendar interval, `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// `from-date` query value.
    pub fn from_param(&self) -> String {
        self.start.format(DATE_FORMAT).to_string()
    }

    /// `to-date` query value.
    pub fn to_param(&self) -> String {
        self.end.format(DATE_FORMAT).to_string()
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.from_param(), self.to_param())
    }
}

/// Top-level shape of a search reply: `{"response": {...}}`.
#[derive(Debug, Deserialize)]
pub struct SearchEnvelope {
    pub response: SearchPage,
}

/// The `response` object of one search reply.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchPage {
    /// Total number of pages for the query.
    pub pages: u32,
    /// Total number of matching articles across all pages.
    pub total: u64,
    /// Articles on this page.
    #[serde(default)]
    pub results: Vec<Value>,
}

/// Every article fetched for one date range, in page order.
pub type RawArticleBatch = Vec<Value>;
