//! Guardian article acquisition.
//!
//! The fetch interval from the configuration is split into monthly
//! [`DateRange`](crate::models::DateRange)s ([`ranges`]), and each range is
//! paged through the content search API into its own cache file
//! ([`guardian`]). Ranges with an existing cache file are never requested
//! again.

pub mod guardian;
pub mod ranges;

pub use guardian::{client_for_pending, fetch_all, pending_ranges};
pub use ranges::build_month_ranges;
