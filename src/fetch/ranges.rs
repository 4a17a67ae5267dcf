//! Monthly partitioning of the fetch interval.

use crate::error::{PipelineError, Result};
use crate::models::DateRange;
use chrono::{Datelike, Days, Months, NaiveDate};
use tracing::{debug, instrument};

/// Split `[start, end]` into consecutive month-long ranges.
///
/// Each range runs from the cursor to one month later minus a day; the cursor
/// then advances by one calendar month (clamped to the end of shorter
/// months, cumulatively). The last range always runs from the final cursor
/// to `end`, so spans shorter than a month produce a single `(start, end)`
/// range.
#[instrument(level = "debug")]
pub fn build_month_ranges(start: NaiveDate, end: NaiveDate) -> Result<Vec<DateRange>> {
    if start > end {
        return Err(PipelineError::InvalidDateRange { start, end });
    }

    let months = (end.year() - start.year()) * 12 + end.month() as i32 - start.month() as i32;
    let full_months = months.saturating_sub(1).max(0);
    debug!(months, full_months, "Computed month span");

    let mut ranges = Vec::with_capacity(full_months as usize + 1);
    let mut cursor = start;
    for _ in 0..full_months {
        let next = add_month(cursor)?;
        let range_end = next
            .checked_sub_days(Days::new(1))
            .ok_or_else(|| overflow(cursor))?;
        ranges.push(DateRange::new(cursor, range_end));
        cursor = next;
    }
    ranges.push(DateRange::new(cursor, end));

    debug!(count = ranges.len(), last = %ranges[ranges.len() - 1], "Built month ranges");
    Ok(ranges)
}

fn add_month(date: NaiveDate) -> Result<NaiveDate> {
    date.checked_add_months(Months::new(1))
        .ok_or_else(|| overflow(date))
}

fn overflow(date: NaiveDate) -> PipelineError {
    PipelineError::UnexpectedShape(format!("date arithmetic overflow at {date}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn assert_contiguous(ranges: &[DateRange], start: NaiveDate, end: NaiveDate) {
        assert_eq!(ranges.first().unwrap().start, start);
        assert_eq!(ranges.last().unwrap().end, end);
        for r in ranges {
            assert!(r.start <= r.end, "inverted range {r}");
        }
        for pair in ranges.windows(2) {
            assert_eq!(pair[0].end.succ_opt().unwrap(), pair[1].start);
        }
    }

    #[test]
    fn test_full_year_yields_twelve_ranges() {
        let ranges = build_month_ranges(d(2021, 9, 27), d(2022, 9, 27)).unwrap();
        assert_eq!(ranges.len(), 12);
        assert_contiguous(&ranges, d(2021, 9, 27), d(2022, 9, 27));
        assert_eq!(ranges[0], DateRange::new(d(2021, 9, 27), d(2021, 10, 26)));
        assert_eq!(ranges[11], DateRange::new(d(2022, 8, 27), d(2022, 9, 27)));
    }

    #[test]
    fn test_sub_month_span_is_single_range() {
        let ranges = build_month_ranges(d(2022, 3, 5), d(2022, 3, 20)).unwrap();
        assert_eq!(ranges, vec![DateRange::new(d(2022, 3, 5), d(2022, 3, 20))]);

        let ranges = build_month_ranges(d(2022, 1, 15), d(2022, 2, 10)).unwrap();
        assert_eq!(ranges, vec![DateRange::new(d(2022, 1, 15), d(2022, 2, 10))]);
    }

    #[test]
    fn test_same_day_is_single_range() {
        let ranges = build_month_ranges(d(2022, 6, 1), d(2022, 6, 1)).unwrap();
        assert_eq!(ranges, vec![DateRange::new(d(2022, 6, 1), d(2022, 6, 1))]);
    }

    #[test]
    fn test_inverted_interval_is_rejected() {
        let err = build_month_ranges(d(2022, 6, 2), d(2022, 6, 1)).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidDateRange { .. }));
    }

    #[test]
    fn test_month_end_clamping_stays_contiguous() {
        let ranges = build_month_ranges(d(2021, 1, 31), d(2021, 5, 15)).unwrap();
        assert_contiguous(&ranges, d(2021, 1, 31), d(2021, 5, 15));
        assert_eq!(ranges[0], DateRange::new(d(2021, 1, 31), d(2021, 2, 27)));
        assert_eq!(ranges[1].start, d(2021, 2, 28));
        assert_eq!(ranges.len(), 4);
    }
}
