//! Inclusive capture-date window.

use crate::core::model::{parse_date, parse_timestamp};
use crate::error::{LibraryError, Result};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;

/// Inclusive `[from, to]` range of capture dates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateWindow {
    from: DateTime<FixedOffset>,
    to: DateTime<FixedOffset>,
}

impl DateWindow {
    pub fn new(from: DateTime<FixedOffset>, to: DateTime<FixedOffset>) -> Result<Self> {
        if from > to {
            return Err(LibraryError::Config(format!(
                "Date window starts after it ends: {} > {}",
                from.to_rfc3339(),
                to.to_rfc3339()
            )));
        }
        Ok(Self { from, to })
    }

    /// A window that contains every representable date
    pub fn all() -> Self {
        Self {
            from: DateTime::<Utc>::MIN_UTC.fixed_offset(),
            to: DateTime::<Utc>::MAX_UTC.fixed_offset(),
        }
    }

    /// Parse window bounds given on the command line.
    ///
    /// Each bound is a timestamp or a bare date. A bare lower bound means the
    /// start of that day and a bare upper bound the end of it, both in UTC.
    pub fn parse(from: &str, to: &str) -> Result<Self> {
        let from = parse_bound(from, |date| date.and_hms_milli_opt(0, 0, 0, 0))?;
        let to = parse_bound(to, |date| date.and_hms_milli_opt(23, 59, 59, 999))?;
        Self::new(from, to)
    }

    pub fn from(&self) -> DateTime<FixedOffset> {
        self.from
    }

    pub fn to(&self) -> DateTime<FixedOffset> {
        self.to
    }

    pub fn contains(&self, date: DateTime<FixedOffset>) -> bool {
        self.from <= date && date <= self.to
    }
}

impl Default for DateWindow {
    fn default() -> Self {
        Self::all()
    }
}

fn parse_bound(
    value: &str,
    time_of_day: impl Fn(NaiveDate) -> Option<NaiveDateTime>,
) -> Result<DateTime<FixedOffset>> {
    if let Some(parsed) = parse_timestamp(value) {
        return Ok(parsed);
    }

    parse_date(value)
        .and_then(time_of_day)
        .map(|naive| naive.and_utc().fixed_offset())
        .ok_or_else(|| LibraryError::Config(format!("Not a date or timestamp: '{}'", value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn ts(value: &str) -> DateTime<FixedOffset> {
        parse_timestamp(value).unwrap()
    }

    #[test]
    fn bare_dates_cover_whole_days() {
        let window = DateWindow::parse("2022-10-01", "2022-10-10").unwrap();

        assert_eq!(window.from(), ts("2022-10-01T00:00:00Z"));
        assert_eq!(window.to().hour(), 23);
        assert!(window.contains(ts("2022-10-10T23:59:59Z")));
        assert!(!window.contains(ts("2022-10-11T00:00:00Z")));
        assert!(!window.contains(ts("2022-09-30T23:59:59Z")));
    }

    #[test]
    fn bounds_are_inclusive() {
        let window = DateWindow::parse("2022-10-01T12:00:00Z", "2022-10-01T13:00:00Z").unwrap();
        assert!(window.contains(ts("2022-10-01T12:00:00Z")));
        assert!(window.contains(ts("2022-10-01T13:00:00Z")));
    }

    #[test]
    fn timestamps_keep_their_offset() {
        let window = DateWindow::parse("2022-10-01T00:00:00+02:00", "2022-10-02").unwrap();
        assert!(!window.contains(ts("2022-09-30T21:59:59Z")));
        assert!(window.contains(ts("2022-09-30T22:00:00Z")));
    }

    #[test]
    fn bounds_accept_written_out_dates() {
        let window = DateWindow::parse("Oct 1, 2022", "10 October 2022").unwrap();
        assert_eq!(window, DateWindow::parse("2022-10-01", "2022-10-10").unwrap());
    }

    #[test]
    fn reversed_window_is_rejected() {
        let result = DateWindow::parse("2022-10-10", "2022-10-01");
        assert!(matches!(result, Err(LibraryError::Config(_))));
    }

    #[test]
    fn garbage_bound_is_rejected() {
        let result = DateWindow::parse("last tuesday", "2022-10-01");
        match result {
            Err(LibraryError::Config(message)) => assert!(message.contains("last tuesday")),
            other => panic!("expected Config error, got {:?}", other),
        }
    }

    #[test]
    fn all_contains_everything() {
        let window = DateWindow::all();
        assert!(window.contains(ts("1900-01-01T00:00:00Z")));
        assert!(window.contains(ts("2999-12-31T23:59:59Z")));
    }
}
