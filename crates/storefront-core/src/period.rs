//! # Calendar Periods
//!
//! Period granularities for revenue bucketing and their boundary math.
//!
//! ## Bucket Boundaries
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Period Boundary Rules                               │
//! │                                                                         │
//! │  sale_date: 2024-02-14T09:30:00Z                                        │
//! │                                                                         │
//! │  Period::Day   → start 2024-02-14        end 2024-02-14 23:59:59.999999 │
//! │  Period::Week  → start 2024-02-12 (Mon)  end 2024-02-18 23:59:59.999999 │
//! │  Period::Month → start 2024-02-01        end 2024-02-29 23:59:59.999999 │
//! │  Period::Year  → start 2024-01-01        end 2024-12-31 23:59:59.999999 │
//! │                                                                         │
//! │  Weeks are pinned to the ISO convention: Monday is the first day.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All boundary math is pure calendar arithmetic on UTC dates; the database
//! layer only fetches rows and delegates the grouping key here.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// =============================================================================
// Period
// =============================================================================

/// Revenue aggregation granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    /// One calendar date.
    Day,
    /// Monday-aligned ISO week.
    Week,
    /// One calendar month.
    Month,
    /// One calendar year.
    Year,
}

impl Period {
    /// Returns the lowercase label used in summaries ("day", "week", ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Day => "day",
            Period::Week => "week",
            Period::Month => "month",
            Period::Year => "year",
        }
    }

    /// Returns the start date of the period containing `at`.
    ///
    /// This is the bucket key: two sales land in the same bucket exactly
    /// when their period starts are equal.
    pub fn start_date(&self, at: DateTime<Utc>) -> NaiveDate {
        let date = at.date_naive();
        match self {
            Period::Day => date,
            // ISO convention: Monday starts the week
            Period::Week => date - Duration::days(i64::from(date.weekday().num_days_from_monday())),
            Period::Month => first_of_month(date),
            Period::Year => first_of_year(date),
        }
    }

    /// Returns the last calendar date of the period starting at `start`.
    ///
    /// `start` must be a period start as produced by [`Period::start_date`].
    pub fn end_date(&self, start: NaiveDate) -> NaiveDate {
        match self {
            Period::Day => start,
            Period::Week => start + Duration::days(6),
            Period::Month => {
                let next = start
                    .checked_add_months(Months::new(1))
                    .unwrap_or(NaiveDate::MAX);
                next.pred_opt().unwrap_or(start)
            }
            Period::Year => last_of_year(start),
        }
    }

    /// Returns the first instant of the period starting at `start`.
    pub fn start_instant(start: NaiveDate) -> DateTime<Utc> {
        start.and_time(chrono::NaiveTime::MIN).and_utc()
    }

    /// Returns the last instant of the period starting at `start`
    /// (23:59:59.999999 of its final day, microsecond resolution).
    pub fn end_instant(&self, start: NaiveDate) -> DateTime<Utc> {
        end_of_day(self.end_date(start))
    }
}

impl FromStr for Period {
    type Err = CoreError;

    /// Parses a granularity string.
    ///
    /// Anything other than `day`, `week`, `month`, or `year` fails with
    /// [`CoreError::InvalidPeriod`]. Callers parse BEFORE running any
    /// query.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" => Ok(Period::Day),
            "week" => Ok(Period::Week),
            "month" => Ok(Period::Month),
            "year" => Ok(Period::Year),
            _ => Err(CoreError::InvalidPeriod(s.to_string())),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Date Helpers
// =============================================================================

/// Last representable instant of a calendar date (microsecond resolution).
pub fn end_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_hms_micro_opt(23, 59, 59, 999_999)
        .unwrap_or_else(|| date.and_time(chrono::NaiveTime::MIN))
        .and_utc()
}

/// First instant of a calendar date.
pub fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

fn first_of_year(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap_or(date)
}

fn last_of_year(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), 12, 31).unwrap_or(date)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 30, 0).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_period() {
        assert_eq!("day".parse::<Period>().unwrap(), Period::Day);
        assert_eq!("Week".parse::<Period>().unwrap(), Period::Week);
        assert_eq!(" month ".parse::<Period>().unwrap(), Period::Month);
        assert_eq!("year".parse::<Period>().unwrap(), Period::Year);

        let err = "quarter".parse::<Period>().unwrap_err();
        assert!(matches!(err, CoreError::InvalidPeriod(ref s) if s == "quarter"));
    }

    #[test]
    fn test_day_boundaries() {
        let start = Period::Day.start_date(at(2024, 2, 14, 9));
        assert_eq!(start, date(2024, 2, 14));
        assert_eq!(Period::Day.end_date(start), date(2024, 2, 14));
        assert_eq!(
            Period::Day.end_instant(start),
            date(2024, 2, 14).and_hms_micro_opt(23, 59, 59, 999_999).unwrap().and_utc()
        );
    }

    #[test]
    fn test_week_is_monday_aligned() {
        // 2024-01-01 is a Monday
        assert_eq!(Period::Week.start_date(at(2024, 1, 1, 0)), date(2024, 1, 1));
        // Wednesday and Sunday of the same ISO week share the bucket key
        assert_eq!(Period::Week.start_date(at(2024, 1, 3, 12)), date(2024, 1, 1));
        assert_eq!(Period::Week.start_date(at(2024, 1, 7, 23)), date(2024, 1, 1));
        // The following Monday starts a new bucket
        assert_eq!(Period::Week.start_date(at(2024, 1, 8, 0)), date(2024, 1, 8));

        assert_eq!(Period::Week.end_date(date(2024, 1, 1)), date(2024, 1, 7));
    }

    #[test]
    fn test_week_spanning_month_boundary() {
        // 2024-01-29 is a Monday; its week runs into February
        assert_eq!(Period::Week.start_date(at(2024, 2, 2, 8)), date(2024, 1, 29));
        assert_eq!(Period::Week.end_date(date(2024, 1, 29)), date(2024, 2, 4));
    }

    #[test]
    fn test_month_boundaries() {
        let start = Period::Month.start_date(at(2024, 2, 14, 9));
        assert_eq!(start, date(2024, 2, 1));
        // Leap year February
        assert_eq!(Period::Month.end_date(start), date(2024, 2, 29));
        assert_eq!(Period::Month.end_date(date(2023, 2, 1)), date(2023, 2, 28));
        assert_eq!(Period::Month.end_date(date(2024, 12, 1)), date(2024, 12, 31));
    }

    #[test]
    fn test_year_boundaries() {
        let start = Period::Year.start_date(at(2024, 7, 4, 15));
        assert_eq!(start, date(2024, 1, 1));
        assert_eq!(Period::Year.end_date(start), date(2024, 12, 31));
    }

    #[test]
    fn test_display_labels() {
        assert_eq!(Period::Day.to_string(), "day");
        assert_eq!(Period::Week.to_string(), "week");
        assert_eq!(Period::Month.to_string(), "month");
        assert_eq!(Period::Year.to_string(), "year");
    }
}
