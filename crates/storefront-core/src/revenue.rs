//! # Revenue Aggregation
//!
//! Pure bucketing and comparison math over sale records.
//!
//! ## Data Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Revenue Aggregation Flow                            │
//! │                                                                         │
//! │  storefront-db fetches (sale_date, total_revenue) rows for a range     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  bucket_sales(period, rows, range_end)   ← THIS MODULE (pure)          │
//! │       │                                                                 │
//! │       ├── key each sale by Period::start_date(sale_date)               │
//! │       ├── sum revenue per key (BTreeMap keeps keys ascending)          │
//! │       └── clip each bucket's natural end to the requested range end    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Vec<RevenueSummary>, ascending by period start                        │
//! │                                                                         │
//! │  Invariant: the bucket sums total exactly the unbucketed summary        │
//! │  over the same range - no sale double-counted or dropped.              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::period::Period;
use crate::types::RevenueSummary;

// =============================================================================
// Bucketing
// =============================================================================

/// Groups sales into calendar buckets and sums revenue per bucket.
///
/// `sales` is the raw `(sale_date, total_revenue)` projection of the rows
/// matching the caller's range; `range_end` is the caller's inclusive end
/// bound, used to clip the final bucket's exposed end.
///
/// Buckets are returned ascending by period start. Empty input yields an
/// empty vector (not an error).
pub fn bucket_sales(
    period: Period,
    sales: &[(DateTime<Utc>, f64)],
    range_end: DateTime<Utc>,
) -> Vec<RevenueSummary> {
    // BTreeMap gives ascending iteration over period starts for free
    let mut buckets: BTreeMap<chrono::NaiveDate, f64> = BTreeMap::new();
    for (sale_date, revenue) in sales {
        *buckets.entry(period.start_date(*sale_date)).or_insert(0.0) += revenue;
    }

    buckets
        .into_iter()
        .map(|(start, revenue)| {
            let natural_end = period.end_instant(start);
            RevenueSummary {
                period: period.as_str().to_string(),
                start_date: Period::start_instant(start),
                // Never report past what the caller asked for
                end_date: natural_end.min(range_end),
                total_revenue: revenue,
            }
        })
        .collect()
}

// =============================================================================
// Comparison
// =============================================================================

/// Result of comparing total revenue between two windows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenueComparison {
    pub period1_revenue: f64,
    pub period2_revenue: f64,
    /// `period2_revenue - period1_revenue`.
    pub difference: f64,
    /// `difference / period1_revenue * 100`.
    ///
    /// `None` (serialized as `null`) when the baseline window has zero
    /// revenue and the windows differ: the percentage is undefined, and a
    /// signed-infinity sentinel would not round-trip through JSON.
    /// `Some(0.0)` when both windows are zero.
    pub percentage_change: Option<f64>,
    /// Category filter the comparison was computed under, echoed back.
    pub category: Option<String>,
}

/// Computes the difference and percentage change between two revenue
/// windows.
///
/// Antisymmetric in the difference: swapping the windows negates it.
pub fn compare_windows(
    period1_revenue: f64,
    period2_revenue: f64,
    category: Option<String>,
) -> RevenueComparison {
    let difference = period2_revenue - period1_revenue;

    let percentage_change = if period1_revenue != 0.0 {
        Some(difference / period1_revenue * 100.0)
    } else if difference == 0.0 {
        Some(0.0)
    } else {
        // Undefined: growth from a zero baseline has no finite percentage
        None
    };

    RevenueComparison {
        period1_revenue,
        period2_revenue,
        difference,
        percentage_change,
        category,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn sample_sales() -> Vec<(DateTime<Utc>, f64)> {
        vec![
            (at(2024, 1, 3, 10), 30.0),  // Wed, week of Jan 1
            (at(2024, 1, 3, 15), 12.5),  // same day
            (at(2024, 1, 7, 9), 7.5),    // Sun, still week of Jan 1
            (at(2024, 1, 8, 11), 40.0),  // Mon, next week
            (at(2024, 2, 14, 12), 20.0), // next month
        ]
    }

    #[test]
    fn test_day_buckets() {
        let range_end = at(2024, 3, 1, 0);
        let buckets = bucket_sales(Period::Day, &sample_sales(), range_end);

        assert_eq!(buckets.len(), 4);
        assert_eq!(buckets[0].start_date, at(2024, 1, 3, 0));
        assert_eq!(buckets[0].total_revenue, 42.5);
        assert_eq!(buckets[0].period, "day");
        // Ascending by period start
        assert!(buckets.windows(2).all(|w| w[0].start_date < w[1].start_date));
    }

    #[test]
    fn test_week_buckets_monday_aligned() {
        let range_end = at(2024, 3, 1, 0);
        let buckets = bucket_sales(Period::Week, &sample_sales(), range_end);

        assert_eq!(buckets.len(), 3);
        // Jan 3 + Jan 7 share the Monday Jan 1 bucket
        assert_eq!(buckets[0].start_date, at(2024, 1, 1, 0));
        assert_eq!(buckets[0].total_revenue, 50.0);
        assert_eq!(buckets[1].start_date, at(2024, 1, 8, 0));
        assert_eq!(buckets[1].total_revenue, 40.0);
    }

    #[test]
    fn test_bucket_coverage_equals_total() {
        // No sale double-counted or dropped across bucket boundaries
        let sales = sample_sales();
        let total: f64 = sales.iter().map(|(_, r)| r).sum();
        let range_end = at(2024, 3, 1, 0);

        for period in [Period::Day, Period::Week, Period::Month, Period::Year] {
            let bucketed: f64 = bucket_sales(period, &sales, range_end)
                .iter()
                .map(|b| b.total_revenue)
                .sum();
            assert!((bucketed - total).abs() < 1e-9, "coverage broken for {period}");
        }
    }

    #[test]
    fn test_bucket_end_clipped_to_range() {
        // Range ends mid-month: the February bucket must not report past it
        let range_end = at(2024, 2, 20, 12);
        let buckets = bucket_sales(Period::Month, &sample_sales(), range_end);

        let feb = buckets.last().unwrap();
        assert_eq!(feb.start_date, at(2024, 2, 1, 0));
        assert_eq!(feb.end_date, range_end);

        // January's natural end fits inside the range and is kept
        let jan = &buckets[0];
        assert_eq!(
            jan.end_date,
            chrono::NaiveDate::from_ymd_opt(2024, 1, 31)
                .unwrap()
                .and_hms_micro_opt(23, 59, 59, 999_999)
                .unwrap()
                .and_utc()
        );
    }

    #[test]
    fn test_empty_input_yields_no_buckets() {
        let buckets = bucket_sales(Period::Day, &[], at(2024, 1, 1, 0));
        assert!(buckets.is_empty());
    }

    #[test]
    fn test_comparison_basic() {
        let cmp = compare_windows(100.0, 150.0, None);
        assert_eq!(cmp.difference, 50.0);
        assert_eq!(cmp.percentage_change, Some(50.0));

        let cmp = compare_windows(200.0, 150.0, Some("gadgets".to_string()));
        assert_eq!(cmp.difference, -50.0);
        assert_eq!(cmp.percentage_change, Some(-25.0));
        assert_eq!(cmp.category.as_deref(), Some("gadgets"));
    }

    #[test]
    fn test_comparison_antisymmetric_difference() {
        let ab = compare_windows(80.0, 230.0, None);
        let ba = compare_windows(230.0, 80.0, None);
        assert_eq!(ab.difference, -ba.difference);
    }

    #[test]
    fn test_comparison_zero_baseline() {
        // Growth from nothing: percentage is undefined, not infinite
        let cmp = compare_windows(0.0, 42.0, None);
        assert_eq!(cmp.difference, 42.0);
        assert_eq!(cmp.percentage_change, None);

        // Decline to nothing from nothing: flat
        let cmp = compare_windows(0.0, 0.0, None);
        assert_eq!(cmp.percentage_change, Some(0.0));
    }

    #[test]
    fn test_comparison_serializes_null_not_infinity() {
        let cmp = compare_windows(0.0, 42.0, None);
        let json = serde_json::to_value(&cmp).unwrap();
        assert!(json["percentage_change"].is_null());
    }
}
