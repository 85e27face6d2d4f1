//! # Revenue Repository
//!
//! Revenue summaries, calendar bucketing, and window comparison.
//!
//! ## Division of Labor
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Revenue Reporting                                   │
//! │                                                                         │
//! │  summary(start, end, product?, category?)                               │
//! │       └── SQL: COALESCE(SUM(total_revenue), 0) over the range          │
//! │                                                                         │
//! │  by_period(period, start, end)                                          │
//! │       ├── parse the period string FIRST (InvalidPeriod, no query)      │
//! │       ├── SQL: project (sale_date, total_revenue) rows in range        │
//! │       └── storefront_core::bucket_sales does the calendar math         │
//! │                                                                         │
//! │  compare(request)                                                       │
//! │       ├── two independent summary() calls                              │
//! │       └── storefront_core::compare_windows shapes the result           │
//! │                                                                         │
//! │  SQL fetches, the core computes. Bucket boundaries never depend on     │
//! │  the storage engine's date functions.                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::StoreResult;
use storefront_core::{
    bucket_sales, compare_windows, validation, ComparisonRequest, Period, RevenueComparison,
    RevenueSummary,
};

/// Repository for revenue reporting.
#[derive(Debug, Clone)]
pub struct RevenueRepository {
    pool: SqlitePool,
}

impl RevenueRepository {
    /// Creates a new RevenueRepository.
    pub fn new(pool: SqlitePool) -> Self {
        RevenueRepository { pool }
    }

    /// Sums `total_revenue` over an inclusive [start, end] range.
    ///
    /// Optionally narrowed by product id or case-insensitive category.
    /// An empty match set yields 0.0, not an error.
    pub async fn summary(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        product_id: Option<&str>,
        category: Option<&str>,
    ) -> StoreResult<f64> {
        debug!(%start, %end, product_id, category, "Computing revenue summary");

        let mut builder = sqlx::QueryBuilder::new(
            "SELECT COALESCE(SUM(s.total_revenue), 0.0) FROM sales s",
        );

        if category.is_some() {
            builder.push(" INNER JOIN products p ON p.id = s.product_id");
        }

        builder.push(" WHERE s.sale_date >= ");
        builder.push_bind(start);
        builder.push(" AND s.sale_date <= ");
        builder.push_bind(end);

        if let Some(product_id) = product_id {
            builder.push(" AND s.product_id = ");
            builder.push_bind(product_id);
        }
        if let Some(category) = category {
            builder.push(" AND LOWER(p.category) = LOWER(");
            builder.push_bind(category);
            builder.push(")");
        }

        let total: f64 = builder
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        Ok(total)
    }

    /// Buckets revenue by calendar period over an inclusive range.
    ///
    /// `period` parses from `day`, `week`, `month`, or `year`; an
    /// unrecognized string fails with `InvalidPeriod` before any query
    /// runs. Buckets ascend by period start, each clipped to `end`.
    pub async fn by_period(
        &self,
        period: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> StoreResult<Vec<RevenueSummary>> {
        // Reject bad input before touching the pool
        let period = period.parse::<Period>()?;
        validation::validate_date_range(start, end)?;

        debug!(%period, %start, %end, "Bucketing revenue by period");

        let rows: Vec<(DateTime<Utc>, f64)> = sqlx::query_as(
            r#"
            SELECT sale_date, total_revenue
            FROM sales
            WHERE sale_date >= ?1 AND sale_date <= ?2
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(bucket_sales(period, &rows, end))
    }

    /// Compares total revenue between two independent windows.
    ///
    /// Each window is summed separately (optionally narrowed by the
    /// request's category), then `difference = revenue2 - revenue1` and a
    /// percentage change where defined.
    pub async fn compare(&self, request: &ComparisonRequest) -> StoreResult<RevenueComparison> {
        validation::validate_date_range(request.period1_start, request.period1_end)?;
        validation::validate_date_range(request.period2_start, request.period2_end)?;

        let category = request.category.as_deref();

        let period1_revenue = self
            .summary(request.period1_start, request.period1_end, None, category)
            .await?;
        let period2_revenue = self
            .summary(request.period2_start, request.period2_end, None, category)
            .await?;

        Ok(compare_windows(
            period1_revenue,
            period2_revenue,
            request.category.clone(),
        ))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
