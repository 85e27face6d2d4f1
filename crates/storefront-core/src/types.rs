//! # Domain Types
//!
//! Core domain types used throughout the storefront admin backend.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │   Inventory     │   │      Sale       │       │
//! │  │  ─────────────  │ 1:1│  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │◄──│  product_id(FK) │   │  product_id(FK) │       │
//! │  │  name (unique)  │   │  quantity       │   │  quantity_sold  │       │
//! │  │  price          │   │  low_stock_     │   │  sale_price_    │       │
//! │  │  category       │   │    threshold    │   │    per_unit     │       │
//! │  └─────────────────┘   └─────────────────┘   │  total_revenue  │       │
//! │          │ 1:N                               │  sale_date      │       │
//! │          └──────────────────────────────────►└─────────────────┘       │
//! │                                                                         │
//! │  Lifetimes: Inventory and Sale rows live and die with their Product.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! `Sale.sale_price_per_unit` freezes the product price at sale time.
//! `total_revenue` is computed once (`quantity_sold × sale_price_per_unit`)
//! and never recomputed; later price changes must not rewrite history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::DEFAULT_LOW_STOCK_THRESHOLD;

// =============================================================================
// Product
// =============================================================================

/// A sellable catalog item with a price and a case-insensitively unique name.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name. Unique across the catalog, compared case-insensitively.
    pub name: String,

    /// Optional free-form description.
    pub description: Option<String>,

    /// Optional category, used for filtering and revenue grouping.
    pub category: Option<String>,

    /// Current selling price per unit. Strictly positive at creation.
    pub price: f64,

    /// When the product was created.
    pub created_at: DateTime<Utc>,

    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Inventory
// =============================================================================

/// The stock-count record paired 1:1 with a Product.
///
/// Created atomically with its Product; mutated by inventory updates and
/// implicitly by sale recording (decrement). Never exists on its own.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Inventory {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Owning product (unique foreign key).
    pub product_id: String,

    /// Units currently in stock. Never negative.
    pub quantity: i64,

    /// Stock level at or below which the product counts as low stock.
    pub low_stock_threshold: i64,

    /// When the record was last mutated.
    pub last_updated: DateTime<Utc>,
}

impl Inventory {
    /// Checks whether this record is in the low-stock view.
    #[inline]
    pub fn is_low_stock(&self) -> bool {
        self.quantity <= self.low_stock_threshold
    }
}

// =============================================================================
// Sale
// =============================================================================

/// An immutable record of one stock-decreasing transaction.
///
/// Uses the snapshot pattern: the unit price is frozen at sale time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Sale {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Product that was sold.
    pub product_id: String,

    /// Units sold. Strictly positive.
    pub quantity_sold: i64,

    /// Unit price at time of sale (frozen).
    pub sale_price_per_unit: f64,

    /// `quantity_sold × sale_price_per_unit`, computed once and frozen.
    pub total_revenue: f64,

    /// When the sale happened. Indexed together with product_id for
    /// range queries.
    pub sale_date: DateTime<Utc>,
}

// =============================================================================
// Composite Read Models
// =============================================================================

/// A product together with its paired inventory record.
///
/// Returned by catalog reads so callers see stock levels without a second
/// round trip. `inventory` is optional only to survive the (defensive)
/// integrity-fault case of a product without an inventory row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductWithInventory {
    #[serde(flatten)]
    pub product: Product,
    pub inventory: Option<Inventory>,
}

// =============================================================================
// Write Models (typed inputs from the request boundary)
// =============================================================================

/// Input for product creation.
///
/// Creates the Product row and its paired Inventory row as one unit of
/// work.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    /// Must be strictly positive.
    pub price: f64,
    /// Starting stock quantity. Must not be negative.
    pub initial_quantity: i64,
    /// Defaults to [`DEFAULT_LOW_STOCK_THRESHOLD`] when absent.
    #[serde(default)]
    pub low_stock_threshold: Option<i64>,
}

impl NewProduct {
    /// Returns the effective low-stock threshold (explicit or default).
    #[inline]
    pub fn threshold_or_default(&self) -> i64 {
        self.low_stock_threshold
            .unwrap_or(DEFAULT_LOW_STOCK_THRESHOLD)
    }
}

/// Partial update for a product.
///
/// ## Presence Tagging
/// Every field is individually presence-tagged. For the nullable fields
/// (description, category) a double `Option` distinguishes the three
/// cases that a single `Option` would collapse:
///
/// ```text
/// field absent          → None              → leave untouched
/// field present, null   → Some(None)        → clear the value
/// field present, value  → Some(Some(value)) → set the value
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductPatch {
    /// New name; re-validated for case-insensitive uniqueness against all
    /// other products when it differs from the current name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<Option<String>>,

    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub category: Option<Option<String>>,

    /// New price; must be strictly positive when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
}

impl ProductPatch {
    /// True when no field is present (the patch is a no-op).
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.price.is_none()
    }
}

/// Partial update for an inventory record.
///
/// Both fields are independently optional; an empty patch is an
/// idempotent success (callers wanting to reject empty updates do so at
/// the request boundary).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InventoryPatch {
    /// Absolute new quantity. Must not be negative when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i64>,

    /// New low-stock threshold. Must not be negative when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low_stock_threshold: Option<i64>,
}

impl InventoryPatch {
    /// True when no field is present.
    pub fn is_empty(&self) -> bool {
        self.quantity.is_none() && self.low_stock_threshold.is_none()
    }
}

/// Input for sale recording.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSale {
    pub product_id: String,
    /// Units to sell. Must be strictly positive.
    pub quantity_sold: i64,
}

// =============================================================================
// Query Models
// =============================================================================

/// Filters for listing sales.
///
/// Date bounds are inclusive full timestamps. Callers working with whole
/// dates expand them to start-of-day / end-of-day before building the
/// filter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SalesFilter {
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub product_id: Option<String>,
    /// Case-insensitive category match (joins against products).
    #[serde(default)]
    pub category: Option<String>,
}

/// A single aggregated revenue window.
///
/// Returned both for ad-hoc summaries (`period = "custom"`) and for
/// calendar buckets (`period = "day" | "week" | "month" | "year"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenueSummary {
    pub period: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub total_revenue: f64,
}

/// Request for a period-over-period revenue comparison.
///
/// The two windows are independent; they may overlap or sit far apart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonRequest {
    pub period1_start: DateTime<Utc>,
    pub period1_end: DateTime<Utc>,
    pub period2_start: DateTime<Utc>,
    pub period2_end: DateTime<Utc>,
    /// Optional case-insensitive category filter applied to both windows.
    #[serde(default)]
    pub category: Option<String>,
}

// =============================================================================
// Serde Helpers
// =============================================================================

/// Deserializes a present-but-possibly-null field into `Some(inner)`.
///
/// Combined with `#[serde(default)]`, an absent field stays `None` while
/// an explicit `null` becomes `Some(None)`. This is what keeps "clear
/// this field" and "don't touch this field" distinguishable.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

// =============================================================================
// Unit Tests
// =============================================================================
