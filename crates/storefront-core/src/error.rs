//! # Error Types
//!
//! Domain-specific error types for storefront-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  storefront-core errors (this file)                                    │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  storefront-db errors (separate crate)                                 │
//! │  ├── DbError          - Infrastructure failures (5xx-equivalent)       │
//! │  └── StoreError       - CoreError | DbError, returned by operations    │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → StoreError → request boundary     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (product id, amounts, etc.)
//! 3. Errors are enum variants, never String
//! 4. Business failures map to 4xx-equivalents at the request boundary,
//!    infrastructure failures to 5xx-equivalents

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations or domain logic failures.
/// They should be caught and translated to user-friendly messages.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product cannot be found.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// A referenced entity (inventory row, etc.) cannot be found.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Product name collides case-insensitively with an existing product.
    ///
    /// ## When This Occurs
    /// - Creating a product whose name matches an existing one
    /// - Renaming a product to another product's name
    ///
    /// Uniqueness is checked at write time by the domain operation; a
    /// storage-level `UNIQUE` violation is mapped to this same variant as
    /// a fallback.
    #[error("Product name '{0}' already exists")]
    DuplicateName(String),

    /// Insufficient stock to record a sale.
    ///
    /// ## When This Occurs
    /// - Requested quantity exceeds the inventory quantity
    ///
    /// ## User Workflow
    /// ```text
    /// Record sale (qty: 5)
    ///      │
    ///      ▼
    /// Check stock: available=3
    ///      │
    ///      ▼
    /// InsufficientStock { product_id, available: 3, requested: 5 }
    ///      │
    ///      ▼
    /// Caller shows: "Only 3 in stock"  (no inventory mutation happened)
    /// ```
    #[error("Insufficient stock for product {product_id}: available {available}, requested {requested}")]
    InsufficientStock {
        product_id: String,
        available: i64,
        requested: i64,
    },

    /// A product exists with no paired inventory row.
    ///
    /// This is a data-integrity fault, not ordinary user error: product
    /// creation writes both rows in one transaction, so this state should
    /// be unreachable. It is still handled defensively.
    #[error("Inventory record missing for product {0} (data-integrity fault)")]
    InventoryMissing(String),

    /// An unrecognized revenue aggregation granularity was requested.
    ///
    /// Raised before any query executes.
    #[error("Invalid period '{0}': use 'day', 'week', 'month', or 'year'")]
    InvalidPeriod(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when caller-supplied values violate field
/// constraints. They are detected before any storage interaction.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be strictly positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustBeNonNegative { field: String },

    /// A date range where the start falls after the end.
    #[error("start date must not be after end date")]
    InvalidDateRange,
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
