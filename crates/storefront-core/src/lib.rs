//! # storefront-core: Pure Business Logic for the Storefront Admin Backend
//!
//! This crate is the **heart** of the storefront admin backend. It contains
//! the business rules as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   Storefront Admin Architecture                         │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              Request Layer (HTTP / IPC / CLI)                   │   │
//! │  │    out of tree: validates payloads, maps errors to statuses     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ typed inputs / typed errors            │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ storefront-core (THIS CRATE) ★                  │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │  revenue  │  │  period   │  │ validation│  │   │
//! │  │   │  Product  │  │  buckets  │  │ Day/Week  │  │   rules   │  │   │
//! │  │   │ Inventory │  │  compare  │  │Month/Year │  │  checks   │  │   │
//! │  │   │   Sale    │  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │   └───────────┘                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 storefront-db (Database Layer)                  │   │
//! │  │           SQLite queries, migrations, repositories              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Inventory, Sale, DTOs)
//! - [`error`] - Domain error types
//! - [`period`] - Calendar period granularities and boundary math
//! - [`revenue`] - Revenue bucketing and period comparison
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Explicit Errors**: All errors are typed, never strings or panics
//! 4. **Frozen History**: Sale records snapshot the unit price; later product
//!    changes never rewrite recorded revenue

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod period;
pub mod revenue;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use storefront_core::Product` instead of
// `use storefront_core::types::Product`

pub use error::{CoreError, CoreResult, ValidationError};
pub use period::Period;
pub use revenue::{bucket_sales, compare_windows, RevenueComparison};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default low-stock threshold applied when product creation omits one.
///
/// ## Business Reason
/// Every inventory row participates in the low-stock view
/// (`quantity <= low_stock_threshold`); a sensible default keeps newly
/// created products visible in alerts without extra configuration.
pub const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 10;

/// Maximum length of a product name.
pub const MAX_NAME_LENGTH: usize = 255;

/// Maximum length of a product description.
pub const MAX_DESCRIPTION_LENGTH: usize = 1000;

/// Maximum length of a product category.
pub const MAX_CATEGORY_LENGTH: usize = 100;
