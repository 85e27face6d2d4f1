//! # Validation Module
//!
//! Input validation for the storefront admin backend.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Request boundary (out of tree)                               │
//! │  ├── Payload shape, field presence, string lengths                     │
//! │  └── Immediate caller feedback                                         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE - field constraints re-checked before storage    │
//! │  ├── price > 0, quantities >= 0, sale quantity > 0                     │
//! │  └── Anything a repository must not trust the boundary for             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK constraints (price >= 0, quantity >= 0, ...)                │
//! │  ├── UNIQUE constraint on products.name (COLLATE NOCASE)               │
//! │  └── Foreign key constraints                                           │
//! │                                                                         │
//! │  Defense in depth: each layer catches what the one above missed        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Business invariants that need a storage round trip (name uniqueness,
//! stock sufficiency) live in the repositories, not here.

use crate::error::ValidationError;
use crate::types::{InventoryPatch, NewProduct, NewSale, ProductPatch};
use crate::{MAX_CATEGORY_LENGTH, MAX_DESCRIPTION_LENGTH, MAX_NAME_LENGTH};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Field Validators
// =============================================================================

/// Validates a product name.
///
/// ## Rules
/// - Must not be empty (after trimming)
/// - Must be at most 255 characters
///
/// Uniqueness is a storage-backed invariant and is checked by the catalog
/// operation, not here.
pub fn validate_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.len() > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_NAME_LENGTH,
        });
    }

    Ok(())
}

/// Validates an optional description (max 1000 characters).
pub fn validate_description(description: Option<&str>) -> ValidationResult<()> {
    if let Some(desc) = description {
        if desc.len() > MAX_DESCRIPTION_LENGTH {
            return Err(ValidationError::TooLong {
                field: "description".to_string(),
                max: MAX_DESCRIPTION_LENGTH,
            });
        }
    }
    Ok(())
}

/// Validates an optional category (max 100 characters).
pub fn validate_category(category: Option<&str>) -> ValidationResult<()> {
    if let Some(cat) = category {
        if cat.len() > MAX_CATEGORY_LENGTH {
            return Err(ValidationError::TooLong {
                field: "category".to_string(),
                max: MAX_CATEGORY_LENGTH,
            });
        }
    }
    Ok(())
}

/// Validates a product price.
///
/// ## Rules
/// - Must be strictly positive and finite
///
/// Recorded sale prices may legitimately be zero or more; this check
/// applies to the live catalog price a caller supplies.
pub fn validate_price(price: f64) -> ValidationResult<()> {
    if !price.is_finite() || price <= 0.0 {
        return Err(ValidationError::MustBePositive {
            field: "price".to_string(),
        });
    }
    Ok(())
}

/// Validates a stock quantity (initial or absolute update).
///
/// Zero is allowed; stock may run out.
pub fn validate_stock_quantity(quantity: i64) -> ValidationResult<()> {
    if quantity < 0 {
        return Err(ValidationError::MustBeNonNegative {
            field: "quantity".to_string(),
        });
    }
    Ok(())
}

/// Validates a low-stock threshold.
pub fn validate_threshold(threshold: i64) -> ValidationResult<()> {
    if threshold < 0 {
        return Err(ValidationError::MustBeNonNegative {
            field: "low_stock_threshold".to_string(),
        });
    }
    Ok(())
}

/// Validates a sale quantity.
///
/// ## Rules
/// - Must be strictly positive; a zero-unit sale is meaningless
pub fn validate_sale_quantity(quantity: i64) -> ValidationResult<()> {
    if quantity <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity_sold".to_string(),
        });
    }
    Ok(())
}

/// Validates an inclusive [start, end] timestamp range.
///
/// A single-instant range (start == end) is valid.
pub fn validate_date_range(
    start: chrono::DateTime<chrono::Utc>,
    end: chrono::DateTime<chrono::Utc>,
) -> ValidationResult<()> {
    if start > end {
        return Err(ValidationError::InvalidDateRange);
    }
    Ok(())
}

// =============================================================================
// Composite Validators
// =============================================================================

/// Validates a complete product-creation input.
pub fn validate_new_product(input: &NewProduct) -> ValidationResult<()> {
    validate_name(&input.name)?;
    validate_description(input.description.as_deref())?;
    validate_category(input.category.as_deref())?;
    validate_price(input.price)?;
    validate_stock_quantity(input.initial_quantity)?;
    validate_threshold(input.threshold_or_default())?;
    Ok(())
}

/// Validates the fields present in a product patch.
///
/// An empty patch is valid; absence means "leave untouched".
pub fn validate_product_patch(patch: &ProductPatch) -> ValidationResult<()> {
    if let Some(name) = &patch.name {
        validate_name(name)?;
    }
    if let Some(description) = &patch.description {
        validate_description(description.as_deref())?;
    }
    if let Some(category) = &patch.category {
        validate_category(category.as_deref())?;
    }
    if let Some(price) = patch.price {
        validate_price(price)?;
    }
    Ok(())
}

/// Validates the fields present in an inventory patch.
pub fn validate_inventory_patch(patch: &InventoryPatch) -> ValidationResult<()> {
    if let Some(quantity) = patch.quantity {
        validate_stock_quantity(quantity)?;
    }
    if let Some(threshold) = patch.low_stock_threshold {
        validate_threshold(threshold)?;
    }
    Ok(())
}

/// Validates a sale-recording input.
pub fn validate_new_sale(input: &NewSale) -> ValidationResult<()> {
    if input.product_id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "product_id".to_string(),
        });
    }
    validate_sale_quantity(input.quantity_sold)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn widget() -> NewProduct {
        NewProduct {
            name: "Widget".to_string(),
            description: None,
            category: None,
            price: 10.0,
            initial_quantity: 5,
            low_stock_threshold: None,
        }
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("Widget").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name("   ").is_err());
        assert!(validate_name(&"A".repeat(300)).is_err());
    }

    #[test]
    fn test_validate_price() {
        assert!(validate_price(10.0).is_ok());
        assert!(validate_price(0.01).is_ok());

        assert!(validate_price(0.0).is_err());
        assert!(validate_price(-5.0).is_err());
        assert!(validate_price(f64::NAN).is_err());
        assert!(validate_price(f64::INFINITY).is_err());
    }

    #[test]
    fn test_validate_quantities() {
        assert!(validate_stock_quantity(0).is_ok());
        assert!(validate_stock_quantity(100).is_ok());
        assert!(validate_stock_quantity(-1).is_err());

        assert!(validate_sale_quantity(1).is_ok());
        assert!(validate_sale_quantity(0).is_err());
        assert!(validate_sale_quantity(-3).is_err());
    }

    #[test]
    fn test_validate_new_product() {
        assert!(validate_new_product(&widget()).is_ok());

        let bad_price = NewProduct { price: 0.0, ..widget() };
        assert!(validate_new_product(&bad_price).is_err());

        let bad_qty = NewProduct { initial_quantity: -1, ..widget() };
        assert!(validate_new_product(&bad_qty).is_err());

        let bad_threshold = NewProduct {
            low_stock_threshold: Some(-2),
            ..widget()
        };
        assert!(validate_new_product(&bad_threshold).is_err());
    }

    #[test]
    fn test_validate_patches() {
        assert!(validate_product_patch(&ProductPatch::default()).is_ok());
        assert!(validate_inventory_patch(&InventoryPatch::default()).is_ok());

        let patch = ProductPatch {
            price: Some(-1.0),
            ..ProductPatch::default()
        };
        assert!(validate_product_patch(&patch).is_err());

        // Clearing a nullable field is always valid
        let patch = ProductPatch {
            description: Some(None),
            ..ProductPatch::default()
        };
        assert!(validate_product_patch(&patch).is_ok());

        let patch = InventoryPatch {
            quantity: Some(-5),
            low_stock_threshold: None,
        };
        assert!(validate_inventory_patch(&patch).is_err());
    }

    #[test]
    fn test_validate_date_range() {
        use chrono::{TimeZone, Utc};

        let early = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();

        assert!(validate_date_range(early, late).is_ok());
        assert!(validate_date_range(early, early).is_ok());
        assert!(validate_date_range(late, early).is_err());
    }

    #[test]
    fn test_validate_new_sale() {
        let sale = NewSale {
            product_id: "p-1".to_string(),
            quantity_sold: 3,
        };
        assert!(validate_new_sale(&sale).is_ok());

        let sale = NewSale {
            product_id: "".to_string(),
            quantity_sold: 3,
        };
        assert!(validate_new_sale(&sale).is_err());
    }
}
