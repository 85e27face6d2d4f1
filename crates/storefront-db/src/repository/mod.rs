//! # Repositories
//!
//! Repository implementations for the storefront database. The
//! repositories ARE the domain-operations layer: each public method is
//! one operation with typed inputs, typed results, and typed errors.
//!
//! ## Organization
//! ```text
//! repository/
//! ├── product.rs    - Catalog CRUD (creation pairs the inventory row)
//! ├── inventory.rs  - Stock reads, low-stock view, partial updates
//! ├── sale.rs       - Transactional sale recording + sales listing
//! └── revenue.rs    - Summaries, calendar bucketing, comparisons
//! ```

pub mod inventory;
pub mod product;
pub mod revenue;
pub mod sale;

// =============================================================================
// Shared Test Harness
// =============================================================================

#[cfg(test)]
pub(crate) mod testutil {
    use std::sync::Once;

    use storefront_core::NewProduct;

    use crate::pool::{Database, DbConfig};

    static TRACING: Once = Once::new();

    /// Fresh in-memory database with migrations applied and test-friendly
    /// tracing output.
    pub async fn test_db() -> Database {
        TRACING.call_once(|| {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
                .with_test_writer()
                .try_init();
        });

        Database::new(DbConfig::in_memory())
            .await
            .expect("in-memory database")
    }

    /// A minimal valid product-creation input.
    pub fn product_input(name: &str, price: f64, initial_quantity: i64) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            description: None,
            category: None,
            price,
            initial_quantity,
            low_stock_threshold: None,
        }
    }
}
