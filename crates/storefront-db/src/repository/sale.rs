//! # Sale Repository
//!
//! Transactional sale recording and sales listing.
//!
//! ## Recording Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Sale Recording                                     │
//! │                                                                         │
//! │  record(NewSale { product_id, quantity_sold })                          │
//! │       │                                                                 │
//! │       ▼  BEGIN TRANSACTION                                              │
//! │  1. Resolve product          → ProductNotFound                          │
//! │  2. Resolve inventory        → InventoryMissing (integrity fault)       │
//! │  3. Check stock              → InsufficientStock (nothing mutated)      │
//! │  4. Snapshot current price, freeze total_revenue                       │
//! │  5. Guarded decrement: UPDATE ... AND quantity >= requested            │
//! │  6. INSERT sale row                                                     │
//! │       │                                                                 │
//! │       ▼  COMMIT (both rows or neither)                                  │
//! │  Sale returned; later price changes never touch it                      │
//! │                                                                         │
//! │  Concurrency: the transaction serializes against other writers of      │
//! │  the same inventory row; the guard in step 5 rechecks the quantity     │
//! │  at decrement time, so two sales can never jointly oversell.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, StoreResult};
use storefront_core::{validation, CoreError, Inventory, NewSale, Product, Sale, SalesFilter};

/// Repository for sale operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Records a sale and decrements inventory as one atomic unit.
    ///
    /// ## Snapshot Pattern
    /// The product's CURRENT price is copied into the sale row and
    /// `total_revenue` is computed once. Querying the sale later must
    /// show the price paid, whatever the product costs by then.
    ///
    /// ## Errors
    /// - `Validation` - quantity_sold not positive
    /// - `ProductNotFound` - no such product
    /// - `InventoryMissing` - product exists without an inventory row
    ///   (data-integrity fault, distinct from user error)
    /// - `InsufficientStock` - requested quantity exceeds stock; carries
    ///   both amounts, and NO mutation occurred
    pub async fn record(&self, input: NewSale) -> StoreResult<Sale> {
        validation::validate_new_sale(&input)?;

        debug!(product_id = %input.product_id, quantity = input.quantity_sold, "Recording sale");

        let mut tx = self.pool.begin().await?;

        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, description, category, price, created_at, updated_at
            FROM products
            WHERE id = ?1
            "#,
        )
        .bind(&input.product_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| CoreError::ProductNotFound(input.product_id.clone()))?;

        let inventory = sqlx::query_as::<_, Inventory>(
            r#"
            SELECT id, product_id, quantity, low_stock_threshold, last_updated
            FROM inventory
            WHERE product_id = ?1
            "#,
        )
        .bind(&input.product_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| CoreError::InventoryMissing(input.product_id.clone()))?;

        if inventory.quantity < input.quantity_sold {
            // Transaction rolls back on drop; nothing was mutated
            return Err(CoreError::InsufficientStock {
                product_id: input.product_id,
                available: inventory.quantity,
                requested: input.quantity_sold,
            }
            .into());
        }

        let now = Utc::now();
        let sale = Sale {
            id: Uuid::new_v4().to_string(),
            product_id: product.id.clone(),
            quantity_sold: input.quantity_sold,
            sale_price_per_unit: product.price,
            total_revenue: input.quantity_sold as f64 * product.price,
            sale_date: now,
        };

        // Guarded decrement: the quantity predicate re-checks stock at
        // write time, so a concurrent sale that got there first cannot
        // leave us overselling
        let result = sqlx::query(
            r#"
            UPDATE inventory
            SET quantity = quantity - ?2, last_updated = ?3
            WHERE product_id = ?1 AND quantity >= ?2
            "#,
        )
        .bind(&input.product_id)
        .bind(input.quantity_sold)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::InsufficientStock {
                product_id: input.product_id,
                available: inventory.quantity,
                requested: input.quantity_sold,
            }
            .into());
        }

        sqlx::query(
            r#"
            INSERT INTO sales (id, product_id, quantity_sold, sale_price_per_unit, total_revenue, sale_date)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&sale.id)
        .bind(&sale.product_id)
        .bind(sale.quantity_sold)
        .bind(sale.sale_price_per_unit)
        .bind(sale.total_revenue)
        .bind(sale.sale_date)
        .execute(&mut *tx)
        .await?;

        tx.commit().await.map_err(DbError::commit_failed)?;

        info!(
            sale_id = %sale.id,
            product_id = %sale.product_id,
            quantity = sale.quantity_sold,
            revenue = sale.total_revenue,
            "Sale recorded"
        );

        Ok(sale)
    }

    /// Gets a sale by ID.
    pub async fn get_by_id(&self, id: &str) -> StoreResult<Option<Sale>> {
        let sale = sqlx::query_as::<_, Sale>(
            r#"
            SELECT id, product_id, quantity_sold, sale_price_per_unit, total_revenue, sale_date
            FROM sales
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sale)
    }

    /// Lists sales, newest first, with pagination and optional filters.
    ///
    /// Date bounds are inclusive. The category filter joins against
    /// products and matches case-insensitively.
    pub async fn list(
        &self,
        filter: &SalesFilter,
        skip: i64,
        limit: i64,
    ) -> StoreResult<Vec<Sale>> {
        debug!(skip, limit, filter = ?filter, "Listing sales");

        let mut builder = sqlx::QueryBuilder::new(
            "SELECT s.id, s.product_id, s.quantity_sold, s.sale_price_per_unit, \
             s.total_revenue, s.sale_date FROM sales s",
        );

        if filter.category.is_some() {
            builder.push(" INNER JOIN products p ON p.id = s.product_id");
        }

        builder.push(" WHERE 1 = 1");
        if let Some(category) = &filter.category {
            builder.push(" AND LOWER(p.category) = LOWER(");
            builder.push_bind(category);
            builder.push(")");
        }
        if let Some(product_id) = &filter.product_id {
            builder.push(" AND s.product_id = ");
            builder.push_bind(product_id);
        }
        if let Some(start) = filter.start_date {
            builder.push(" AND s.sale_date >= ");
            builder.push_bind(start);
        }
        if let Some(end) = filter.end_date {
            builder.push(" AND s.sale_date <= ");
            builder.push_bind(end);
        }

        builder.push(" ORDER BY s.sale_date DESC LIMIT ");
        builder.push_bind(limit);
        builder.push(" OFFSET ");
        builder.push_bind(skip);

        let sales = builder
            .build_query_as::<Sale>()
            .fetch_all(&self.pool)
            .await?;

        Ok(sales)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
