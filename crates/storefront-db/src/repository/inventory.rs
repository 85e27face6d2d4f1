//! # Inventory Repository
//!
//! Stock reads and partial updates.
//!
//! Inventory rows are never created or deleted here: creation happens
//! with the product (one transaction), deletion happens via the product
//! cascade. Sale recording decrements quantity through its own
//! transaction in the sale repository.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::StoreResult;
use storefront_core::{validation, CoreError, Inventory, InventoryPatch};

/// Repository for inventory operations.
#[derive(Debug, Clone)]
pub struct InventoryRepository {
    pool: SqlitePool,
}

impl InventoryRepository {
    /// Creates a new InventoryRepository.
    pub fn new(pool: SqlitePool) -> Self {
        InventoryRepository { pool }
    }

    /// Gets the inventory record for a product.
    ///
    /// ## Returns
    /// * `Ok(Some(..))` - Record found
    /// * `Ok(None)` - No inventory row for this product id
    pub async fn get(&self, product_id: &str) -> StoreResult<Option<Inventory>> {
        let inventory = sqlx::query_as::<_, Inventory>(
            r#"
            SELECT id, product_id, quantity, low_stock_threshold, last_updated
            FROM inventory
            WHERE product_id = ?1
            "#,
        )
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(inventory)
    }

    /// Lists inventory records with pagination.
    ///
    /// With `low_stock_only`, restricts to the low-stock view:
    /// `quantity <= low_stock_threshold`.
    pub async fn list(
        &self,
        skip: i64,
        limit: i64,
        low_stock_only: bool,
    ) -> StoreResult<Vec<Inventory>> {
        debug!(skip, limit, low_stock_only, "Listing inventory");

        let sql = if low_stock_only {
            r#"
            SELECT id, product_id, quantity, low_stock_threshold, last_updated
            FROM inventory
            WHERE quantity <= low_stock_threshold
            ORDER BY product_id
            LIMIT ?1 OFFSET ?2
            "#
        } else {
            r#"
            SELECT id, product_id, quantity, low_stock_threshold, last_updated
            FROM inventory
            ORDER BY product_id
            LIMIT ?1 OFFSET ?2
            "#
        };

        let records = sqlx::query_as::<_, Inventory>(sql)
            .bind(limit)
            .bind(skip)
            .fetch_all(&self.pool)
            .await?;

        Ok(records)
    }

    /// Applies a partial update to a product's inventory.
    ///
    /// Quantity and threshold are independently optional. A patch with
    /// neither field is a no-op that still succeeds idempotently -
    /// callers wanting to reject empty updates enforce that at the
    /// boundary.
    ///
    /// ## Errors
    /// - `Validation` - negative quantity or threshold
    /// - `NotFound` - no inventory row for this product id. For a product
    ///   created through the catalog this signals a data-consistency
    ///   fault, but it is handled all the same.
    pub async fn update(
        &self,
        product_id: &str,
        patch: InventoryPatch,
    ) -> StoreResult<Inventory> {
        validation::validate_inventory_patch(&patch)?;

        debug!(product_id = %product_id, patch = ?patch, "Updating inventory");

        let current = self.get(product_id).await?.ok_or_else(|| CoreError::NotFound {
            entity: "Inventory".to_string(),
            id: product_id.to_string(),
        })?;

        if patch.is_empty() {
            return Ok(current);
        }

        let quantity = patch.quantity.unwrap_or(current.quantity);
        let threshold = patch.low_stock_threshold.unwrap_or(current.low_stock_threshold);
        let now = Utc::now();

        sqlx::query(
            r#"
            UPDATE inventory
            SET quantity = ?2, low_stock_threshold = ?3, last_updated = ?4
            WHERE product_id = ?1
            "#,
        )
        .bind(product_id)
        .bind(quantity)
        .bind(threshold)
        .bind(now)
        .execute(&self.pool)
        .await?;

        info!(product_id = %product_id, quantity, threshold, "Inventory updated");

        Ok(Inventory {
            quantity,
            low_stock_threshold: threshold,
            last_updated: now,
            ..current
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::repository::testutil::{product_input, test_db};

    #[tokio::test]
    async fn test_get_and_update() {
        let db = test_db().await;
        let created = db
            .products()
            .create(product_input("Widget", 10.0, 5))
            .await
            .unwrap();
        let product_id = created.product.id;

        let inventory = db.inventory().get(&product_id).await.unwrap().unwrap();
        assert_eq!(inventory.quantity, 5);

        let patch = InventoryPatch {
            quantity: Some(20),
            low_stock_threshold: None,
        };
        let updated = db.inventory().update(&product_id, patch).await.unwrap();
        assert_eq!(updated.quantity, 20);
        // Untouched field keeps its value
        assert_eq!(updated.low_stock_threshold, inventory.low_stock_threshold);
    }

    #[tokio::test]
    async fn test_empty_patch_is_idempotent_success() {
        let db = test_db().await;
        let created = db
            .products()
            .create(product_input("Widget", 10.0, 5))
            .await
            .unwrap();
        let product_id = created.product.id;

        let before = db.inventory().get(&product_id).await.unwrap().unwrap();
        let after = db
            .inventory()
            .update(&product_id, InventoryPatch::default())
            .await
            .unwrap();

        assert_eq!(after.quantity, before.quantity);
        assert_eq!(after.last_updated, before.last_updated);
    }

    #[tokio::test]
    async fn test_update_missing_inventory() {
        let db = test_db().await;

        let err = db
            .inventory()
            .update("no-such-product", InventoryPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::Domain(CoreError::NotFound { ref entity, .. }) if entity == "Inventory"
        ));
    }

    #[tokio::test]
    async fn test_update_rejects_negative_values() {
        let db = test_db().await;
        let created = db
            .products()
            .create(product_input("Widget", 10.0, 5))
            .await
            .unwrap();

        let patch = InventoryPatch {
            quantity: Some(-1),
            low_stock_threshold: None,
        };
        let err = db
            .inventory()
            .update(&created.product.id, patch)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Domain(CoreError::Validation(_))));
    }

    #[tokio::test]
    async fn test_low_stock_view() {
        let db = test_db().await;
        let repo = db.products();

        // quantity 5 vs default threshold 10: low
        repo.create(product_input("Low", 1.0, 5)).await.unwrap();
        // quantity 50: healthy
        repo.create(product_input("High", 1.0, 50)).await.unwrap();
        // quantity exactly at threshold: counts as low (<=)
        let mut at_threshold = product_input("Edge", 1.0, 10);
        at_threshold.low_stock_threshold = Some(10);
        repo.create(at_threshold).await.unwrap();

        let all = db.inventory().list(0, 100, false).await.unwrap();
        assert_eq!(all.len(), 3);

        let low = db.inventory().list(0, 100, true).await.unwrap();
        assert_eq!(low.len(), 2);
        assert!(low.iter().all(Inventory::is_low_stock));
    }
}
