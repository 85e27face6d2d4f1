//! # Product Repository
//!
//! Catalog operations for products.
//!
//! ## Key Operations
//! - Creation (pairs the inventory row in one transaction)
//! - Reads by id / by name (case-insensitive) / paginated list
//! - Presence-tagged partial update with uniqueness re-validation
//! - Deletion (cascades to inventory and sale history)
//!
//! ## Name Uniqueness
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                  Case-Insensitive Uniqueness                            │
//! │                                                                         │
//! │  create("widget")                                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Domain check: SELECT ... WHERE LOWER(name) = LOWER('widget')           │
//! │       │                                                                 │
//! │       ├── hit  → DuplicateName (primary enforcement)                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  INSERT ... (COLLATE NOCASE UNIQUE is the defensive fallback;          │
//! │              a violation maps back to the same DuplicateName)          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, StoreError, StoreResult};
use storefront_core::{
    validation, CoreError, Inventory, NewProduct, Product, ProductPatch, ProductWithInventory,
};

/// Columns for a product joined with its (possibly missing) inventory row.
const PRODUCT_WITH_INVENTORY: &str = r#"
SELECT
    p.id, p.name, p.description, p.category, p.price, p.created_at, p.updated_at,
    i.id AS inv_id,
    i.product_id AS inv_product_id,
    i.quantity AS inv_quantity,
    i.low_stock_threshold AS inv_low_stock_threshold,
    i.last_updated AS inv_last_updated
FROM products p
LEFT JOIN inventory i ON i.product_id = p.id
"#;

/// Repository for product catalog operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
///
/// let created = repo.create(new_product).await?;
/// let found = repo.get_by_name("widget").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Creates a product together with its inventory record.
    ///
    /// ## Atomicity
    /// The product row and its paired inventory row are written in ONE
    /// transaction: if either insert fails, neither is committed. Every
    /// product that exists has exactly one inventory row.
    ///
    /// ## Errors
    /// - `Validation` - name empty/too long, price not positive,
    ///   negative quantities
    /// - `DuplicateName` - a case-insensitive name match already exists
    pub async fn create(&self, input: NewProduct) -> StoreResult<ProductWithInventory> {
        validation::validate_new_product(&input)?;

        debug!(name = %input.name, "Creating product");

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        // Domain-level uniqueness check, inside the same transaction as
        // the insert so no concurrent create can slip between them
        let existing: Option<String> =
            sqlx::query_scalar("SELECT id FROM products WHERE LOWER(name) = LOWER(?1)")
                .bind(&input.name)
                .fetch_optional(&mut *tx)
                .await?;
        if existing.is_some() {
            return Err(CoreError::DuplicateName(input.name).into());
        }

        let product = Product {
            id: Uuid::new_v4().to_string(),
            name: input.name.clone(),
            description: input.description.clone(),
            category: input.category.clone(),
            price: input.price,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO products (id, name, description, category, price, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(&product.category)
        .bind(product.price)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_duplicate_name(e, &product.name))?;

        let inventory = Inventory {
            id: Uuid::new_v4().to_string(),
            product_id: product.id.clone(),
            quantity: input.initial_quantity,
            low_stock_threshold: input.threshold_or_default(),
            last_updated: now,
        };

        sqlx::query(
            r#"
            INSERT INTO inventory (id, product_id, quantity, low_stock_threshold, last_updated)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&inventory.id)
        .bind(&inventory.product_id)
        .bind(inventory.quantity)
        .bind(inventory.low_stock_threshold)
        .bind(inventory.last_updated)
        .execute(&mut *tx)
        .await?;

        tx.commit().await.map_err(DbError::commit_failed)?;

        info!(id = %product.id, name = %product.name, "Product created");

        Ok(ProductWithInventory {
            product,
            inventory: Some(inventory),
        })
    }

    /// Gets a product by its ID, inventory attached.
    ///
    /// ## Returns
    /// * `Ok(Some(..))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: &str) -> StoreResult<Option<ProductWithInventory>> {
        let sql = format!("{PRODUCT_WITH_INVENTORY} WHERE p.id = ?1");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| join_row(&r)).transpose().map_err(Into::into)
    }

    /// Gets a product by name, compared case-insensitively.
    pub async fn get_by_name(&self, name: &str) -> StoreResult<Option<ProductWithInventory>> {
        let sql = format!("{PRODUCT_WITH_INVENTORY} WHERE LOWER(p.name) = LOWER(?1)");
        let row = sqlx::query(&sql)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| join_row(&r)).transpose().map_err(Into::into)
    }

    /// Lists products with pagination and an optional case-insensitive
    /// category filter.
    ///
    /// Ordered by creation time (then id) so pagination is stable.
    pub async fn list(
        &self,
        skip: i64,
        limit: i64,
        category: Option<&str>,
    ) -> StoreResult<Vec<ProductWithInventory>> {
        debug!(skip, limit, category = ?category, "Listing products");

        let rows = match category {
            Some(category) => {
                let sql = format!(
                    "{PRODUCT_WITH_INVENTORY} \
                     WHERE LOWER(p.category) = LOWER(?1) \
                     ORDER BY p.created_at, p.id LIMIT ?2 OFFSET ?3"
                );
                sqlx::query(&sql)
                    .bind(category)
                    .bind(limit)
                    .bind(skip)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let sql = format!(
                    "{PRODUCT_WITH_INVENTORY} ORDER BY p.created_at, p.id LIMIT ?1 OFFSET ?2"
                );
                sqlx::query(&sql)
                    .bind(limit)
                    .bind(skip)
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        rows.iter()
            .map(|r| join_row(r).map_err(Into::into))
            .collect()
    }

    /// Applies a partial update to a product.
    ///
    /// Only fields present in the patch change; for nullable fields a
    /// present `null` clears the value (see [`ProductPatch`]). An empty
    /// patch succeeds without touching the row's content.
    ///
    /// ## Errors
    /// - `ProductNotFound` - id does not exist
    /// - `DuplicateName` - new name collides (case-insensitively) with
    ///   another product
    ///
    /// Inventory is never touched here; use the inventory operations.
    pub async fn update(&self, id: &str, patch: ProductPatch) -> StoreResult<ProductWithInventory> {
        validation::validate_product_patch(&patch)?;

        debug!(id = %id, "Updating product");

        let current = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| CoreError::ProductNotFound(id.to_string()))?;

        if patch.is_empty() {
            return Ok(current);
        }

        let mut product = current.product;

        // Renaming re-validates uniqueness against all OTHER products;
        // a pure case change of the same name is not a collision
        if let Some(name) = &patch.name {
            if !name.eq_ignore_ascii_case(&product.name) {
                if let Some(other) = self.get_by_name(name).await? {
                    if other.product.id != id {
                        return Err(CoreError::DuplicateName(name.clone()).into());
                    }
                }
            }
        }

        if let Some(name) = patch.name {
            product.name = name;
        }
        if let Some(description) = patch.description {
            product.description = description;
        }
        if let Some(category) = patch.category {
            product.category = category;
        }
        if let Some(price) = patch.price {
            product.price = price;
        }
        product.updated_at = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products
            SET name = ?2, description = ?3, category = ?4, price = ?5, updated_at = ?6
            WHERE id = ?1
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(&product.category)
        .bind(product.price)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_duplicate_name(e, &product.name))?;

        if result.rows_affected() == 0 {
            return Err(CoreError::ProductNotFound(id.to_string()).into());
        }

        info!(id = %product.id, "Product updated");

        Ok(ProductWithInventory {
            product,
            inventory: current.inventory,
        })
    }

    /// Deletes a product.
    ///
    /// ## Cascade
    /// The paired inventory row and the entire sale history go with it
    /// (`ON DELETE CASCADE`). Destructive and irreversible; callers must
    /// warn at the boundary layer.
    ///
    /// ## Errors
    /// - `ProductNotFound` - id does not exist
    pub async fn delete(&self, id: &str) -> StoreResult<()> {
        debug!(id = %id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::ProductNotFound(id.to_string()).into());
        }

        info!(id = %id, "Product deleted (inventory and sales cascaded)");
        Ok(())
    }

    /// Counts products (for diagnostics).
    pub async fn count(&self) -> StoreResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Maps a unique-constraint violation on products.name to DuplicateName.
///
/// The domain-level check is the primary enforcement; this catches the
/// storage constraint firing on a race the check could not see.
fn map_duplicate_name(err: sqlx::Error, name: &str) -> StoreError {
    match DbError::from(err) {
        DbError::UniqueViolation { field, .. } if field.contains("products.name") => {
            StoreError::Domain(CoreError::DuplicateName(name.to_string()))
        }
        other => StoreError::Db(other),
    }
}

/// Maps one joined row to a product with its optional inventory.
fn join_row(row: &SqliteRow) -> Result<ProductWithInventory, sqlx::Error> {
    let product = Product {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        category: row.try_get("category")?,
        price: row.try_get("price")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    };

    // LEFT JOIN: inventory columns are all NULL when the row is missing
    let inventory = match row.try_get::<Option<String>, _>("inv_id")? {
        Some(inv_id) => Some(Inventory {
            id: inv_id,
            product_id: row.try_get("inv_product_id")?,
            quantity: row.try_get("inv_quantity")?,
            low_stock_threshold: row.try_get("inv_low_stock_threshold")?,
            last_updated: row.try_get("inv_last_updated")?,
        }),
        None => None,
    };

    Ok(ProductWithInventory { product, inventory })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::testutil::{product_input, test_db};
    use storefront_core::DEFAULT_LOW_STOCK_THRESHOLD;

    #[tokio::test]
    async fn test_create_pairs_inventory() {
        let db = test_db().await;

        let created = db
            .products()
            .create(product_input("Widget", 10.0, 5))
            .await
            .unwrap();

        let inventory = created.inventory.expect("inventory attached");
        assert_eq!(inventory.product_id, created.product.id);
        assert_eq!(inventory.quantity, 5);
        assert_eq!(inventory.low_stock_threshold, DEFAULT_LOW_STOCK_THRESHOLD);
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_name_case_insensitively() {
        let db = test_db().await;
        let repo = db.products();

        repo.create(product_input("Widget", 10.0, 5)).await.unwrap();

        let err = repo
            .create(product_input("wIdGeT", 12.0, 3))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::Domain(CoreError::DuplicateName(ref n)) if n == "wIdGeT"
        ));
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_fields() {
        let db = test_db().await;
        let repo = db.products();

        let err = repo.create(product_input("Widget", 0.0, 5)).await.unwrap_err();
        assert!(matches!(err, StoreError::Domain(CoreError::Validation(_))));

        let err = repo.create(product_input("", 10.0, 5)).await.unwrap_err();
        assert!(matches!(err, StoreError::Domain(CoreError::Validation(_))));

        let err = repo.create(product_input("Widget", 10.0, -1)).await.unwrap_err();
        assert!(matches!(err, StoreError::Domain(CoreError::Validation(_))));

        // Nothing was committed
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_get_by_name_is_case_insensitive() {
        let db = test_db().await;
        let repo = db.products();

        let created = repo.create(product_input("Widget", 10.0, 5)).await.unwrap();

        let found = repo.get_by_name("WIDGET").await.unwrap().unwrap();
        assert_eq!(found.product.id, created.product.id);

        assert!(repo.get_by_name("Gadget").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_filters_by_category_and_paginates() {
        let db = test_db().await;
        let repo = db.products();

        for (name, category) in [
            ("Widget A", Some("Tools")),
            ("Widget B", Some("tools")),
            ("Gizmo", Some("Toys")),
            ("Orphan", None),
        ] {
            let mut input = product_input(name, 5.0, 1);
            input.category = category.map(str::to_string);
            repo.create(input).await.unwrap();
        }

        let all = repo.list(0, 100, None).await.unwrap();
        assert_eq!(all.len(), 4);

        // Case-insensitive category filter
        let tools = repo.list(0, 100, Some("TOOLS")).await.unwrap();
        assert_eq!(tools.len(), 2);

        // Pagination is stable: two pages of one cover both tools
        let page1 = repo.list(0, 1, Some("tools")).await.unwrap();
        let page2 = repo.list(1, 1, Some("tools")).await.unwrap();
        assert_eq!(page1.len(), 1);
        assert_eq!(page2.len(), 1);
        assert_ne!(page1[0].product.id, page2[0].product.id);
    }

    #[tokio::test]
    async fn test_update_applies_only_present_fields() {
        let db = test_db().await;
        let repo = db.products();

        let mut input = product_input("Widget", 10.0, 5);
        input.description = Some("a widget".to_string());
        input.category = Some("Tools".to_string());
        let created = repo.create(input).await.unwrap();

        let patch = ProductPatch {
            price: Some(12.0),
            category: Some(None), // explicit clear
            ..ProductPatch::default()
        };
        let updated = repo.update(&created.product.id, patch).await.unwrap();

        assert_eq!(updated.product.price, 12.0);
        assert_eq!(updated.product.name, "Widget");
        assert_eq!(updated.product.description.as_deref(), Some("a widget"));
        assert_eq!(updated.product.category, None);
    }

    #[tokio::test]
    async fn test_update_empty_patch_is_noop_success() {
        let db = test_db().await;
        let repo = db.products();

        let created = repo.create(product_input("Widget", 10.0, 5)).await.unwrap();
        let updated = repo
            .update(&created.product.id, ProductPatch::default())
            .await
            .unwrap();

        assert_eq!(updated.product.name, "Widget");
        assert_eq!(updated.product.price, 10.0);
    }

    #[tokio::test]
    async fn test_update_rejects_duplicate_rename() {
        let db = test_db().await;
        let repo = db.products();

        repo.create(product_input("Widget", 10.0, 5)).await.unwrap();
        let other = repo.create(product_input("Gadget", 8.0, 2)).await.unwrap();

        let patch = ProductPatch {
            name: Some("WIDGET".to_string()),
            ..ProductPatch::default()
        };
        let err = repo.update(&other.product.id, patch).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::Domain(CoreError::DuplicateName(_))
        ));

        // Renaming a product to its own name with different casing is fine
        let patch = ProductPatch {
            name: Some("gadget".to_string()),
            ..ProductPatch::default()
        };
        let renamed = repo.update(&other.product.id, patch).await.unwrap();
        assert_eq!(renamed.product.name, "gadget");
    }

    #[tokio::test]
    async fn test_update_missing_product() {
        let db = test_db().await;

        let err = db
            .products()
            .update("no-such-id", ProductPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::Domain(CoreError::ProductNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_cascades_to_inventory() {
        let db = test_db().await;
        let repo = db.products();

        let created = repo.create(product_input("Widget", 10.0, 5)).await.unwrap();
        let id = created.product.id.clone();

        repo.delete(&id).await.unwrap();

        assert!(repo.get_by_id(&id).await.unwrap().is_none());
        assert!(db.inventory().get(&id).await.unwrap().is_none());

        let err = repo.delete(&id).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::Domain(CoreError::ProductNotFound(_))
        ));
    }
}
