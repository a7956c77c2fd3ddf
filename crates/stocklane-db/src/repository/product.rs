//! # Product Repository
//!
//! Database operations for products.
//!
//! ## Quantity Writes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   Quantity Update Strategy                              │
//! │                                                                         │
//! │  ❌ WRONG: blind absolute update (lost-update under concurrency)       │
//! │     UPDATE products SET quantity = 7 WHERE id = ?                      │
//! │                                                                         │
//! │  ✅ CORRECT: compare-and-swap on the value that was read               │
//! │     UPDATE products SET quantity = ?new                                │
//! │     WHERE id = ? AND quantity = ?expected                              │
//! │                                                                         │
//! │  Two operations racing on the same product: the second one's           │
//! │  expected value no longer matches, zero rows update, and the engine    │
//! │  reports Conflict instead of silently dropping a movement.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Quantity writes only happen inside engine transactions, together with
//! the ledger row (or sale) that explains them.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use stocklane_core::Product;

/// Read-only inventory rollup over a user's products.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, sqlx::FromRow)]
pub struct InventorySummaryRow {
    pub total_products: i64,
    pub total_units: i64,
    /// Σ quantity × price_cents
    pub stock_value_cents: i64,
    /// quantity > 0 but at/below low_stock_at
    pub low_stock_count: i64,
    pub out_of_stock_count: i64,
}

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Inserts a new product.
    pub async fn insert(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, name = %product.name, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, user_id, name, manufacturer, model, sku,
                quantity, low_stock_at, price_cents,
                category, supplier, specs, compatibility, notes, image_url,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)
            "#,
        )
        .bind(&product.id)
        .bind(&product.user_id)
        .bind(&product.name)
        .bind(&product.manufacturer)
        .bind(&product.model)
        .bind(&product.sku)
        .bind(product.quantity)
        .bind(product.low_stock_at)
        .bind(product.price_cents)
        .bind(&product.category)
        .bind(&product.supplier)
        .bind(&product.specs)
        .bind(&product.compatibility)
        .bind(&product.notes)
        .bind(&product.image_url)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a product by id, scoped to its owner.
    pub async fn find_by_id(&self, user_id: &str, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            "SELECT * FROM products WHERE id = ?1 AND user_id = ?2",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Same lookup on an explicit connection, for use inside an engine
    /// transaction (the read that a compare-and-swap later checks against
    /// must happen on the transaction's connection).
    pub async fn find_by_id_tx(
        &self,
        conn: &mut SqliteConnection,
        user_id: &str,
        id: &str,
    ) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            "SELECT * FROM products WHERE id = ?1 AND user_id = ?2",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(conn)
        .await?;

        Ok(product)
    }

    /// Lists a user's products sorted by name.
    pub async fn list_by_user(&self, user_id: &str) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            "SELECT * FROM products WHERE user_id = ?1 ORDER BY name",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Updates a product's catalog attributes.
    ///
    /// Deliberately does NOT touch `quantity`: quantity changes go through
    /// [`Self::compare_and_swap_quantity`] inside a ledger transaction.
    pub async fn update(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, "Updating product");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = ?3,
                manufacturer = ?4,
                model = ?5,
                sku = ?6,
                low_stock_at = ?7,
                price_cents = ?8,
                category = ?9,
                supplier = ?10,
                specs = ?11,
                compatibility = ?12,
                notes = ?13,
                image_url = ?14,
                updated_at = ?15
            WHERE id = ?1 AND user_id = ?2
            "#,
        )
        .bind(&product.id)
        .bind(&product.user_id)
        .bind(&product.name)
        .bind(&product.manufacturer)
        .bind(&product.model)
        .bind(&product.sku)
        .bind(product.low_stock_at)
        .bind(product.price_cents)
        .bind(&product.category)
        .bind(&product.supplier)
        .bind(&product.specs)
        .bind(&product.compatibility)
        .bind(&product.notes)
        .bind(&product.image_url)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", &product.id));
        }

        Ok(())
    }

    /// Compare-and-swap quantity update on a transaction connection.
    ///
    /// Returns `true` when the swap applied, `false` when `expected` no
    /// longer matched (a concurrent writer got there first). The caller
    /// decides whether to retry or surface a conflict; either way the
    /// surrounding transaction must not commit a half-applied operation.
    pub async fn compare_and_swap_quantity(
        &self,
        conn: &mut SqliteConnection,
        user_id: &str,
        id: &str,
        expected: i64,
        new: i64,
    ) -> DbResult<bool> {
        debug!(id = %id, expected = %expected, new = %new, "CAS quantity update");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products
            SET quantity = ?4, updated_at = ?5
            WHERE id = ?1 AND user_id = ?2 AND quantity = ?3
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(expected)
        .bind(new)
        .bind(now)
        .execute(conn)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Deletes a product.
    pub async fn delete(&self, user_id: &str, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM products WHERE id = ?1 AND user_id = ?2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Counts a user's products.
    pub async fn count_by_user(&self, user_id: &str) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE user_id = ?1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Inventory rollup for the analytics dashboard.
    pub async fn inventory_summary(&self, user_id: &str) -> DbResult<InventorySummaryRow> {
        let summary = sqlx::query_as::<_, InventorySummaryRow>(
            r#"
            SELECT
                COUNT(*)                                   AS total_products,
                COALESCE(SUM(quantity), 0)                 AS total_units,
                COALESCE(SUM(quantity * price_cents), 0)   AS stock_value_cents,
                COALESCE(SUM(CASE
                    WHEN quantity > 0
                     AND low_stock_at IS NOT NULL
                     AND quantity <= low_stock_at
                    THEN 1 ELSE 0 END), 0)                 AS low_stock_count,
                COALESCE(SUM(CASE WHEN quantity = 0 THEN 1 ELSE 0 END), 0)
                                                           AS out_of_stock_count
            FROM products
            WHERE user_id = ?1
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(summary)
    }
}

/// Helper to generate a new product ID.
pub fn generate_product_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================
