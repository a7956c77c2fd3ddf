//! # Supplier Repository
//!
//! Database operations for suppliers and product-supplier links.
//!
//! ## Primary Supplier Flip
//! At most one link per product may carry `is_primary = 1`. The flip is a
//! single UPDATE over all of the product's links followed by the new
//! insert, both on the same transaction connection, so no interleaving can
//! observe two primaries.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use stocklane_core::{ProductSupplier, Supplier};

/// Repository for supplier database operations.
#[derive(Debug, Clone)]
pub struct SupplierRepository {
    pool: SqlitePool,
}

impl SupplierRepository {
    /// Creates a new SupplierRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SupplierRepository { pool }
    }

    // =========================================================================
    // Suppliers
    // =========================================================================

    /// Inserts a supplier.
    pub async fn insert(&self, supplier: &Supplier) -> DbResult<()> {
        debug!(id = %supplier.id, name = %supplier.name, "Inserting supplier");

        sqlx::query(
            r#"
            INSERT INTO suppliers (
                id, user_id, name, contact_name, email, phone, address,
                notes, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&supplier.id)
        .bind(&supplier.user_id)
        .bind(&supplier.name)
        .bind(&supplier.contact_name)
        .bind(&supplier.email)
        .bind(&supplier.phone)
        .bind(&supplier.address)
        .bind(&supplier.notes)
        .bind(supplier.created_at)
        .bind(supplier.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a supplier by id, scoped to its owner.
    pub async fn find_by_id(&self, user_id: &str, id: &str) -> DbResult<Option<Supplier>> {
        let supplier =
            sqlx::query_as::<_, Supplier>("SELECT * FROM suppliers WHERE id = ?1 AND user_id = ?2")
                .bind(id)
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(supplier)
    }

    /// Lists a user's suppliers, alphabetically.
    pub async fn list_by_user(&self, user_id: &str) -> DbResult<Vec<Supplier>> {
        let suppliers = sqlx::query_as::<_, Supplier>(
            "SELECT * FROM suppliers WHERE user_id = ?1 ORDER BY name COLLATE NOCASE ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(suppliers)
    }

    /// Updates a supplier's contact fields.
    pub async fn update(&self, supplier: &Supplier) -> DbResult<()> {
        debug!(id = %supplier.id, "Updating supplier");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE suppliers SET
                name = ?3, contact_name = ?4, email = ?5, phone = ?6,
                address = ?7, notes = ?8, updated_at = ?9
            WHERE id = ?1 AND user_id = ?2
            "#,
        )
        .bind(&supplier.id)
        .bind(&supplier.user_id)
        .bind(&supplier.name)
        .bind(&supplier.contact_name)
        .bind(&supplier.email)
        .bind(&supplier.phone)
        .bind(&supplier.address)
        .bind(&supplier.notes)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Supplier", &supplier.id));
        }

        Ok(())
    }

    /// Deletes a supplier. Links to it are removed by ON DELETE CASCADE.
    pub async fn delete(&self, user_id: &str, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM suppliers WHERE id = ?1 AND user_id = ?2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Supplier", id));
        }

        Ok(())
    }

    // =========================================================================
    // Product-Supplier Links
    // =========================================================================

    /// Inserts a product-supplier link on a transaction connection.
    ///
    /// The UNIQUE(product_id, supplier_id) constraint surfaces duplicate
    /// links as [`DbError::UniqueViolation`].
    pub async fn insert_link_tx(
        &self,
        conn: &mut SqliteConnection,
        link: &ProductSupplier,
    ) -> DbResult<()> {
        debug!(
            product_id = %link.product_id,
            supplier_id = %link.supplier_id,
            is_primary = link.is_primary,
            "Inserting product-supplier link"
        );

        sqlx::query(
            r#"
            INSERT INTO product_suppliers (
                id, user_id, product_id, supplier_id,
                supplier_sku, cost_price_cents, lead_time_days,
                min_order_qty, is_primary, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&link.id)
        .bind(&link.user_id)
        .bind(&link.product_id)
        .bind(&link.supplier_id)
        .bind(&link.supplier_sku)
        .bind(link.cost_price_cents)
        .bind(link.lead_time_days)
        .bind(link.min_order_qty)
        .bind(link.is_primary)
        .bind(link.created_at)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Clears the primary flag on all of a product's links in one statement.
    pub async fn clear_primary_tx(
        &self,
        conn: &mut SqliteConnection,
        user_id: &str,
        product_id: &str,
    ) -> DbResult<()> {
        sqlx::query(
            "UPDATE product_suppliers SET is_primary = 0 WHERE product_id = ?1 AND user_id = ?2",
        )
        .bind(product_id)
        .bind(user_id)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Lists a product's supplier links, primary first.
    pub async fn find_links_by_product(
        &self,
        user_id: &str,
        product_id: &str,
    ) -> DbResult<Vec<ProductSupplier>> {
        let links = sqlx::query_as::<_, ProductSupplier>(
            r#"
            SELECT * FROM product_suppliers
            WHERE user_id = ?1 AND product_id = ?2
            ORDER BY is_primary DESC, created_at ASC
            "#,
        )
        .bind(user_id)
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(links)
    }

    /// Removes one product-supplier link.
    pub async fn delete_link(
        &self,
        user_id: &str,
        product_id: &str,
        supplier_id: &str,
    ) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            DELETE FROM product_suppliers
            WHERE user_id = ?1 AND product_id = ?2 AND supplier_id = ?3
            "#,
        )
        .bind(user_id)
        .bind(product_id)
        .bind(supplier_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found(
                "ProductSupplier",
                format!("{product_id}/{supplier_id}"),
            ));
        }

        Ok(())
    }
}

/// Helper to generate a new supplier ID.
pub fn generate_supplier_id() -> String {
    Uuid::new_v4().to_string()
}

/// Helper to generate a new product-supplier link ID.
pub fn generate_link_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================
