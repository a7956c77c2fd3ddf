//! # Stock Movement Repository
//!
//! Database operations for the append-only stock movement ledger.
//!
//! ## Append-Only Contract
//! Ledger rows are inserted inside the same transaction as the quantity
//! write they describe and never updated afterwards. The only mutation is
//! an explicit administrative delete.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use stocklane_core::{MovementType, StockMovement};

/// Per-type rollup over a date range.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, sqlx::FromRow)]
pub struct MovementTotalRow {
    pub movement_type: MovementType,
    pub total_quantity: i64,
    pub movement_count: i64,
}

/// Per-product movement volume (for "most moved products").
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, sqlx::FromRow)]
pub struct ProductVolumeRow {
    pub product_id: String,
    pub product_name: String,
    pub total_quantity: i64,
    pub movement_count: i64,
}

/// Repository for stock movement database operations.
#[derive(Debug, Clone)]
pub struct StockMovementRepository {
    pool: SqlitePool,
}

impl StockMovementRepository {
    /// Creates a new StockMovementRepository.
    pub fn new(pool: SqlitePool) -> Self {
        StockMovementRepository { pool }
    }

    /// Inserts a ledger row on a transaction connection.
    ///
    /// Always called inside the transaction that also writes the product
    /// quantity; a movement row must never exist without its quantity
    /// write and vice versa.
    pub async fn insert_tx(
        &self,
        conn: &mut SqliteConnection,
        movement: &StockMovement,
    ) -> DbResult<()> {
        debug!(
            id = %movement.id,
            product_id = %movement.product_id,
            movement_type = %movement.movement_type,
            "Inserting stock movement"
        );

        sqlx::query(
            r#"
            INSERT INTO stock_movements (
                id, user_id, product_id, supplier_id, batch_id,
                movement_type, quantity, previous_qty, new_qty,
                unit_cost_cents, total_cost_cents,
                reference, reason, notes, performed_by, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)
            "#,
        )
        .bind(&movement.id)
        .bind(&movement.user_id)
        .bind(&movement.product_id)
        .bind(&movement.supplier_id)
        .bind(&movement.batch_id)
        .bind(movement.movement_type)
        .bind(movement.quantity)
        .bind(movement.previous_qty)
        .bind(movement.new_qty)
        .bind(movement.unit_cost_cents)
        .bind(movement.total_cost_cents)
        .bind(&movement.reference)
        .bind(&movement.reason)
        .bind(&movement.notes)
        .bind(&movement.performed_by)
        .bind(movement.created_at)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Gets a movement by id, scoped to its owner.
    pub async fn find_by_id(&self, user_id: &str, id: &str) -> DbResult<Option<StockMovement>> {
        let movement = sqlx::query_as::<_, StockMovement>(
            "SELECT * FROM stock_movements WHERE id = ?1 AND user_id = ?2",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(movement)
    }

    /// Lists a user's movements, most recent first.
    pub async fn list_by_user(&self, user_id: &str, limit: u32) -> DbResult<Vec<StockMovement>> {
        let movements = sqlx::query_as::<_, StockMovement>(
            r#"
            SELECT * FROM stock_movements
            WHERE user_id = ?1
            ORDER BY created_at DESC
            LIMIT ?2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(movements)
    }

    /// Lists movements for one product, most recent first.
    pub async fn list_by_product(
        &self,
        user_id: &str,
        product_id: &str,
    ) -> DbResult<Vec<StockMovement>> {
        let movements = sqlx::query_as::<_, StockMovement>(
            r#"
            SELECT * FROM stock_movements
            WHERE user_id = ?1 AND product_id = ?2
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(movements)
    }

    /// Lists movements of one type, most recent first.
    pub async fn list_by_type(
        &self,
        user_id: &str,
        movement_type: MovementType,
    ) -> DbResult<Vec<StockMovement>> {
        let movements = sqlx::query_as::<_, StockMovement>(
            r#"
            SELECT * FROM stock_movements
            WHERE user_id = ?1 AND movement_type = ?2
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .bind(movement_type)
        .fetch_all(&self.pool)
        .await?;

        Ok(movements)
    }

    /// Lists movements in a date range (inclusive bounds), oldest first.
    pub async fn list_by_date_range(
        &self,
        user_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DbResult<Vec<StockMovement>> {
        let movements = sqlx::query_as::<_, StockMovement>(
            r#"
            SELECT * FROM stock_movements
            WHERE user_id = ?1 AND created_at >= ?2 AND created_at <= ?3
            ORDER BY created_at
            "#,
        )
        .bind(user_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(movements)
    }

    /// Per-type quantity totals over a date range.
    pub async fn totals_by_type(
        &self,
        user_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DbResult<Vec<MovementTotalRow>> {
        let totals = sqlx::query_as::<_, MovementTotalRow>(
            r#"
            SELECT
                movement_type,
                COALESCE(SUM(quantity), 0) AS total_quantity,
                COUNT(*) AS movement_count
            FROM stock_movements
            WHERE user_id = ?1 AND created_at >= ?2 AND created_at <= ?3
            GROUP BY movement_type
            ORDER BY movement_type
            "#,
        )
        .bind(user_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(totals)
    }

    /// Products with the highest movement volume.
    pub async fn top_products_by_volume(
        &self,
        user_id: &str,
        limit: u32,
    ) -> DbResult<Vec<ProductVolumeRow>> {
        let rows = sqlx::query_as::<_, ProductVolumeRow>(
            r#"
            SELECT
                m.product_id,
                p.name AS product_name,
                COALESCE(SUM(m.quantity), 0) AS total_quantity,
                COUNT(*) AS movement_count
            FROM stock_movements m
            INNER JOIN products p ON p.id = m.product_id
            WHERE m.user_id = ?1
            GROUP BY m.product_id, p.name
            ORDER BY total_quantity DESC
            LIMIT ?2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Explicit administrative delete of a ledger row.
    pub async fn delete(&self, user_id: &str, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM stock_movements WHERE id = ?1 AND user_id = ?2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("StockMovement", id));
        }

        Ok(())
    }

    /// Counts ledger rows for one product (used by tests and diagnostics).
    pub async fn count_by_product(&self, user_id: &str, product_id: &str) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM stock_movements WHERE user_id = ?1 AND product_id = ?2",
        )
        .bind(user_id)
        .bind(product_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}

/// Helper to generate a new movement ID.
pub fn generate_movement_id() -> String {
    Uuid::new_v4().to_string()
}
