//! # Sale Repository
//!
//! Database operations for sales, sale items, and invoice numbering.
//!
//! ## Invoice Numbering
//! Invoice numbers are `INV-YYYYMMDD-NNNN` with a per-day sequence. The
//! sequence comes from the `invoice_counters` table via a single
//! upsert-RETURNING statement on the checkout transaction, so two
//! concurrent checkouts can never draw the same number and an aborted
//! checkout rolls its draw back with everything else.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use stocklane_core::{Sale, SaleItem};

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

/// Aggregate row for sales over a date range.
#[derive(Debug, Clone, serde::Serialize, sqlx::FromRow)]
pub struct SalesSummaryRow {
    pub sale_count: i64,
    pub revenue_cents: i64,
}

/// Aggregate row for best-selling products.
#[derive(Debug, Clone, serde::Serialize, sqlx::FromRow)]
pub struct TopSellerRow {
    pub product_id: String,
    pub product_name: String,
    pub total_quantity: i64,
    pub revenue_cents: i64,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Draws the next invoice sequence number for a day on a transaction
    /// connection. `day` is formatted `YYYYMMDD`.
    pub async fn next_invoice_seq_tx(
        &self,
        conn: &mut SqliteConnection,
        day: &str,
    ) -> DbResult<i64> {
        let seq: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO invoice_counters (day, next_seq) VALUES (?1, 1)
            ON CONFLICT(day) DO UPDATE SET next_seq = next_seq + 1
            RETURNING next_seq
            "#,
        )
        .bind(day)
        .fetch_one(conn)
        .await?;

        Ok(seq)
    }

    /// Inserts a sale header on a transaction connection.
    pub async fn insert_sale_tx(&self, conn: &mut SqliteConnection, sale: &Sale) -> DbResult<()> {
        debug!(
            id = %sale.id,
            invoice_number = %sale.invoice_number,
            total_cents = sale.total_cents,
            "Inserting sale"
        );

        sqlx::query(
            r#"
            INSERT INTO sales (
                id, user_id, invoice_number, customer_name, customer_phone,
                payment_method, subtotal_cents, discount_cents, tax_cents,
                total_cents, notes, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
        )
        .bind(&sale.id)
        .bind(&sale.user_id)
        .bind(&sale.invoice_number)
        .bind(&sale.customer_name)
        .bind(&sale.customer_phone)
        .bind(&sale.payment_method)
        .bind(sale.subtotal_cents)
        .bind(sale.discount_cents)
        .bind(sale.tax_cents)
        .bind(sale.total_cents)
        .bind(&sale.notes)
        .bind(sale.created_at)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Inserts a snapshot line item on a transaction connection.
    pub async fn insert_item_tx(
        &self,
        conn: &mut SqliteConnection,
        item: &SaleItem,
    ) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO sale_items (
                id, sale_id, product_id, product_name, quantity,
                unit_price_cents, discount_cents, subtotal_cents,
                total_cents, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&item.id)
        .bind(&item.sale_id)
        .bind(&item.product_id)
        .bind(&item.product_name)
        .bind(item.quantity)
        .bind(item.unit_price_cents)
        .bind(item.discount_cents)
        .bind(item.subtotal_cents)
        .bind(item.total_cents)
        .bind(item.created_at)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Gets a sale by id, scoped to its owner.
    pub async fn find_by_id(&self, user_id: &str, id: &str) -> DbResult<Option<Sale>> {
        let sale = sqlx::query_as::<_, Sale>("SELECT * FROM sales WHERE id = ?1 AND user_id = ?2")
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(sale)
    }

    /// Lists the line items of a sale.
    pub async fn items_for_sale(&self, sale_id: &str) -> DbResult<Vec<SaleItem>> {
        let items = sqlx::query_as::<_, SaleItem>(
            "SELECT * FROM sale_items WHERE sale_id = ?1 ORDER BY created_at ASC, id ASC",
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Lists a user's sales, most recent first.
    pub async fn list_by_user(&self, user_id: &str, limit: u32) -> DbResult<Vec<Sale>> {
        let sales = sqlx::query_as::<_, Sale>(
            r#"
            SELECT * FROM sales
            WHERE user_id = ?1
            ORDER BY created_at DESC
            LIMIT ?2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(sales)
    }

    /// Sale count and revenue over a date range.
    pub async fn sales_summary(
        &self,
        user_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DbResult<SalesSummaryRow> {
        let summary = sqlx::query_as::<_, SalesSummaryRow>(
            r#"
            SELECT
                COUNT(*) AS sale_count,
                COALESCE(SUM(total_cents), 0) AS revenue_cents
            FROM sales
            WHERE user_id = ?1 AND created_at >= ?2 AND created_at <= ?3
            "#,
        )
        .bind(user_id)
        .bind(from)
        .bind(to)
        .fetch_one(&self.pool)
        .await?;

        Ok(summary)
    }

    /// Best-selling products by units sold over a date range.
    pub async fn top_sellers(
        &self,
        user_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        limit: u32,
    ) -> DbResult<Vec<TopSellerRow>> {
        let rows = sqlx::query_as::<_, TopSellerRow>(
            r#"
            SELECT
                si.product_id AS product_id,
                si.product_name AS product_name,
                SUM(si.quantity) AS total_quantity,
                SUM(si.total_cents) AS revenue_cents
            FROM sale_items si
            JOIN sales s ON s.id = si.sale_id
            WHERE s.user_id = ?1 AND s.created_at >= ?2 AND s.created_at <= ?3
            GROUP BY si.product_id, si.product_name
            ORDER BY total_quantity DESC
            LIMIT ?4
            "#,
        )
        .bind(user_id)
        .bind(from)
        .bind(to)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Deletes a sale and its items.
    pub async fn delete(&self, user_id: &str, id: &str) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM sale_items WHERE sale_id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM sales WHERE id = ?1 AND user_id = ?2")
            .bind(id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(DbError::not_found("Sale", id));
        }

        tx.commit().await?;
        Ok(())
    }
}

/// Formats an invoice number from a day key and drawn sequence.
pub fn format_invoice_number(day: &str, seq: i64) -> String {
    format!("INV-{day}-{seq:04}")
}

/// Helper to generate a new sale ID.
pub fn generate_sale_id() -> String {
    Uuid::new_v4().to_string()
}

/// Helper to generate a new sale item ID.
pub fn generate_sale_item_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn test_invoice_seq_starts_at_one_and_increments() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.sales();

        let mut conn = db.pool().acquire().await.unwrap();
        assert_eq!(repo.next_invoice_seq_tx(&mut conn, "20260829").await.unwrap(), 1);
        assert_eq!(repo.next_invoice_seq_tx(&mut conn, "20260829").await.unwrap(), 2);
        assert_eq!(repo.next_invoice_seq_tx(&mut conn, "20260829").await.unwrap(), 3);

        // a new day restarts the sequence
        assert_eq!(repo.next_invoice_seq_tx(&mut conn, "20260830").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_invoice_seq_rolls_back_with_transaction() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.sales();

        {
            let mut tx = db.pool().begin().await.unwrap();
            assert_eq!(repo.next_invoice_seq_tx(&mut tx, "20260829").await.unwrap(), 1);
            tx.rollback().await.unwrap();
        }

        // aborted draw did not consume the number
        let mut conn = db.pool().acquire().await.unwrap();
        assert_eq!(repo.next_invoice_seq_tx(&mut conn, "20260829").await.unwrap(), 1);
    }

    #[test]
    fn test_invoice_number_format() {
        assert_eq!(format_invoice_number("20260829", 7), "INV-20260829-0007");
        assert_eq!(format_invoice_number("20260829", 1234), "INV-20260829-1234");
        // sequences past four digits keep widening rather than wrapping
        assert_eq!(format_invoice_number("20260829", 10001), "INV-20260829-10001");
    }

    #[tokio::test]
    async fn test_duplicate_invoice_number_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.sales();
        let now = Utc::now();

        let sale = |id: &str| Sale {
            id: id.to_string(),
            user_id: "u-1".to_string(),
            invoice_number: "INV-20260829-0001".to_string(),
            customer_name: None,
            customer_phone: None,
            payment_method: None,
            subtotal_cents: 1000,
            discount_cents: 0,
            tax_cents: 0,
            total_cents: 1000,
            notes: None,
            created_at: now,
        };

        let mut conn = db.pool().acquire().await.unwrap();
        repo.insert_sale_tx(&mut conn, &sale(&generate_sale_id())).await.unwrap();

        let err = repo
            .insert_sale_tx(&mut conn, &sale(&generate_sale_id()))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }
}
