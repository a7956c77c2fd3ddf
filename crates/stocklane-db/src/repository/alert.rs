//! # Stock Alert Repository
//!
//! Database operations for stock alerts.
//!
//! ## Lifecycle Writes
//! Acknowledge and resolve are one-way: the UPDATE statements carry
//! `acknowledged = 0` / `resolved_at IS NULL` guards so a second call
//! cannot overwrite the original actor or timestamp. Alert creation is
//! never deduplicated; every threshold crossing and every expiry sweep
//! inserts a fresh row.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use stocklane_core::StockAlert;

/// Repository for stock alert database operations.
#[derive(Debug, Clone)]
pub struct StockAlertRepository {
    pool: SqlitePool,
}

impl StockAlertRepository {
    /// Creates a new StockAlertRepository.
    pub fn new(pool: SqlitePool) -> Self {
        StockAlertRepository { pool }
    }

    /// Inserts an alert on a transaction connection.
    ///
    /// Threshold alerts are written inside the same transaction as the
    /// quantity change that triggered them so the ledger, quantity, and
    /// alert agree or none of them exist.
    pub async fn insert_tx(&self, conn: &mut SqliteConnection, alert: &StockAlert) -> DbResult<()> {
        debug!(
            id = %alert.id,
            product_id = %alert.product_id,
            alert_type = %alert.alert_type,
            "Inserting stock alert"
        );

        sqlx::query(
            r#"
            INSERT INTO stock_alerts (
                id, user_id, product_id, alert_type, message,
                threshold, current_value,
                acknowledged, acknowledged_by, acknowledged_at, resolved_at,
                created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
        )
        .bind(&alert.id)
        .bind(&alert.user_id)
        .bind(&alert.product_id)
        .bind(alert.alert_type)
        .bind(&alert.message)
        .bind(alert.threshold)
        .bind(alert.current_value)
        .bind(alert.acknowledged)
        .bind(&alert.acknowledged_by)
        .bind(alert.acknowledged_at)
        .bind(alert.resolved_at)
        .bind(alert.created_at)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Inserts an alert using the pool (expiry sweeps, which have no
    /// surrounding quantity transaction).
    pub async fn insert(&self, alert: &StockAlert) -> DbResult<()> {
        let mut conn = self.pool.acquire().await?;
        self.insert_tx(&mut conn, alert).await
    }

    /// Gets an alert by id, scoped to its owner.
    pub async fn find_by_id(&self, user_id: &str, id: &str) -> DbResult<Option<StockAlert>> {
        let alert = sqlx::query_as::<_, StockAlert>(
            "SELECT * FROM stock_alerts WHERE id = ?1 AND user_id = ?2",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(alert)
    }

    /// Lists a user's alerts, most recent first.
    pub async fn list_by_user(&self, user_id: &str, limit: u32) -> DbResult<Vec<StockAlert>> {
        let alerts = sqlx::query_as::<_, StockAlert>(
            r#"
            SELECT * FROM stock_alerts
            WHERE user_id = ?1
            ORDER BY created_at DESC
            LIMIT ?2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(alerts)
    }

    /// Lists alerts for one product, most recent first.
    pub async fn list_by_product(
        &self,
        user_id: &str,
        product_id: &str,
    ) -> DbResult<Vec<StockAlert>> {
        let alerts = sqlx::query_as::<_, StockAlert>(
            r#"
            SELECT * FROM stock_alerts
            WHERE user_id = ?1 AND product_id = ?2
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(alerts)
    }

    /// Lists unacknowledged alerts, most recent first.
    pub async fn list_unacknowledged(&self, user_id: &str) -> DbResult<Vec<StockAlert>> {
        let alerts = sqlx::query_as::<_, StockAlert>(
            r#"
            SELECT * FROM stock_alerts
            WHERE user_id = ?1 AND acknowledged = 0
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(alerts)
    }

    /// Lists open (unresolved) alerts, most recent first.
    pub async fn list_open(&self, user_id: &str) -> DbResult<Vec<StockAlert>> {
        let alerts = sqlx::query_as::<_, StockAlert>(
            r#"
            SELECT * FROM stock_alerts
            WHERE user_id = ?1 AND resolved_at IS NULL
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(alerts)
    }

    /// Marks an alert acknowledged (one-way).
    ///
    /// Returns `true` when this call performed the transition, `false`
    /// when the alert was already acknowledged (original actor/timestamp
    /// preserved). Errors NotFound when the alert doesn't exist for this
    /// user.
    pub async fn acknowledge(
        &self,
        user_id: &str,
        id: &str,
        acknowledged_by: &str,
    ) -> DbResult<bool> {
        debug!(id = %id, acknowledged_by = %acknowledged_by, "Acknowledging alert");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE stock_alerts
            SET acknowledged = 1, acknowledged_by = ?3, acknowledged_at = ?4
            WHERE id = ?1 AND user_id = ?2 AND acknowledged = 0
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(acknowledged_by)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 1 {
            return Ok(true);
        }

        // Zero rows: either missing or already acknowledged.
        match self.find_by_id(user_id, id).await? {
            Some(_) => Ok(false),
            None => Err(DbError::not_found("StockAlert", id)),
        }
    }

    /// Stamps an alert resolved (one-way, independent of acknowledged).
    ///
    /// Same return contract as [`Self::acknowledge`].
    pub async fn resolve(&self, user_id: &str, id: &str) -> DbResult<bool> {
        debug!(id = %id, "Resolving alert");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE stock_alerts
            SET resolved_at = ?3
            WHERE id = ?1 AND user_id = ?2 AND resolved_at IS NULL
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 1 {
            return Ok(true);
        }

        match self.find_by_id(user_id, id).await? {
            Some(_) => Ok(false),
            None => Err(DbError::not_found("StockAlert", id)),
        }
    }

    /// Counts unacknowledged alerts (dashboard badge).
    pub async fn unacknowledged_count(&self, user_id: &str) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM stock_alerts WHERE user_id = ?1 AND acknowledged = 0",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// Deletes an alert.
    pub async fn delete(&self, user_id: &str, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM stock_alerts WHERE id = ?1 AND user_id = ?2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("StockAlert", id));
        }

        Ok(())
    }
}

/// Helper to generate a new alert ID.
pub fn generate_alert_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::product::generate_product_id;
    use stocklane_core::{AlertType, Product};

    async fn seed_product(db: &Database, user_id: &str) -> String {
        let now = Utc::now();
        let product = Product {
            id: generate_product_id(),
            user_id: user_id.to_string(),
            name: "Brake Pad".to_string(),
            manufacturer: None,
            model: None,
            sku: None,
            quantity: 10,
            low_stock_at: None,
            price_cents: 2500,
            category: None,
            supplier: None,
            specs: None,
            compatibility: None,
            notes: None,
            image_url: None,
            created_at: now,
            updated_at: now,
        };
        db.products().insert(&product).await.unwrap();
        product.id
    }

    fn alert_for(user_id: &str, product_id: &str) -> StockAlert {
        StockAlert {
            id: generate_alert_id(),
            user_id: user_id.to_string(),
            product_id: product_id.to_string(),
            alert_type: AlertType::LowStock,
            message: "Stock is low: 3 remaining (threshold 5)".to_string(),
            threshold: Some(5),
            current_value: Some(3),
            acknowledged: false,
            acknowledged_by: None,
            acknowledged_at: None,
            resolved_at: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_acknowledge_is_one_way() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let product_id = seed_product(&db, "u-1").await;
        let repo = db.alerts();

        let alert = alert_for("u-1", &product_id);
        repo.insert(&alert).await.unwrap();

        assert!(repo.acknowledge("u-1", &alert.id, "actor-1").await.unwrap());

        // second call does not overwrite the original actor
        assert!(!repo.acknowledge("u-1", &alert.id, "actor-2").await.unwrap());

        let stored = repo.find_by_id("u-1", &alert.id).await.unwrap().unwrap();
        assert!(stored.acknowledged);
        assert_eq!(stored.acknowledged_by.as_deref(), Some("actor-1"));
    }

    #[tokio::test]
    async fn test_resolve_independent_of_acknowledge() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let product_id = seed_product(&db, "u-1").await;
        let repo = db.alerts();

        let alert = alert_for("u-1", &product_id);
        repo.insert(&alert).await.unwrap();

        // resolve without acknowledging
        assert!(repo.resolve("u-1", &alert.id).await.unwrap());

        let stored = repo.find_by_id("u-1", &alert.id).await.unwrap().unwrap();
        assert!(stored.resolved_at.is_some());
        assert!(!stored.acknowledged);

        // still acknowledgeable after resolution (orthogonal flags)
        assert!(repo.acknowledge("u-1", &alert.id, "actor-1").await.unwrap());
    }

    #[tokio::test]
    async fn test_acknowledge_missing_alert_is_not_found() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.alerts();

        let err = repo.acknowledge("u-1", "nope", "actor-1").await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_unacknowledged_count() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let product_id = seed_product(&db, "u-1").await;
        let repo = db.alerts();

        for _ in 0..3 {
            repo.insert(&alert_for("u-1", &product_id)).await.unwrap();
        }

        assert_eq!(repo.unacknowledged_count("u-1").await.unwrap(), 3);

        let alerts = repo.list_unacknowledged("u-1").await.unwrap();
        repo.acknowledge("u-1", &alerts[0].id, "actor").await.unwrap();

        assert_eq!(repo.unacknowledged_count("u-1").await.unwrap(), 2);
    }
}
