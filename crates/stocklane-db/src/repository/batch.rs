//! # Batch Repository
//!
//! Database operations for received stock batches.
//!
//! Batches carry their own received quantity and optional expiry window;
//! the expiry sweep in the engine reads `list_with_expiry` and evaluates
//! each batch against the warning window.

use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use stocklane_core::Batch;

/// Repository for batch database operations.
#[derive(Debug, Clone)]
pub struct BatchRepository {
    pool: SqlitePool,
}

impl BatchRepository {
    /// Creates a new BatchRepository.
    pub fn new(pool: SqlitePool) -> Self {
        BatchRepository { pool }
    }

    /// Inserts a batch.
    pub async fn insert(&self, batch: &Batch) -> DbResult<()> {
        debug!(
            id = %batch.id,
            product_id = %batch.product_id,
            batch_number = %batch.batch_number,
            "Inserting batch"
        );

        sqlx::query(
            r#"
            INSERT INTO batches (
                id, user_id, product_id, batch_number, quantity,
                manufactured_at, expires_at, received_at, notes, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&batch.id)
        .bind(&batch.user_id)
        .bind(&batch.product_id)
        .bind(&batch.batch_number)
        .bind(batch.quantity)
        .bind(batch.manufactured_at)
        .bind(batch.expires_at)
        .bind(batch.received_at)
        .bind(&batch.notes)
        .bind(batch.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a batch by id, scoped to its owner.
    pub async fn find_by_id(&self, user_id: &str, id: &str) -> DbResult<Option<Batch>> {
        let batch =
            sqlx::query_as::<_, Batch>("SELECT * FROM batches WHERE id = ?1 AND user_id = ?2")
                .bind(id)
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(batch)
    }

    /// Lists batches for one product, newest received first.
    pub async fn list_by_product(&self, user_id: &str, product_id: &str) -> DbResult<Vec<Batch>> {
        let batches = sqlx::query_as::<_, Batch>(
            r#"
            SELECT * FROM batches
            WHERE user_id = ?1 AND product_id = ?2
            ORDER BY received_at DESC
            "#,
        )
        .bind(user_id)
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(batches)
    }

    /// Lists all of a user's batches, newest received first.
    pub async fn list_by_user(&self, user_id: &str) -> DbResult<Vec<Batch>> {
        let batches = sqlx::query_as::<_, Batch>(
            r#"
            SELECT * FROM batches
            WHERE user_id = ?1
            ORDER BY received_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(batches)
    }

    /// Lists batches that carry an expiry date, soonest expiry first.
    ///
    /// The caller decides which of these are inside the warning window;
    /// this read just excludes batches with no expiry at all.
    pub async fn list_with_expiry(&self, user_id: &str) -> DbResult<Vec<Batch>> {
        let batches = sqlx::query_as::<_, Batch>(
            r#"
            SELECT * FROM batches
            WHERE user_id = ?1 AND expires_at IS NOT NULL
            ORDER BY expires_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(batches)
    }

    /// Deletes a batch.
    pub async fn delete(&self, user_id: &str, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM batches WHERE id = ?1 AND user_id = ?2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Batch", id));
        }

        Ok(())
    }
}

/// Helper to generate a new batch ID.
pub fn generate_batch_id() -> String {
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
    use chrono::{Duration, Utc};
    use stocklane_core::Product;

    async fn seed_product(db: &Database, user_id: &str) -> String {
        let now = Utc::now();
        let product = Product {
            id: generate_product_id(),
            user_id: user_id.to_string(),
            name: "Oil Filter".to_string(),
            manufacturer: None,
            model: None,
            sku: None,
            quantity: 0,
            low_stock_at: None,
            price_cents: 1200,
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

    fn batch_for(user_id: &str, product_id: &str, expires_in_days: Option<i64>) -> Batch {
        let now = Utc::now();
        Batch {
            id: generate_batch_id(),
            user_id: user_id.to_string(),
            product_id: product_id.to_string(),
            batch_number: format!("B-{}", Uuid::new_v4()),
            quantity: 24,
            manufactured_at: None,
            expires_at: expires_in_days.map(|d| now + Duration::days(d)),
            received_at: now,
            notes: None,
            created_at: now,
        }
    }

    #[tokio::test]
    async fn test_list_with_expiry_excludes_undated_batches() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let product_id = seed_product(&db, "u-1").await;
        let repo = db.batches();

        repo.insert(&batch_for("u-1", &product_id, None)).await.unwrap();
        repo.insert(&batch_for("u-1", &product_id, Some(90))).await.unwrap();
        repo.insert(&batch_for("u-1", &product_id, Some(10))).await.unwrap();

        let dated = repo.list_with_expiry("u-1").await.unwrap();
        assert_eq!(dated.len(), 2);
        // soonest expiry first
        assert!(dated[0].expires_at.unwrap() < dated[1].expires_at.unwrap());

        let all = repo.list_by_user("u-1").await.unwrap();
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn test_batches_are_user_scoped() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let product_id = seed_product(&db, "u-1").await;
        let repo = db.batches();

        let batch = batch_for("u-1", &product_id, Some(30));
        repo.insert(&batch).await.unwrap();

        assert!(repo.find_by_id("u-1", &batch.id).await.unwrap().is_some());
        assert!(repo.find_by_id("u-2", &batch.id).await.unwrap().is_none());

        let err = repo.delete("u-2", &batch.id).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
