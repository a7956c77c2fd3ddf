//! # Batch Service
//!
//! Received-batch tracking with expiry evaluation.
//!
//! Batches are a side-ledger: creating one does not change the owning
//! product's quantity (receivers record an IN movement separately when
//! the stock actually lands). What creating a batch DOES do is evaluate
//! the expiry rule immediately, so a batch received already inside the
//! warning window alerts right away instead of waiting for the next sweep.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{require_user, EngineError, EngineResult};
use stocklane_core::alerts::expiry_alert;
use stocklane_core::{validation, Batch, StockAlert};
use stocklane_db::repository::alert::generate_alert_id;
use stocklane_db::repository::batch::generate_batch_id;
use stocklane_db::Database;

/// A batch to register.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBatch {
    pub product_id: String,
    pub batch_number: String,
    pub quantity: i64,
    pub manufactured_at: Option<chrono::DateTime<Utc>>,
    pub expires_at: Option<chrono::DateTime<Utc>>,
    /// When the batch landed; defaults to now for fresh receipts.
    pub received_at: Option<chrono::DateTime<Utc>>,
    pub notes: Option<String>,
}

/// Result of registering a batch: the row plus any alert it triggered.
#[derive(Debug, Clone)]
pub struct CreatedBatch {
    pub batch: Batch,
    pub alert: Option<StockAlert>,
}

/// Service for batch registration and reads.
#[derive(Debug, Clone)]
pub struct BatchService {
    db: Database,
}

impl BatchService {
    pub fn new(db: Database) -> Self {
        BatchService { db }
    }

    /// Registers a received batch and immediately evaluates its expiry.
    pub async fn create_batch(
        &self,
        user_id: &str,
        request: CreateBatch,
    ) -> EngineResult<CreatedBatch> {
        require_user(user_id)?;

        validation::validate_batch_number(&request.batch_number)?;
        validation::validate_positive_quantity(request.quantity)?;
        validation::validate_batch_dates(request.manufactured_at, request.expires_at)?;

        // ownership check before any write
        self.db
            .products()
            .find_by_id(user_id, &request.product_id)
            .await?
            .ok_or_else(|| EngineError::not_found("Product", &request.product_id))?;

        let now = Utc::now();
        let batch = Batch {
            id: generate_batch_id(),
            user_id: user_id.to_string(),
            product_id: request.product_id.clone(),
            batch_number: request.batch_number,
            quantity: request.quantity,
            manufactured_at: request.manufactured_at,
            expires_at: request.expires_at,
            received_at: request.received_at.unwrap_or(now),
            notes: request.notes,
            created_at: now,
        };

        self.db.batches().insert(&batch).await?;

        debug!(
            batch_id = %batch.id,
            product_id = %batch.product_id,
            batch_number = %batch.batch_number,
            "Batch registered"
        );

        // A batch already inside the warning window alerts on creation.
        let mut created_alert = None;
        if let Some(expires_at) = batch.expires_at {
            if let Some(finding) = expiry_alert(&batch.batch_number, expires_at, now) {
                let alert = StockAlert {
                    id: generate_alert_id(),
                    user_id: user_id.to_string(),
                    product_id: batch.product_id.clone(),
                    alert_type: finding.alert_type,
                    message: finding.message,
                    threshold: None,
                    current_value: Some(finding.days_until_expiry),
                    acknowledged: false,
                    acknowledged_by: None,
                    acknowledged_at: None,
                    resolved_at: None,
                    created_at: now,
                };
                self.db.alerts().insert(&alert).await?;

                info!(
                    batch_id = %batch.id,
                    alert_type = %alert.alert_type,
                    "Batch alerted on creation"
                );
                created_alert = Some(alert);
            }
        }

        Ok(CreatedBatch {
            batch,
            alert: created_alert,
        })
    }

    pub async fn batch(&self, user_id: &str, id: &str) -> EngineResult<Batch> {
        require_user(user_id)?;
        self.db
            .batches()
            .find_by_id(user_id, id)
            .await?
            .ok_or_else(|| EngineError::not_found("Batch", id))
    }

    pub async fn list_batches(&self, user_id: &str) -> EngineResult<Vec<Batch>> {
        require_user(user_id)?;
        Ok(self.db.batches().list_by_user(user_id).await?)
    }

    pub async fn list_for_product(
        &self,
        user_id: &str,
        product_id: &str,
    ) -> EngineResult<Vec<Batch>> {
        require_user(user_id)?;
        Ok(self.db.batches().list_by_product(user_id, product_id).await?)
    }

    pub async fn delete_batch(&self, user_id: &str, id: &str) -> EngineResult<()> {
        require_user(user_id)?;
        Ok(self.db.batches().delete(user_id, id).await?)
    }
}
