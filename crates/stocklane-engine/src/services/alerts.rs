//! # Alert Service
//!
//! Creates and manages stock alerts.
//!
//! Threshold alerts are created inside the transaction that changed the
//! quantity (see [`super::ledger`] and [`super::checkout`]); expiry alerts
//! come from an explicit sweep over dated batches. Neither path
//! deduplicates: repeat crossings and repeat sweeps produce repeat rows.
//! Stock recovering above threshold resolves nothing by itself.

use chrono::Utc;
use sqlx::SqliteConnection;
use tracing::{debug, info};

use crate::error::{require_user, EngineError, EngineResult};
use stocklane_core::alerts::{expiry_alert, threshold_alert};
use stocklane_core::StockAlert;
use stocklane_db::repository::alert::generate_alert_id;
use stocklane_db::Database;

/// Service for the stock alert lifecycle.
#[derive(Debug, Clone)]
pub struct AlertService {
    db: Database,
}

impl AlertService {
    pub fn new(db: Database) -> Self {
        AlertService { db }
    }

    /// Evaluates the threshold rule for a quantity change and inserts the
    /// resulting alert, if any, on the caller's transaction connection.
    ///
    /// Returns the created alert so callers can log or surface it.
    pub(crate) async fn check_and_create_tx(
        &self,
        conn: &mut SqliteConnection,
        user_id: &str,
        product_id: &str,
        current_qty: i64,
        low_stock_at: Option<i64>,
    ) -> EngineResult<Option<StockAlert>> {
        let Some(finding) = threshold_alert(current_qty, low_stock_at) else {
            return Ok(None);
        };

        let alert = StockAlert {
            id: generate_alert_id(),
            user_id: user_id.to_string(),
            product_id: product_id.to_string(),
            alert_type: finding.alert_type,
            message: finding.message,
            threshold: finding.threshold,
            current_value: Some(finding.current_value),
            acknowledged: false,
            acknowledged_by: None,
            acknowledged_at: None,
            resolved_at: None,
            created_at: Utc::now(),
        };

        self.db.alerts().insert_tx(conn, &alert).await?;

        debug!(
            product_id = %product_id,
            alert_type = %alert.alert_type,
            current_qty = current_qty,
            "Threshold alert created"
        );

        Ok(Some(alert))
    }

    /// Sweeps all dated batches and emits EXPIRING_SOON/EXPIRED alerts.
    ///
    /// Re-running the sweep re-emits for every batch still inside the
    /// window; scheduling it is the caller's concern.
    pub async fn check_expiring_batches(&self, user_id: &str) -> EngineResult<Vec<StockAlert>> {
        require_user(user_id)?;

        let now = Utc::now();
        let batches = self.db.batches().list_with_expiry(user_id).await?;

        let mut created = Vec::new();

        for batch in &batches {
            // list_with_expiry only returns dated batches
            let Some(expires_at) = batch.expires_at else {
                continue;
            };
            let Some(finding) = expiry_alert(&batch.batch_number, expires_at, now) else {
                continue;
            };

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
            created.push(alert);
        }

        info!(
            user_id = %user_id,
            swept = batches.len(),
            created = created.len(),
            "Expiry sweep complete"
        );

        Ok(created)
    }

    /// Marks an alert acknowledged by an actor. Safe to repeat; only the
    /// first call records the actor and timestamp.
    pub async fn acknowledge(
        &self,
        user_id: &str,
        alert_id: &str,
        acknowledged_by: &str,
    ) -> EngineResult<StockAlert> {
        require_user(user_id)?;

        if acknowledged_by.trim().is_empty() {
            return Err(EngineError::validation("acknowledged_by must not be empty"));
        }

        self.db
            .alerts()
            .acknowledge(user_id, alert_id, acknowledged_by)
            .await?;

        self.db
            .alerts()
            .find_by_id(user_id, alert_id)
            .await?
            .ok_or_else(|| EngineError::not_found("StockAlert", alert_id))
    }

    /// Stamps an alert resolved. Safe to repeat; the first timestamp wins.
    pub async fn resolve(&self, user_id: &str, alert_id: &str) -> EngineResult<StockAlert> {
        require_user(user_id)?;

        self.db.alerts().resolve(user_id, alert_id).await?;

        self.db
            .alerts()
            .find_by_id(user_id, alert_id)
            .await?
            .ok_or_else(|| EngineError::not_found("StockAlert", alert_id))
    }

    pub async fn list_alerts(&self, user_id: &str, limit: u32) -> EngineResult<Vec<StockAlert>> {
        require_user(user_id)?;
        Ok(self.db.alerts().list_by_user(user_id, limit).await?)
    }

    pub async fn list_open(&self, user_id: &str) -> EngineResult<Vec<StockAlert>> {
        require_user(user_id)?;
        Ok(self.db.alerts().list_open(user_id).await?)
    }

    pub async fn list_for_product(
        &self,
        user_id: &str,
        product_id: &str,
    ) -> EngineResult<Vec<StockAlert>> {
        require_user(user_id)?;
        Ok(self.db.alerts().list_by_product(user_id, product_id).await?)
    }

    pub async fn unacknowledged_count(&self, user_id: &str) -> EngineResult<i64> {
        require_user(user_id)?;
        Ok(self.db.alerts().unacknowledged_count(user_id).await?)
    }
}
