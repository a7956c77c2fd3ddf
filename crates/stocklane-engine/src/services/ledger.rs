//! # Ledger Service
//!
//! The stock ledger: every quantity change goes through here as an
//! append-only `StockMovement` row plus a guarded quantity update.
//!
//! ## Write Protocol
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     record_movement                                     │
//! │                                                                         │
//! │  1. Load product (scoped read on the tx connection)                    │
//! │  2. Apply the transition table   IN/RETURN: prev + qty                 │
//! │                                  OUT:       prev − qty (≥ 0 or abort)  │
//! │                                  ADJUSTMENT: qty is the target         │
//! │  3. Insert movement (previous/new captured)                            │
//! │  4. Compare-and-swap products.quantity (expected = previous)           │
//! │         └─ swap missed → Conflict, whole transaction rolls back        │
//! │  5. Threshold check → insert alert row if crossed                      │
//! │  6. Commit                                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The compare-and-swap in step 4 is what makes two racing writers safe:
//! the loser's expected quantity no longer matches, its UPDATE hits zero
//! rows, and its transaction aborts with nothing written.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{require_user, EngineError, EngineResult};
use crate::services::alerts::AlertService;
use stocklane_core::{validation, MovementType, StockMovement};
use stocklane_db::repository::movement::generate_movement_id;
use stocklane_db::Database;

// =============================================================================
// Requests
// =============================================================================

/// A movement to record against the ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordMovement {
    pub product_id: String,
    pub movement_type: MovementType,
    /// Delta magnitude for IN/OUT/RETURN; absolute target for ADJUSTMENT.
    pub quantity: i64,
    pub supplier_id: Option<String>,
    pub batch_id: Option<String>,
    pub unit_cost_cents: Option<i64>,
    pub reference: Option<String>,
    pub reason: Option<String>,
    pub notes: Option<String>,
}

/// A targeted adjustment: set the product's quantity to `new_quantity`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdjustToQuantity {
    pub product_id: String,
    pub new_quantity: i64,
    pub reason: Option<String>,
    pub notes: Option<String>,
}

// =============================================================================
// Service
// =============================================================================

/// Service for recording stock movements.
#[derive(Debug, Clone)]
pub struct LedgerService {
    db: Database,
    alerts: AlertService,
}

impl LedgerService {
    pub fn new(db: Database) -> Self {
        let alerts = AlertService::new(db.clone());
        LedgerService { db, alerts }
    }

    /// Records one movement: ledger row, quantity update, and threshold
    /// check as a single transaction.
    pub async fn record_movement(
        &self,
        user_id: &str,
        performed_by: &str,
        request: RecordMovement,
    ) -> EngineResult<StockMovement> {
        require_user(user_id)?;

        if performed_by.trim().is_empty() {
            return Err(EngineError::validation("performed_by must not be empty"));
        }
        request.movement_type.validate_quantity(request.quantity)?;
        if let Some(unit_cost) = request.unit_cost_cents {
            validation::validate_price_cents("unit_cost", unit_cost)?;
        }

        debug!(
            user_id = %user_id,
            product_id = %request.product_id,
            movement_type = %request.movement_type,
            quantity = request.quantity,
            "Recording stock movement"
        );

        let mut tx = self.db.pool().begin().await.map_err(stocklane_db::DbError::from)?;

        let product = self
            .db
            .products()
            .find_by_id_tx(&mut tx, user_id, &request.product_id)
            .await?
            .ok_or_else(|| EngineError::not_found("Product", &request.product_id))?;

        let previous_qty = product.quantity;
        let new_qty = request
            .movement_type
            .apply(&request.product_id, previous_qty, request.quantity)?;

        let total_cost_cents = request
            .unit_cost_cents
            .map(|cost| {
                cost.checked_mul(request.quantity).ok_or_else(|| {
                    EngineError::validation("unit_cost times quantity overflows")
                })
            })
            .transpose()?;

        let movement = StockMovement {
            id: generate_movement_id(),
            user_id: user_id.to_string(),
            product_id: request.product_id.clone(),
            supplier_id: request.supplier_id,
            batch_id: request.batch_id,
            movement_type: request.movement_type,
            quantity: request.quantity,
            previous_qty,
            new_qty,
            unit_cost_cents: request.unit_cost_cents,
            total_cost_cents,
            reference: request.reference,
            reason: request.reason,
            notes: request.notes,
            performed_by: performed_by.to_string(),
            created_at: Utc::now(),
        };

        self.db.movements().insert_tx(&mut tx, &movement).await?;

        let swapped = self
            .db
            .products()
            .compare_and_swap_quantity(&mut tx, user_id, &request.product_id, previous_qty, new_qty)
            .await?;
        if !swapped {
            tx.rollback().await.map_err(stocklane_db::DbError::from)?;
            return Err(EngineError::conflict(format!(
                "Concurrent quantity change on product {}",
                request.product_id
            )));
        }

        self.alerts
            .check_and_create_tx(&mut tx, user_id, &request.product_id, new_qty, product.low_stock_at)
            .await?;

        tx.commit().await.map_err(stocklane_db::DbError::from)?;

        info!(
            movement_id = %movement.id,
            product_id = %movement.product_id,
            movement_type = %movement.movement_type,
            previous_qty = previous_qty,
            new_qty = new_qty,
            "Stock movement recorded"
        );

        Ok(movement)
    }

    /// Sets a product's quantity to an explicit target.
    ///
    /// This is the single canonical adjustment path: it always writes an
    /// ADJUSTMENT ledger row carrying the `|new − previous|` delta, then
    /// runs the same guarded update and threshold check as
    /// [`Self::record_movement`].
    pub async fn adjust_to_quantity(
        &self,
        user_id: &str,
        performed_by: &str,
        request: AdjustToQuantity,
    ) -> EngineResult<StockMovement> {
        require_user(user_id)?;

        if performed_by.trim().is_empty() {
            return Err(EngineError::validation("performed_by must not be empty"));
        }
        validation::validate_stock_target(request.new_quantity)?;

        debug!(
            user_id = %user_id,
            product_id = %request.product_id,
            new_quantity = request.new_quantity,
            "Adjusting stock to target"
        );

        let mut tx = self.db.pool().begin().await.map_err(stocklane_db::DbError::from)?;

        let product = self
            .db
            .products()
            .find_by_id_tx(&mut tx, user_id, &request.product_id)
            .await?
            .ok_or_else(|| EngineError::not_found("Product", &request.product_id))?;

        let previous_qty = product.quantity;
        let new_qty = request.new_quantity;

        let movement = StockMovement {
            id: generate_movement_id(),
            user_id: user_id.to_string(),
            product_id: request.product_id.clone(),
            supplier_id: None,
            batch_id: None,
            movement_type: MovementType::Adjustment,
            quantity: (new_qty - previous_qty).abs(),
            previous_qty,
            new_qty,
            unit_cost_cents: None,
            total_cost_cents: None,
            reference: None,
            reason: request.reason,
            notes: request.notes,
            performed_by: performed_by.to_string(),
            created_at: Utc::now(),
        };

        self.db.movements().insert_tx(&mut tx, &movement).await?;

        let swapped = self
            .db
            .products()
            .compare_and_swap_quantity(&mut tx, user_id, &request.product_id, previous_qty, new_qty)
            .await?;
        if !swapped {
            tx.rollback().await.map_err(stocklane_db::DbError::from)?;
            return Err(EngineError::conflict(format!(
                "Concurrent quantity change on product {}",
                request.product_id
            )));
        }

        self.alerts
            .check_and_create_tx(&mut tx, user_id, &request.product_id, new_qty, product.low_stock_at)
            .await?;

        tx.commit().await.map_err(stocklane_db::DbError::from)?;

        info!(
            movement_id = %movement.id,
            product_id = %movement.product_id,
            previous_qty = previous_qty,
            new_qty = new_qty,
            "Stock adjusted to target"
        );

        Ok(movement)
    }

    // =========================================================================
    // Reads
    // =========================================================================

    pub async fn movement(&self, user_id: &str, id: &str) -> EngineResult<StockMovement> {
        require_user(user_id)?;
        self.db
            .movements()
            .find_by_id(user_id, id)
            .await?
            .ok_or_else(|| EngineError::not_found("StockMovement", id))
    }

    pub async fn history(&self, user_id: &str, limit: u32) -> EngineResult<Vec<StockMovement>> {
        require_user(user_id)?;
        Ok(self.db.movements().list_by_user(user_id, limit).await?)
    }

    pub async fn history_for_product(
        &self,
        user_id: &str,
        product_id: &str,
    ) -> EngineResult<Vec<StockMovement>> {
        require_user(user_id)?;
        Ok(self.db.movements().list_by_product(user_id, product_id).await?)
    }
}
