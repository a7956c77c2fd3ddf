//! # Checkout Service
//!
//! Sale creation as one atomic unit.
//!
//! ## Checkout Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         create_sale                                     │
//! │                                                                         │
//! │  1. Reject empty cart                                                  │
//! │  2. Price the cart (pure math, stocklane-core)                         │
//! │  3. BEGIN                                                              │
//! │  4. Sum lines per product, load each product once on the tx;           │
//! │     ownership + sufficiency checks against the per-product sum         │
//! │     (abort before any write on NotFound / InsufficientStock)           │
//! │  5. Draw INV-YYYYMMDD-NNNN from the day counter (same tx)              │
//! │  6. Insert sale + snapshot items                                       │
//! │  7. CAS-decrement each product; lost race → Conflict, full abort       │
//! │  8. Threshold check per decremented product                            │
//! │  9. COMMIT                                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Sales deliberately do not write StockMovement rows; the Sale/SaleItem
//! pair is their audit trail.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{require_user, EngineError, EngineResult};
use crate::services::alerts::AlertService;
use stocklane_core::checkout::price_sale;
use stocklane_core::{Money, Sale, SaleItem, SaleLine, TaxRate};
use stocklane_db::repository::sale::{
    format_invoice_number, generate_sale_id, generate_sale_item_id,
};
use stocklane_db::Database;

// =============================================================================
// Requests / Responses
// =============================================================================

/// A checkout to perform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSale {
    pub items: Vec<SaleLine>,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub payment_method: Option<String>,
    /// Whole-sale discount in cents, applied after line discounts.
    pub overall_discount_cents: Option<i64>,
    /// Tax rate in basis points (825 = 8.25%).
    pub tax_rate_bps: Option<u32>,
    pub notes: Option<String>,
}

/// What the caller gets back; full receipt data comes from
/// [`CheckoutService::sale_details`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutReceipt {
    pub sale_id: String,
    pub invoice_number: String,
    pub total_cents: i64,
}

/// A sale with its line items, for receipt rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleDetails {
    pub sale: Sale,
    pub items: Vec<SaleItem>,
}

// =============================================================================
// Service
// =============================================================================

/// Service for sale creation and reads.
#[derive(Debug, Clone)]
pub struct CheckoutService {
    db: Database,
    alerts: AlertService,
}

impl CheckoutService {
    pub fn new(db: Database) -> Self {
        let alerts = AlertService::new(db.clone());
        CheckoutService { db, alerts }
    }

    /// Creates a sale: pricing, invoice issue, snapshot items, and the
    /// quantity decrements as one transaction.
    pub async fn create_sale(
        &self,
        user_id: &str,
        request: CreateSale,
    ) -> EngineResult<CheckoutReceipt> {
        require_user(user_id)?;

        let overall_discount = Money::from_cents(request.overall_discount_cents.unwrap_or(0));
        let tax_rate = TaxRate::from_bps(request.tax_rate_bps.unwrap_or(0));

        // Pure pricing first: rejects empty carts and malformed lines
        // before we touch the database.
        let priced = price_sale(&request.items, overall_discount, tax_rate)?;

        debug!(
            user_id = %user_id,
            lines = priced.lines.len(),
            total_cents = priced.totals.total.cents(),
            "Creating sale"
        );

        let mut tx = self.db.pool().begin().await.map_err(stocklane_db::DbError::from)?;

        // A cart may list the same product on several lines; sufficiency
        // and the decrement apply to the per-product sum, not per line.
        let mut requested: Vec<(String, i64)> = Vec::new();
        for line in &priced.lines {
            match requested.iter().position(|(id, _)| id == &line.product_id) {
                Some(i) => requested[i].1 += line.quantity,
                None => requested.push((line.product_id.clone(), line.quantity)),
            }
        }

        // Pre-validate every product before any write: ownership and
        // sufficiency, reading on the tx connection so the quantities we
        // check are the ones the CAS below will swap against.
        let mut products = Vec::with_capacity(requested.len());
        for (product_id, quantity) in &requested {
            let product = self
                .db
                .products()
                .find_by_id_tx(&mut tx, user_id, product_id)
                .await?
                .ok_or_else(|| EngineError::not_found("Product", product_id))?;

            if product.quantity < *quantity {
                return Err(EngineError::InsufficientStock {
                    product_id: product.id,
                    available: product.quantity,
                    requested: *quantity,
                });
            }
            products.push((product, *quantity));
        }

        let now = Utc::now();
        let day = now.format("%Y%m%d").to_string();
        let seq = self.db.sales().next_invoice_seq_tx(&mut tx, &day).await?;
        let invoice_number = format_invoice_number(&day, seq);

        let sale = Sale {
            id: generate_sale_id(),
            user_id: user_id.to_string(),
            invoice_number: invoice_number.clone(),
            customer_name: request.customer_name,
            customer_phone: request.customer_phone,
            payment_method: request.payment_method,
            subtotal_cents: priced.totals.subtotal.cents(),
            discount_cents: priced.totals.discount.cents(),
            tax_cents: priced.totals.tax.cents(),
            total_cents: priced.totals.total.cents(),
            notes: request.notes,
            created_at: now,
        };

        self.db.sales().insert_sale_tx(&mut tx, &sale).await?;

        for line in &priced.lines {
            let product_name = products
                .iter()
                .find(|(p, _)| p.id == line.product_id)
                .map(|(p, _)| p.name.clone())
                .ok_or_else(|| EngineError::not_found("Product", &line.product_id))?;

            let item = SaleItem {
                id: generate_sale_item_id(),
                sale_id: sale.id.clone(),
                product_id: line.product_id.clone(),
                product_name,
                quantity: line.quantity,
                unit_price_cents: line.unit_price.cents(),
                discount_cents: line.discount.cents(),
                subtotal_cents: line.subtotal.cents(),
                total_cents: line.total.cents(),
                created_at: now,
            };
            self.db.sales().insert_item_tx(&mut tx, &item).await?;
        }

        for (product, quantity) in &products {
            let new_qty = product.quantity - quantity;
            let swapped = self
                .db
                .products()
                .compare_and_swap_quantity(&mut tx, user_id, &product.id, product.quantity, new_qty)
                .await?;
            if !swapped {
                tx.rollback().await.map_err(stocklane_db::DbError::from)?;
                return Err(EngineError::conflict(format!(
                    "Concurrent quantity change on product {}",
                    product.id
                )));
            }

            self.alerts
                .check_and_create_tx(&mut tx, user_id, &product.id, new_qty, product.low_stock_at)
                .await?;
        }

        tx.commit().await.map_err(stocklane_db::DbError::from)?;

        info!(
            sale_id = %sale.id,
            invoice_number = %invoice_number,
            total_cents = sale.total_cents,
            "Sale created"
        );

        Ok(CheckoutReceipt {
            sale_id: sale.id,
            invoice_number,
            total_cents: sale.total_cents,
        })
    }

    /// Re-reads a sale with its items for receipt rendering.
    pub async fn sale_details(&self, user_id: &str, sale_id: &str) -> EngineResult<SaleDetails> {
        require_user(user_id)?;

        let sale = self
            .db
            .sales()
            .find_by_id(user_id, sale_id)
            .await?
            .ok_or_else(|| EngineError::not_found("Sale", sale_id))?;

        let items = self.db.sales().items_for_sale(&sale.id).await?;

        Ok(SaleDetails { sale, items })
    }

    pub async fn list_sales(&self, user_id: &str, limit: u32) -> EngineResult<Vec<Sale>> {
        require_user(user_id)?;
        Ok(self.db.sales().list_by_user(user_id, limit).await?)
    }
}
