//! # Domain Types
//!
//! Core domain types used throughout Stocklane.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │ StockMovement   │   │   StockAlert    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  quantity       │◄──│  previous_qty   │──►│  alert_type     │       │
//! │  │  low_stock_at   │   │  new_qty        │   │  acknowledged   │       │
//! │  │  price_cents    │   │  movement_type  │   │  resolved_at    │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     Batch       │   │ Sale / SaleItem │   │ Supplier /      │       │
//! │  │  expires_at     │   │ invoice_number  │   │ ProductSupplier │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Ownership Model
//! Every aggregate carries a `user_id`; each row belongs to exactly one
//! user and every persistence query is scoped by it. The id is an opaque
//! value handed in by the identity layer and trusted as-is.
//!
//! `Product.quantity` is the single source of truth for on-hand stock and
//! only ever changes through a ledger-producing operation or a checkout
//! decrement. Batch quantities are a side-ledger for expiry tracking, not
//! a second source of truth.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::alerts::AlertType;
use crate::money::Money;
use crate::movement::MovementType;

// =============================================================================
// Product
// =============================================================================

/// A product in a user's catalog, with its current on-hand quantity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Owning user; every read/write is scoped by this.
    pub user_id: String,

    /// Display name.
    pub name: String,

    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub sku: Option<String>,

    /// On-hand quantity. Invariant: never negative; only changed through
    /// a ledger-producing operation or a checkout decrement.
    pub quantity: i64,

    /// Low-stock threshold; quantity at or below this triggers LOW_STOCK.
    pub low_stock_at: Option<i64>,

    /// Unit price in cents.
    pub price_cents: i64,

    /// Free-text category reference.
    pub category: Option<String>,

    /// Free-text supplier note (the structured links live in
    /// [`ProductSupplier`]).
    pub supplier: Option<String>,

    pub specs: Option<String>,
    pub compatibility: Option<String>,
    pub notes: Option<String>,
    pub image_url: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// True when on-hand stock covers a requested quantity.
    #[inline]
    pub fn has_stock_for(&self, requested: i64) -> bool {
        self.quantity >= requested
    }
}

// =============================================================================
// Stock Movement
// =============================================================================

/// An immutable ledger row recording one quantity change.
///
/// `previous_qty` and `new_qty` are captured at write time and never
/// recomputed later; a movement row is created once, inside the same
/// transaction as the quantity write it describes, and only ever removed
/// by an explicit administrative delete.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct StockMovement {
    pub id: String,
    pub user_id: String,
    pub product_id: String,
    pub supplier_id: Option<String>,
    pub batch_id: Option<String>,

    pub movement_type: MovementType,

    /// Delta magnitude for IN/OUT/RETURN. For ADJUSTMENT: the absolute
    /// target when recorded directly, the |new − previous| delta when
    /// produced by a targeted adjustment.
    pub quantity: i64,
    pub previous_qty: i64,
    pub new_qty: i64,

    pub unit_cost_cents: Option<i64>,
    /// `unit_cost × quantity` when a unit cost was given, else None.
    pub total_cost_cents: Option<i64>,

    pub reference: Option<String>,
    pub reason: Option<String>,
    pub notes: Option<String>,

    /// Actor id recorded for the audit trail.
    pub performed_by: String,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Stock Alert
// =============================================================================

/// A threshold or expiry alert with an acknowledge/resolve lifecycle.
///
/// `acknowledged` and `resolved_at` are orthogonal: an alert can be
/// resolved without being acknowledged and vice versa. Both transitions
/// are one-way.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct StockAlert {
    pub id: String,
    pub user_id: String,
    pub product_id: String,

    pub alert_type: AlertType,
    pub message: String,

    /// Threshold snapshotted when the alert was created.
    pub threshold: Option<i64>,
    /// Quantity (or days-to-expiry) snapshotted when the alert was created.
    pub current_value: Option<i64>,

    pub acknowledged: bool,
    pub acknowledged_by: Option<String>,
    pub acknowledged_at: Option<DateTime<Utc>>,
    pub resolved_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
}

impl StockAlert {
    /// An alert is open until it is resolved.
    #[inline]
    pub fn is_open(&self) -> bool {
        self.resolved_at.is_none()
    }
}

// =============================================================================
// Batch
// =============================================================================

/// A lot of a product tracked for expiry.
///
/// Batch quantities do not feed back into `Product.quantity`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Batch {
    pub id: String,
    pub user_id: String,
    pub product_id: String,

    pub batch_number: String,
    pub quantity: i64,

    /// Invariant: `expires_at > manufactured_at` when both are present.
    pub manufactured_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub received_at: DateTime<Utc>,

    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Supplier
// =============================================================================

/// A supplier a user sources products from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Supplier {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub contact_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Per-product sourcing terms for one supplier.
///
/// At most one link per product carries `is_primary = true`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ProductSupplier {
    pub id: String,
    pub user_id: String,
    pub product_id: String,
    pub supplier_id: String,

    pub supplier_sku: Option<String>,
    pub cost_price_cents: i64,
    pub lead_time_days: Option<i64>,
    pub min_order_qty: Option<i64>,
    pub is_primary: bool,

    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Sale
// =============================================================================

/// A completed checkout.
///
/// Created once as an atomic unit together with its items and the product
/// quantity decrements it causes. Sales do not write StockMovement rows;
/// the Sale/SaleItem pair is their audit trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Sale {
    pub id: String,
    pub user_id: String,

    /// Unique, date-prefixed, per-day sequential: `INV-YYYYMMDD-NNNN`.
    pub invoice_number: String,

    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub payment_method: Option<String>,

    pub subtotal_cents: i64,
    pub discount_cents: i64,
    pub tax_cents: i64,
    pub total_cents: i64,

    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A line item in a sale.
/// Uses the snapshot pattern to freeze product data at time of sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SaleItem {
    pub id: String,
    pub sale_id: String,
    pub product_id: String,

    /// Product name at time of sale (frozen).
    pub product_name: String,
    pub quantity: i64,
    /// Unit price in cents at time of sale (frozen).
    pub unit_price_cents: i64,
    pub discount_cents: i64,

    /// unit_price × quantity.
    pub subtotal_cents: i64,
    /// subtotal − discount.
    pub total_cents: i64,

    pub created_at: DateTime<Utc>,
}

impl SaleItem {
    /// Returns the unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn product_with_quantity(quantity: i64) -> Product {
        let now = Utc::now();
        Product {
            id: "p-1".to_string(),
            user_id: "u-1".to_string(),
            name: "Widget".to_string(),
            manufacturer: None,
            model: None,
            sku: None,
            quantity,
            low_stock_at: Some(5),
            price_cents: 1099,
            category: None,
            supplier: None,
            specs: None,
            compatibility: None,
            notes: None,
            image_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_has_stock_for() {
        let product = product_with_quantity(10);
        assert!(product.has_stock_for(10));
        assert!(product.has_stock_for(1));
        assert!(!product.has_stock_for(11));
    }

    #[test]
    fn test_price_as_money() {
        let product = product_with_quantity(1);
        assert_eq!(product.price(), Money::from_cents(1099));
    }

    #[test]
    fn test_movement_type_serde_wire_format() {
        let json = serde_json::to_string(&MovementType::Adjustment).unwrap();
        assert_eq!(json, "\"ADJUSTMENT\"");

        let parsed: MovementType = serde_json::from_str("\"IN\"").unwrap();
        assert_eq!(parsed, MovementType::In);
    }

    #[test]
    fn test_alert_type_serde_wire_format() {
        let json = serde_json::to_string(&AlertType::LowStock).unwrap();
        assert_eq!(json, "\"LOW_STOCK\"");

        let parsed: AlertType = serde_json::from_str("\"EXPIRING_SOON\"").unwrap();
        assert_eq!(parsed, AlertType::ExpiringSoon);
    }
}
