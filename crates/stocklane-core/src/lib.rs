//! # stocklane-core: Pure Business Logic for Stocklane
//!
//! This crate is the **heart** of Stocklane. It contains all business rules
//! as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stocklane Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 UI / Action Layer (out of scope)                │   │
//! │  │    shape-validates input ──► calls one engine operation        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    stocklane-engine                             │   │
//! │  │    ledger, alerts, batches, checkout, suppliers, analytics     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ stocklane-core (THIS CRATE) ★                   │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │ movement  │  │  alerts   │  │ checkout  │  │   │
//! │  │   │  Product  │  │ IN/OUT/.. │  │ threshold │  │  pricing  │  │   │
//! │  │   │  Movement │  │   table   │  │  expiry   │  │   math    │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    stocklane-db (Database Layer)                │   │
//! │  │              SQLite queries, migrations, repositories           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, StockMovement, StockAlert, ...)
//! - [`movement`] - The movement-type transition table
//! - [`alerts`] - Threshold and expiry alert rules
//! - [`checkout`] - Sale pricing math
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64) to avoid float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use stocklane_core::movement::MovementType;
//! use stocklane_core::alerts::threshold_alert;
//!
//! // Apply the transition table
//! let new_qty = MovementType::Out.apply("product-1", 10, 6).unwrap();
//! assert_eq!(new_qty, 4);
//!
//! // Evaluate the low-stock rule on the outcome
//! let alert = threshold_alert(new_qty, Some(5)).unwrap();
//! assert_eq!(alert.current_value, 4);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod alerts;
pub mod checkout;
pub mod error;
pub mod money;
pub mod movement;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use stocklane_core::Money` instead of
// `use stocklane_core::money::Money`

pub use alerts::{expiry_alert, threshold_alert, AlertType, ExpiryAlert, ThresholdAlert};
pub use checkout::{price_sale, PricedLine, PricedSale, SaleLine, SaleTotals};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::{Money, TaxRate};
pub use movement::MovementType;
pub use types::*;
