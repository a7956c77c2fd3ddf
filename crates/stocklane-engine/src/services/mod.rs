//! # Engine Services
//!
//! One service per operational area, each a thin struct over [`Database`]
//! composing pure stocklane-core rules with repository writes under
//! transactions.
//!
//! ## Available Services
//!
//! - [`ledger::LedgerService`] - Stock movements and targeted adjustments
//! - [`alerts::AlertService`] - Alert creation and lifecycle
//! - [`batches::BatchService`] - Batch registration and expiry
//! - [`checkout::CheckoutService`] - Atomic sale creation
//! - [`suppliers::SupplierService`] - Suppliers and sourcing links
//! - [`products::ProductService`] - Catalog CRUD
//! - [`analytics::AnalyticsService`] - Read-only rollups
//!
//! [`Database`]: stocklane_db::Database

pub mod alerts;
pub mod analytics;
pub mod batches;
pub mod checkout;
pub mod ledger;
pub mod products;
pub mod suppliers;
