//! # Repository Module
//!
//! Database repository implementations for Stocklane.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  The Repository pattern abstracts database access behind a clean API.  │
//! │                                                                         │
//! │  Engine Service                                                        │
//! │       │                                                                 │
//! │       │  db.products().find_by_id(user_id, id)                         │
//! │       │  ↓                                                              │
//! │       ▼                                                                 │
//! │  ProductRepository                                                     │
//! │  ├── find_by_id(&self, user_id, id)                                    │
//! │  ├── insert(&self, product)                                            │
//! │  ├── update(&self, product)                                            │
//! │  └── compare_and_swap_quantity(&self, conn, ...)                       │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Benefits:                                                              │
//! │  • Clean separation of concerns                                        │
//! │  • SQL is isolated in one place                                        │
//! │  • Write paths expose *_tx variants the engine composes into one       │
//! │    transaction                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`product::ProductRepository`] - Catalog CRUD and quantity CAS
//! - [`movement::StockMovementRepository`] - Append-only stock ledger
//! - [`alert::StockAlertRepository`] - Alert lifecycle
//! - [`batch::BatchRepository`] - Received batches and expiry reads
//! - [`supplier::SupplierRepository`] - Suppliers and product links
//! - [`sale::SaleRepository`] - Sales, items, invoice numbering

pub mod alert;
pub mod batch;
pub mod movement;
pub mod product;
pub mod sale;
pub mod supplier;
