//! # stocklane-engine: Core Operations for Stocklane
//!
//! The transactional business layer. Callers (a UI action layer, an HTTP
//! surface, a CLI) construct services over one [`Database`] handle and
//! invoke operations with an explicit `user_id` — there is no ambient
//! session state anywhere in the engine.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Stocklane Engine                                  │
//! │                                                                         │
//! │  Caller (UI action / API handler)                                      │
//! │       │   explicit user_id + request payload                           │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                stocklane-engine (THIS CRATE)                    │   │
//! │  │                                                                 │   │
//! │  │   LedgerService      every quantity change = ledger row +      │   │
//! │  │                      CAS update + threshold check, one tx      │   │
//! │  │   CheckoutService    sale + items + decrements, one tx         │   │
//! │  │   AlertService       threshold/expiry alerts, ack/resolve      │   │
//! │  │   BatchService       batches + immediate expiry check          │   │
//! │  │   SupplierService    suppliers + atomic primary flip           │   │
//! │  │   ProductService     catalog CRUD (quantity via ledger only)   │   │
//! │  │   AnalyticsService   read-only rollups                         │   │
//! │  └────────────┬───────────────────────────┬────────────────────────┘   │
//! │               │ rules                     │ SQL                        │
//! │               ▼                           ▼                            │
//! │        stocklane-core              stocklane-db                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## The Consistency Rule
//!
//! `products.quantity` only changes together with its justification: a
//! StockMovement row (ledger paths) or a Sale/SaleItem pair (checkout),
//! in the same transaction, guarded by a compare-and-swap so concurrent
//! writers cannot interleave. A `CHECK (quantity >= 0)` in the schema
//! backstops the transition table.
//!
//! [`Database`]: stocklane_db::Database

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod services;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{EngineError, EngineResult};

pub use services::alerts::AlertService;
pub use services::analytics::{AnalyticsService, InventorySummary, SalesSummary};
pub use services::batches::{BatchService, CreateBatch, CreatedBatch};
pub use services::checkout::{CheckoutReceipt, CheckoutService, CreateSale, SaleDetails};
pub use services::ledger::{AdjustToQuantity, LedgerService, RecordMovement};
pub use services::products::{CreateProduct, ProductService, UpdateProduct};
pub use services::suppliers::{CreateSupplier, LinkProductToSupplier, SupplierService};
