//! # Product Service
//!
//! Catalog CRUD. Quantity is deliberately absent from the update surface:
//! every quantity change delegates to [`LedgerService`] so no write can
//! bypass the ledger.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{require_user, EngineError, EngineResult};
use crate::services::ledger::{AdjustToQuantity, LedgerService};
use stocklane_core::{validation, Product, StockMovement};
use stocklane_db::repository::product::generate_product_id;
use stocklane_db::Database;

// =============================================================================
// Requests
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProduct {
    pub name: String,
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub sku: Option<String>,
    /// Opening stock. Recorded directly on the row; subsequent changes
    /// go through the ledger.
    pub quantity: i64,
    pub low_stock_at: Option<i64>,
    pub price_cents: i64,
    pub category: Option<String>,
    pub supplier: Option<String>,
    pub specs: Option<String>,
    pub compatibility: Option<String>,
    pub notes: Option<String>,
    pub image_url: Option<String>,
}

/// Catalog fields that may change after creation. `None` keeps the
/// current value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProduct {
    pub name: Option<String>,
    pub manufacturer: Option<Option<String>>,
    pub model: Option<Option<String>>,
    pub sku: Option<Option<String>>,
    pub low_stock_at: Option<Option<i64>>,
    pub price_cents: Option<i64>,
    pub category: Option<Option<String>>,
    pub supplier: Option<Option<String>>,
    pub specs: Option<Option<String>>,
    pub compatibility: Option<Option<String>>,
    pub notes: Option<Option<String>>,
    pub image_url: Option<Option<String>>,
}

// =============================================================================
// Service
// =============================================================================

/// Service for the product catalog.
#[derive(Debug, Clone)]
pub struct ProductService {
    db: Database,
    ledger: LedgerService,
}

impl ProductService {
    pub fn new(db: Database) -> Self {
        let ledger = LedgerService::new(db.clone());
        ProductService { db, ledger }
    }

    pub async fn create_product(
        &self,
        user_id: &str,
        request: CreateProduct,
    ) -> EngineResult<Product> {
        require_user(user_id)?;

        validation::validate_product_name(&request.name)?;
        validation::validate_price_cents("price", request.price_cents)?;
        validation::validate_stock_target(request.quantity)?;

        let now = Utc::now();
        let product = Product {
            id: generate_product_id(),
            user_id: user_id.to_string(),
            name: request.name,
            manufacturer: request.manufacturer,
            model: request.model,
            sku: request.sku,
            quantity: request.quantity,
            low_stock_at: request.low_stock_at,
            price_cents: request.price_cents,
            category: request.category,
            supplier: request.supplier,
            specs: request.specs,
            compatibility: request.compatibility,
            notes: request.notes,
            image_url: request.image_url,
            created_at: now,
            updated_at: now,
        };

        self.db.products().insert(&product).await?;

        debug!(product_id = %product.id, name = %product.name, "Product created");
        Ok(product)
    }

    pub async fn product(&self, user_id: &str, id: &str) -> EngineResult<Product> {
        require_user(user_id)?;
        self.db
            .products()
            .find_by_id(user_id, id)
            .await?
            .ok_or_else(|| EngineError::not_found("Product", id))
    }

    pub async fn list_products(&self, user_id: &str) -> EngineResult<Vec<Product>> {
        require_user(user_id)?;
        Ok(self.db.products().list_by_user(user_id).await?)
    }

    /// Applies a partial catalog update. Quantity is not part of the
    /// surface; use [`Self::adjust_stock`].
    pub async fn update_product(
        &self,
        user_id: &str,
        id: &str,
        request: UpdateProduct,
    ) -> EngineResult<Product> {
        require_user(user_id)?;

        let mut product = self
            .db
            .products()
            .find_by_id(user_id, id)
            .await?
            .ok_or_else(|| EngineError::not_found("Product", id))?;

        if let Some(name) = request.name {
            validation::validate_product_name(&name)?;
            product.name = name;
        }
        if let Some(price_cents) = request.price_cents {
            validation::validate_price_cents("price", price_cents)?;
            product.price_cents = price_cents;
        }
        if let Some(manufacturer) = request.manufacturer {
            product.manufacturer = manufacturer;
        }
        if let Some(model) = request.model {
            product.model = model;
        }
        if let Some(sku) = request.sku {
            product.sku = sku;
        }
        if let Some(low_stock_at) = request.low_stock_at {
            product.low_stock_at = low_stock_at;
        }
        if let Some(category) = request.category {
            product.category = category;
        }
        if let Some(supplier) = request.supplier {
            product.supplier = supplier;
        }
        if let Some(specs) = request.specs {
            product.specs = specs;
        }
        if let Some(compatibility) = request.compatibility {
            product.compatibility = compatibility;
        }
        if let Some(notes) = request.notes {
            product.notes = notes;
        }
        if let Some(image_url) = request.image_url {
            product.image_url = image_url;
        }

        self.db.products().update(&product).await?;

        // re-read so updated_at reflects what was written
        self.product(user_id, id).await
    }

    /// Sets a product's quantity via the ledger. Always produces an
    /// ADJUSTMENT movement row.
    pub async fn adjust_stock(
        &self,
        user_id: &str,
        performed_by: &str,
        product_id: &str,
        new_quantity: i64,
        reason: Option<String>,
    ) -> EngineResult<StockMovement> {
        self.ledger
            .adjust_to_quantity(
                user_id,
                performed_by,
                AdjustToQuantity {
                    product_id: product_id.to_string(),
                    new_quantity,
                    reason,
                    notes: None,
                },
            )
            .await
    }

    pub async fn delete_product(&self, user_id: &str, id: &str) -> EngineResult<()> {
        require_user(user_id)?;
        Ok(self.db.products().delete(user_id, id).await?)
    }
}
