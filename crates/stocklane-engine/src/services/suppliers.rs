//! # Supplier Service
//!
//! Supplier CRUD and the product-supplier link table.
//!
//! Linking with `is_primary` clears every other primary for the product
//! with a single UPDATE and inserts the new link on the same transaction,
//! so at most one primary link per product is observable at any point.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{require_user, EngineError, EngineResult};
use stocklane_core::{validation, ProductSupplier, Supplier};
use stocklane_db::repository::supplier::{generate_link_id, generate_supplier_id};
use stocklane_db::Database;

// =============================================================================
// Requests
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSupplier {
    pub name: String,
    pub contact_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkProductToSupplier {
    pub product_id: String,
    pub supplier_id: String,
    pub supplier_sku: Option<String>,
    pub cost_price_cents: i64,
    pub lead_time_days: Option<i64>,
    pub min_order_qty: Option<i64>,
    pub is_primary: bool,
}

// =============================================================================
// Service
// =============================================================================

/// Service for suppliers and sourcing links.
#[derive(Debug, Clone)]
pub struct SupplierService {
    db: Database,
}

impl SupplierService {
    pub fn new(db: Database) -> Self {
        SupplierService { db }
    }

    // =========================================================================
    // Supplier CRUD
    // =========================================================================

    pub async fn create_supplier(
        &self,
        user_id: &str,
        request: CreateSupplier,
    ) -> EngineResult<Supplier> {
        require_user(user_id)?;
        validation::validate_supplier_name(&request.name)?;

        let now = Utc::now();
        let supplier = Supplier {
            id: generate_supplier_id(),
            user_id: user_id.to_string(),
            name: request.name,
            contact_name: request.contact_name,
            email: request.email,
            phone: request.phone,
            address: request.address,
            notes: request.notes,
            created_at: now,
            updated_at: now,
        };

        self.db.suppliers().insert(&supplier).await?;

        debug!(supplier_id = %supplier.id, name = %supplier.name, "Supplier created");
        Ok(supplier)
    }

    pub async fn supplier(&self, user_id: &str, id: &str) -> EngineResult<Supplier> {
        require_user(user_id)?;
        self.db
            .suppliers()
            .find_by_id(user_id, id)
            .await?
            .ok_or_else(|| EngineError::not_found("Supplier", id))
    }

    pub async fn list_suppliers(&self, user_id: &str) -> EngineResult<Vec<Supplier>> {
        require_user(user_id)?;
        Ok(self.db.suppliers().list_by_user(user_id).await?)
    }

    pub async fn update_supplier(&self, user_id: &str, supplier: &Supplier) -> EngineResult<()> {
        require_user(user_id)?;
        if supplier.user_id != user_id {
            return Err(EngineError::not_found("Supplier", &supplier.id));
        }
        validation::validate_supplier_name(&supplier.name)?;
        Ok(self.db.suppliers().update(supplier).await?)
    }

    pub async fn delete_supplier(&self, user_id: &str, id: &str) -> EngineResult<()> {
        require_user(user_id)?;
        Ok(self.db.suppliers().delete(user_id, id).await?)
    }

    // =========================================================================
    // Product-Supplier Links
    // =========================================================================

    /// Links a product to a supplier. When `is_primary`, the flip to the
    /// new primary is atomic with the insert.
    pub async fn link_product_to_supplier(
        &self,
        user_id: &str,
        request: LinkProductToSupplier,
    ) -> EngineResult<ProductSupplier> {
        require_user(user_id)?;
        validation::validate_price_cents("cost_price", request.cost_price_cents)?;

        // both ends must exist and belong to the caller
        self.db
            .products()
            .find_by_id(user_id, &request.product_id)
            .await?
            .ok_or_else(|| EngineError::not_found("Product", &request.product_id))?;
        self.db
            .suppliers()
            .find_by_id(user_id, &request.supplier_id)
            .await?
            .ok_or_else(|| EngineError::not_found("Supplier", &request.supplier_id))?;

        let link = ProductSupplier {
            id: generate_link_id(),
            user_id: user_id.to_string(),
            product_id: request.product_id.clone(),
            supplier_id: request.supplier_id.clone(),
            supplier_sku: request.supplier_sku,
            cost_price_cents: request.cost_price_cents,
            lead_time_days: request.lead_time_days,
            min_order_qty: request.min_order_qty,
            is_primary: request.is_primary,
            created_at: Utc::now(),
        };

        let mut tx = self.db.pool().begin().await.map_err(stocklane_db::DbError::from)?;

        if link.is_primary {
            self.db
                .suppliers()
                .clear_primary_tx(&mut tx, user_id, &link.product_id)
                .await?;
        }
        self.db.suppliers().insert_link_tx(&mut tx, &link).await?;

        tx.commit().await.map_err(stocklane_db::DbError::from)?;

        info!(
            product_id = %link.product_id,
            supplier_id = %link.supplier_id,
            is_primary = link.is_primary,
            "Product linked to supplier"
        );

        Ok(link)
    }

    pub async fn unlink_product_from_supplier(
        &self,
        user_id: &str,
        product_id: &str,
        supplier_id: &str,
    ) -> EngineResult<()> {
        require_user(user_id)?;
        Ok(self
            .db
            .suppliers()
            .delete_link(user_id, product_id, supplier_id)
            .await?)
    }

    pub async fn links_for_product(
        &self,
        user_id: &str,
        product_id: &str,
    ) -> EngineResult<Vec<ProductSupplier>> {
        require_user(user_id)?;
        Ok(self
            .db
            .suppliers()
            .find_links_by_product(user_id, product_id)
            .await?)
    }
}
