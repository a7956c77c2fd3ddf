//! # Analytics Service
//!
//! Read-only rollups for dashboards. Everything here is a thin pass over
//! repository aggregate queries; no state changes.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{require_user, EngineResult};
use stocklane_db::repository::movement::{MovementTotalRow, ProductVolumeRow};
use stocklane_db::repository::sale::TopSellerRow;
use stocklane_db::Database;

/// One dashboard payload: stock position plus open-alert pressure.
#[derive(Debug, Clone, Serialize)]
pub struct InventorySummary {
    pub total_products: i64,
    pub total_units: i64,
    /// Σ quantity × price over the catalog, in cents.
    pub stock_value_cents: i64,
    pub low_stock_count: i64,
    pub out_of_stock_count: i64,
    pub unacknowledged_alerts: i64,
}

/// Sales over a date range.
#[derive(Debug, Clone, Serialize)]
pub struct SalesSummary {
    pub sale_count: i64,
    pub revenue_cents: i64,
}

/// Service for read-only reporting.
#[derive(Debug, Clone)]
pub struct AnalyticsService {
    db: Database,
}

impl AnalyticsService {
    pub fn new(db: Database) -> Self {
        AnalyticsService { db }
    }

    pub async fn inventory_summary(&self, user_id: &str) -> EngineResult<InventorySummary> {
        require_user(user_id)?;

        let row = self.db.products().inventory_summary(user_id).await?;
        let unacknowledged_alerts = self.db.alerts().unacknowledged_count(user_id).await?;

        Ok(InventorySummary {
            total_products: row.total_products,
            total_units: row.total_units,
            stock_value_cents: row.stock_value_cents,
            low_stock_count: row.low_stock_count,
            out_of_stock_count: row.out_of_stock_count,
            unacknowledged_alerts,
        })
    }

    /// Movement quantity and count per movement type over a range.
    pub async fn movement_totals(
        &self,
        user_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> EngineResult<Vec<MovementTotalRow>> {
        require_user(user_id)?;
        Ok(self.db.movements().totals_by_type(user_id, from, to).await?)
    }

    /// Products with the highest ledger volume.
    pub async fn top_products_by_volume(
        &self,
        user_id: &str,
        limit: u32,
    ) -> EngineResult<Vec<ProductVolumeRow>> {
        require_user(user_id)?;
        Ok(self.db.movements().top_products_by_volume(user_id, limit).await?)
    }

    /// Sale count and revenue over a range.
    pub async fn sales_summary(
        &self,
        user_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> EngineResult<SalesSummary> {
        require_user(user_id)?;

        let row = self.db.sales().sales_summary(user_id, from, to).await?;
        Ok(SalesSummary {
            sale_count: row.sale_count,
            revenue_cents: row.revenue_cents,
        })
    }

    /// Best sellers by units over a range.
    pub async fn top_sellers(
        &self,
        user_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        limit: u32,
    ) -> EngineResult<Vec<TopSellerRow>> {
        require_user(user_id)?;
        Ok(self.db.sales().top_sellers(user_id, from, to, limit).await?)
    }
}
