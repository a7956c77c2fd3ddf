//! # Alert Rules
//!
//! Pure decision rules for stock alerts. The engine evaluates these after
//! every quantity change (threshold rule) and over batch rows (expiry rule)
//! and persists whatever they return.
//!
//! ## No Deduplication, No Auto-Resolution
//! Every threshold crossing and every sweep produces a fresh alert row.
//! Stock recovering above threshold never resolves anything by itself;
//! acknowledge/resolve are explicit caller actions. This is the documented
//! contract, not an oversight.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Days before expiry at which a batch starts alerting.
pub const EXPIRY_WARNING_DAYS: i64 = 30;

// =============================================================================
// Alert Type
// =============================================================================

/// The kind of condition a stock alert records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertType {
    /// Quantity fell to or below the product's low-stock threshold.
    LowStock,
    /// Quantity reached zero.
    OutOfStock,
    /// A batch expires within [`EXPIRY_WARNING_DAYS`].
    ExpiringSoon,
    /// A batch's expiry date has passed.
    Expired,
}

impl fmt::Display for AlertType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AlertType::LowStock => "LOW_STOCK",
            AlertType::OutOfStock => "OUT_OF_STOCK",
            AlertType::ExpiringSoon => "EXPIRING_SOON",
            AlertType::Expired => "EXPIRED",
        };
        f.write_str(s)
    }
}

// =============================================================================
// Threshold Rule
// =============================================================================

/// Outcome of a threshold evaluation: the alert to create, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThresholdAlert {
    pub alert_type: AlertType,
    pub message: String,
    /// The low-stock threshold snapshotted at evaluation time.
    pub threshold: Option<i64>,
    /// The quantity snapshotted at evaluation time.
    pub current_value: i64,
}

/// Evaluates the low-stock/out-of-stock rule for a quantity change.
///
/// ## Rule
/// ```text
/// current_qty == 0                          → OUT_OF_STOCK
/// low_stock_at set && qty <= low_stock_at   → LOW_STOCK
/// otherwise                                 → no alert
/// ```
///
/// Called once per quantity change. Repeat crossings produce repeat
/// alerts; deduplication is intentionally not performed here or anywhere.
pub fn threshold_alert(current_qty: i64, low_stock_at: Option<i64>) -> Option<ThresholdAlert> {
    if current_qty == 0 {
        return Some(ThresholdAlert {
            alert_type: AlertType::OutOfStock,
            message: "Product is out of stock".to_string(),
            threshold: low_stock_at,
            current_value: 0,
        });
    }

    match low_stock_at {
        Some(threshold) if current_qty <= threshold => Some(ThresholdAlert {
            alert_type: AlertType::LowStock,
            message: format!(
                "Stock is low: {current_qty} remaining (threshold {threshold})"
            ),
            threshold: Some(threshold),
            current_value: current_qty,
        }),
        _ => None,
    }
}

// =============================================================================
// Expiry Rule
// =============================================================================

/// Outcome of an expiry evaluation for one batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpiryAlert {
    pub alert_type: AlertType,
    pub message: String,
    /// Days until expiry (may be negative once expired).
    pub days_until_expiry: i64,
}

/// Evaluates the expiry rule for a batch against a clock instant.
///
/// ## Rule
/// ```text
/// 0 < days_until_expiry <= 30  → EXPIRING_SOON
/// days_until_expiry <= 0       → EXPIRED
/// otherwise                    → no alert
/// ```
///
/// `now` is passed in rather than read from the system clock so the rule
/// stays deterministic and testable.
pub fn expiry_alert(
    batch_number: &str,
    expires_at: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Option<ExpiryAlert> {
    let days = (expires_at.date_naive() - now.date_naive()).num_days();

    if days <= 0 {
        return Some(ExpiryAlert {
            alert_type: AlertType::Expired,
            message: format!("Batch {batch_number} has expired"),
            days_until_expiry: days,
        });
    }

    if days <= EXPIRY_WARNING_DAYS {
        return Some(ExpiryAlert {
            alert_type: AlertType::ExpiringSoon,
            message: format!("Batch {batch_number} expires in {days} days"),
            days_until_expiry: days,
        });
    }

    None
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_out_of_stock_beats_low_stock() {
        let alert = threshold_alert(0, Some(5)).unwrap();
        assert_eq!(alert.alert_type, AlertType::OutOfStock);
        assert_eq!(alert.message, "Product is out of stock");
        assert_eq!(alert.current_value, 0);
    }

    #[test]
    fn test_out_of_stock_without_threshold() {
        let alert = threshold_alert(0, None).unwrap();
        assert_eq!(alert.alert_type, AlertType::OutOfStock);
        assert_eq!(alert.threshold, None);
    }

    #[test]
    fn test_low_stock_at_and_below_threshold() {
        let at = threshold_alert(5, Some(5)).unwrap();
        assert_eq!(at.alert_type, AlertType::LowStock);
        assert_eq!(at.current_value, 5);
        assert_eq!(at.threshold, Some(5));

        let below = threshold_alert(4, Some(5)).unwrap();
        assert_eq!(below.alert_type, AlertType::LowStock);
        assert_eq!(below.current_value, 4);
    }

    #[test]
    fn test_no_alert_above_threshold() {
        assert!(threshold_alert(6, Some(5)).is_none());
        assert!(threshold_alert(100, None).is_none());
    }

    #[test]
    fn test_expiring_soon_window() {
        let now = Utc::now();

        let in_20_days = expiry_alert("B-1", now + Duration::days(20), now).unwrap();
        assert_eq!(in_20_days.alert_type, AlertType::ExpiringSoon);
        assert_eq!(in_20_days.days_until_expiry, 20);

        let in_30_days = expiry_alert("B-1", now + Duration::days(30), now).unwrap();
        assert_eq!(in_30_days.alert_type, AlertType::ExpiringSoon);

        assert!(expiry_alert("B-1", now + Duration::days(31), now).is_none());
    }

    #[test]
    fn test_expired() {
        let now = Utc::now();

        let today = expiry_alert("B-2", now, now).unwrap();
        assert_eq!(today.alert_type, AlertType::Expired);
        assert_eq!(today.days_until_expiry, 0);

        let last_week = expiry_alert("B-2", now - Duration::days(7), now).unwrap();
        assert_eq!(last_week.alert_type, AlertType::Expired);
        assert_eq!(last_week.days_until_expiry, -7);
    }

    #[test]
    fn test_display_matches_wire_names() {
        assert_eq!(AlertType::LowStock.to_string(), "LOW_STOCK");
        assert_eq!(AlertType::OutOfStock.to_string(), "OUT_OF_STOCK");
        assert_eq!(AlertType::ExpiringSoon.to_string(), "EXPIRING_SOON");
        assert_eq!(AlertType::Expired.to_string(), "EXPIRED");
    }
}
