//! # Checkout Pricing
//!
//! Pure pricing math for a sale: per-line totals, overall discount, tax.
//!
//! ## Pricing Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Checkout Pricing                                   │
//! │                                                                         │
//! │  per line:  subtotal   = unit_price × quantity                         │
//! │             total      = subtotal − line_discount                      │
//! │                                                                         │
//! │  sale:      subtotal   = Σ line totals                                 │
//! │             discounted = subtotal − overall_discount  (floor 0)        │
//! │             tax        = discounted × tax_rate                         │
//! │             total      = discounted + tax                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All math is integer cents; tax rounding is half away from zero (see
//! [`Money::calculate_tax`]). The engine persists these numbers verbatim.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::{Money, TaxRate};

// =============================================================================
// Inputs
// =============================================================================

/// One cart line as submitted by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleLine {
    pub product_id: String,
    pub quantity: i64,
    /// Unit price in cents. Callers usually pass the product's current
    /// price; the priced line snapshots whatever was given.
    pub unit_price_cents: i64,
    /// Per-line discount in cents.
    pub discount_cents: i64,
}

// =============================================================================
// Outputs
// =============================================================================

/// A line with its computed totals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedLine {
    pub product_id: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub discount: Money,
    pub subtotal: Money,
    pub total: Money,
}

/// Totals for the whole sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaleTotals {
    /// Sum of line totals, before the overall discount.
    pub subtotal: Money,
    pub discount: Money,
    pub tax: Money,
    pub total: Money,
}

/// A fully priced sale, ready to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedSale {
    pub lines: Vec<PricedLine>,
    pub totals: SaleTotals,
}

// =============================================================================
// Pricing
// =============================================================================

/// Prices a cart.
///
/// ## Errors
/// - `EmptySale` when no lines were submitted.
/// - `ValidationError` for a non-positive quantity or negative price or
///   discount on any line.
pub fn price_sale(
    lines: &[SaleLine],
    overall_discount: Money,
    tax_rate: TaxRate,
) -> CoreResult<PricedSale> {
    if lines.is_empty() {
        return Err(CoreError::EmptySale);
    }

    if overall_discount.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: "discount".to_string(),
        }
        .into());
    }

    let mut priced = Vec::with_capacity(lines.len());
    let mut subtotal = Money::zero();

    for line in lines {
        if line.quantity <= 0 {
            return Err(ValidationError::MustBePositive {
                field: "quantity".to_string(),
            }
            .into());
        }
        if line.unit_price_cents < 0 {
            return Err(ValidationError::MustNotBeNegative {
                field: "unit_price".to_string(),
            }
            .into());
        }
        if line.discount_cents < 0 {
            return Err(ValidationError::MustNotBeNegative {
                field: "discount".to_string(),
            }
            .into());
        }

        let unit_price = Money::from_cents(line.unit_price_cents);
        let discount = Money::from_cents(line.discount_cents);
        let line_subtotal = unit_price.multiply_quantity(line.quantity);
        let line_total = line_subtotal - discount;

        subtotal += line_total;

        priced.push(PricedLine {
            product_id: line.product_id.clone(),
            quantity: line.quantity,
            unit_price,
            discount,
            subtotal: line_subtotal,
            total: line_total,
        });
    }

    let discounted = subtotal.saturating_sub_to_zero(overall_discount);
    let tax = discounted.calculate_tax(tax_rate);
    let total = discounted + tax;

    Ok(PricedSale {
        lines: priced,
        totals: SaleTotals {
            subtotal,
            discount: overall_discount,
            tax,
            total,
        },
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn line(product_id: &str, quantity: i64, unit_price_cents: i64, discount_cents: i64) -> SaleLine {
        SaleLine {
            product_id: product_id.to_string(),
            quantity,
            unit_price_cents,
            discount_cents,
        }
    }

    #[test]
    fn test_empty_cart_rejected() {
        let err = price_sale(&[], Money::zero(), TaxRate::zero()).unwrap_err();
        assert!(matches!(err, CoreError::EmptySale));
    }

    #[test]
    fn test_single_line_no_tax() {
        let sale = price_sale(&[line("p-1", 3, 500, 0)], Money::zero(), TaxRate::zero()).unwrap();

        assert_eq!(sale.lines[0].subtotal.cents(), 1500);
        assert_eq!(sale.lines[0].total.cents(), 1500);
        assert_eq!(sale.totals.subtotal.cents(), 1500);
        assert_eq!(sale.totals.tax.cents(), 0);
        assert_eq!(sale.totals.total.cents(), 1500);
    }

    #[test]
    fn test_line_discount_applies_before_sale_subtotal() {
        let sale = price_sale(&[line("p-1", 2, 1000, 300)], Money::zero(), TaxRate::zero()).unwrap();

        assert_eq!(sale.lines[0].subtotal.cents(), 2000);
        assert_eq!(sale.lines[0].total.cents(), 1700);
        assert_eq!(sale.totals.subtotal.cents(), 1700);
    }

    #[test]
    fn test_overall_discount_and_tax() {
        // Two lines: 2×$10 + 1×$5 = $25. Overall discount $5 → $20.
        // Tax 10% on $20 = $2. Total $22.
        let sale = price_sale(
            &[line("p-1", 2, 1000, 0), line("p-2", 1, 500, 0)],
            Money::from_cents(500),
            TaxRate::from_bps(1000),
        )
        .unwrap();

        assert_eq!(sale.totals.subtotal.cents(), 2500);
        assert_eq!(sale.totals.discount.cents(), 500);
        assert_eq!(sale.totals.tax.cents(), 200);
        assert_eq!(sale.totals.total.cents(), 2200);
    }

    #[test]
    fn test_oversized_discount_floors_at_zero() {
        let sale = price_sale(
            &[line("p-1", 1, 500, 0)],
            Money::from_cents(900),
            TaxRate::from_bps(1000),
        )
        .unwrap();

        assert_eq!(sale.totals.tax.cents(), 0);
        assert_eq!(sale.totals.total.cents(), 0);
    }

    #[test]
    fn test_invalid_lines_rejected() {
        assert!(price_sale(&[line("p", 0, 100, 0)], Money::zero(), TaxRate::zero()).is_err());
        assert!(price_sale(&[line("p", 1, -1, 0)], Money::zero(), TaxRate::zero()).is_err());
        assert!(price_sale(&[line("p", 1, 100, -5)], Money::zero(), TaxRate::zero()).is_err());
    }

    #[test]
    fn test_fractional_tax_rate_rounds() {
        // $10.00 at 7.5% = $0.75 exactly; $10.33 at 7.5% = 77.475 → 77
        let exact = price_sale(
            &[line("p", 1, 1000, 0)],
            Money::zero(),
            TaxRate::from_percentage(7.5),
        )
        .unwrap();
        assert_eq!(exact.totals.tax.cents(), 75);

        let rounded = price_sale(
            &[line("p", 1, 1033, 0)],
            Money::zero(),
            TaxRate::from_percentage(7.5),
        )
        .unwrap();
        assert_eq!(rounded.totals.tax.cents(), 77);
    }
}
