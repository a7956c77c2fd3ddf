//! # Movement Transition Table
//!
//! The closed set of movement types and the single place their
//! quantity-delta rules live.
//!
//! ## The Transition Table
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │   type        │ meaning of `quantity`  │ new_qty                        │
//! │  ─────────────┼────────────────────────┼─────────────────────────────   │
//! │   IN          │ units received         │ previous + quantity            │
//! │   RETURN      │ units returned         │ previous + quantity            │
//! │   OUT         │ units removed          │ previous - quantity            │
//! │               │                        │ (fails if result < 0)          │
//! │   ADJUSTMENT  │ ABSOLUTE target qty    │ quantity                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## The ADJUSTMENT Asymmetry
//! For IN/OUT/RETURN the `quantity` field is a delta magnitude. For
//! ADJUSTMENT it is the absolute target quantity. This asymmetry is a
//! deliberate part of the ledger contract and must be preserved: an
//! adjustment row records "the count became N", not "the count moved by N".
//!
//! Centralizing the table here keeps every call site (direct movements,
//! target adjustments, audits over historical rows) on one rule set.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CoreError, CoreResult, ValidationError};

// =============================================================================
// Movement Type
// =============================================================================

/// The type of a stock movement, stored on every ledger row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MovementType {
    /// Stock received (purchase, restock).
    In,
    /// Stock removed (damage, shrinkage, manual issue).
    Out,
    /// Stock counted and set to an absolute target.
    Adjustment,
    /// Stock returned by a customer.
    Return,
}

impl MovementType {
    /// Applies this movement's quantity rule to a previous quantity.
    ///
    /// ## Errors
    /// - `InsufficientStock` when an OUT movement would drive the
    ///   quantity negative. The caller must abort without writing.
    ///
    /// ## Example
    /// ```rust
    /// use stocklane_core::movement::MovementType;
    ///
    /// assert_eq!(MovementType::In.apply("p", 10, 5).unwrap(), 15);
    /// assert_eq!(MovementType::Out.apply("p", 10, 6).unwrap(), 4);
    /// assert_eq!(MovementType::Adjustment.apply("p", 7, 0).unwrap(), 0);
    /// assert!(MovementType::Out.apply("p", 10, 11).is_err());
    /// ```
    pub fn apply(self, product_id: &str, previous: i64, quantity: i64) -> CoreResult<i64> {
        match self {
            MovementType::In | MovementType::Return => Ok(previous + quantity),
            MovementType::Out => {
                let new = previous - quantity;
                if new < 0 {
                    return Err(CoreError::InsufficientStock {
                        product_id: product_id.to_string(),
                        available: previous,
                        requested: quantity,
                    });
                }
                Ok(new)
            }
            // Input is the absolute target quantity, not a delta.
            MovementType::Adjustment => Ok(quantity),
        }
    }

    /// Validates the `quantity` input for this movement type.
    ///
    /// IN/OUT/RETURN carry a positive delta magnitude; ADJUSTMENT carries
    /// a non-negative absolute target (zero means "counted down to none").
    pub fn validate_quantity(self, quantity: i64) -> CoreResult<()> {
        match self {
            MovementType::In | MovementType::Out | MovementType::Return => {
                if quantity <= 0 {
                    return Err(ValidationError::MustBePositive {
                        field: "quantity".to_string(),
                    }
                    .into());
                }
            }
            MovementType::Adjustment => {
                if quantity < 0 {
                    return Err(ValidationError::MustNotBeNegative {
                        field: "quantity".to_string(),
                    }
                    .into());
                }
            }
        }
        Ok(())
    }

    /// True when this type adds stock.
    #[inline]
    pub const fn is_inbound(self) -> bool {
        matches!(self, MovementType::In | MovementType::Return)
    }
}

impl fmt::Display for MovementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MovementType::In => "IN",
            MovementType::Out => "OUT",
            MovementType::Adjustment => "ADJUSTMENT",
            MovementType::Return => "RETURN",
        };
        f.write_str(s)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_and_return_add() {
        assert_eq!(MovementType::In.apply("p", 10, 5).unwrap(), 15);
        assert_eq!(MovementType::Return.apply("p", 0, 3).unwrap(), 3);
    }

    #[test]
    fn test_out_subtracts() {
        assert_eq!(MovementType::Out.apply("p", 10, 6).unwrap(), 4);
        assert_eq!(MovementType::Out.apply("p", 10, 10).unwrap(), 0);
    }

    #[test]
    fn test_out_rejects_negative_result() {
        let err = MovementType::Out.apply("p-9", 10, 11).unwrap_err();
        match err {
            CoreError::InsufficientStock {
                product_id,
                available,
                requested,
            } => {
                assert_eq!(product_id, "p-9");
                assert_eq!(available, 10);
                assert_eq!(requested, 11);
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }
    }

    #[test]
    fn test_adjustment_is_absolute_target() {
        // quantity is the target, independent of previous
        assert_eq!(MovementType::Adjustment.apply("p", 7, 0).unwrap(), 0);
        assert_eq!(MovementType::Adjustment.apply("p", 7, 100).unwrap(), 100);
    }

    #[test]
    fn test_quantity_validation() {
        assert!(MovementType::In.validate_quantity(1).is_ok());
        assert!(MovementType::In.validate_quantity(0).is_err());
        assert!(MovementType::Out.validate_quantity(-2).is_err());
        // zero is a valid adjustment target (counted down to none)
        assert!(MovementType::Adjustment.validate_quantity(0).is_ok());
        assert!(MovementType::Adjustment.validate_quantity(-1).is_err());
    }

    #[test]
    fn test_ledger_consistency_signed_effect() {
        // For every type: new - previous equals the signed effect the
        // type implies (ADJUSTMENT excepted, where new IS the input).
        for qty in [1i64, 5, 40] {
            let prev = 50i64;
            assert_eq!(MovementType::In.apply("p", prev, qty).unwrap() - prev, qty);
            assert_eq!(
                MovementType::Return.apply("p", prev, qty).unwrap() - prev,
                qty
            );
            assert_eq!(
                MovementType::Out.apply("p", prev, qty).unwrap() - prev,
                -qty
            );
            assert_eq!(MovementType::Adjustment.apply("p", prev, qty).unwrap(), qty);
        }
    }

    #[test]
    fn test_display_matches_wire_names() {
        assert_eq!(MovementType::In.to_string(), "IN");
        assert_eq!(MovementType::Out.to_string(), "OUT");
        assert_eq!(MovementType::Adjustment.to_string(), "ADJUSTMENT");
        assert_eq!(MovementType::Return.to_string(), "RETURN");
    }
}
