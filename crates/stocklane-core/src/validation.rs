//! # Validation Module
//!
//! Input validation utilities for Stocklane.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Caller (UI/action layer)                                     │
//! │  └── Shape validation, immediate user feedback                         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Engine operations                                            │
//! │  └── THIS MODULE: business rule validation                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  └── NOT NULL, UNIQUE, CHECK (quantity >= 0), foreign keys             │
//! │                                                                         │
//! │  Defense in depth: multiple layers catch different errors              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};

use crate::error::ValidationError;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a product name.
///
/// ## Rules
/// - Must not be empty after trimming
/// - Must be at most 200 characters
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    validate_required_text("name", name, 200)
}

/// Validates a batch number.
pub fn validate_batch_number(batch_number: &str) -> ValidationResult<()> {
    validate_required_text("batch_number", batch_number, 100)
}

/// Validates a supplier name.
pub fn validate_supplier_name(name: &str) -> ValidationResult<()> {
    validate_required_text("name", name, 200)
}

fn validate_required_text(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.len() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a price/cost in cents (zero allowed).
pub fn validate_price_cents(field: &str, cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates a positive quantity (batch sizes, cart lines).
pub fn validate_positive_quantity(quantity: i64) -> ValidationResult<()> {
    if quantity <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }
    Ok(())
}

/// Validates an absolute stock target (zero allowed).
pub fn validate_stock_target(target: i64) -> ValidationResult<()> {
    if target < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "new_quantity".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Date Validators
// =============================================================================

/// Validates batch dates: `expires_at > manufactured_at` when both given.
pub fn validate_batch_dates(
    manufactured_at: Option<DateTime<Utc>>,
    expires_at: Option<DateTime<Utc>>,
) -> ValidationResult<()> {
    if let (Some(manufactured), Some(expires)) = (manufactured_at, expires_at) {
        if expires <= manufactured {
            return Err(ValidationError::Invalid {
                field: "expires_at".to_string(),
                reason: "must be after manufactured_at".to_string(),
            });
        }
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
