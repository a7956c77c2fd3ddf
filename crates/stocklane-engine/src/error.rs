//! # Engine Error Types
//!
//! The error taxonomy callers of the engine see. Lower-layer errors are
//! translated upward here:
//!
//! ```text
//! CoreError (rules)   ──┐
//!                       ├──► EngineError
//! DbError (storage)   ──┘
//! ```
//!
//! `InsufficientStock` and `Conflict` get their own variants because
//! callers handle them differently: the first is a user-facing rejection,
//! the second is a retryable lost race.

use thiserror::Error;

use stocklane_core::CoreError;
use stocklane_db::DbError;

/// Errors produced by engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The requested entity does not exist (or is not owned by the caller).
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// The request failed validation before any write happened.
    #[error("Validation failed: {message}")]
    Validation { message: String },

    /// An outbound movement or sale line would drive stock negative.
    #[error("Insufficient stock for product {product_id}: {available} available, {requested} requested")]
    InsufficientStock {
        product_id: String,
        available: i64,
        requested: i64,
    },

    /// The caller did not present a usable identity.
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    /// A concurrent writer changed the same row between read and write.
    /// The operation was rolled back; the caller may retry.
    #[error("Conflict: {message}")]
    Conflict { message: String },

    /// Underlying storage failure.
    #[error("Storage error: {0}")]
    Storage(DbError),
}

impl EngineError {
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        EngineError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        EngineError::Validation {
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        EngineError::Unauthorized {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        EngineError::Conflict {
            message: message.into(),
        }
    }
}

impl From<DbError> for EngineError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => EngineError::NotFound { entity, id },
            DbError::UniqueViolation { field } => EngineError::Conflict {
                message: format!("Duplicate {field}"),
            },
            other => EngineError::Storage(other),
        }
    }
}

impl From<CoreError> for EngineError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InsufficientStock {
                product_id,
                available,
                requested,
            } => EngineError::InsufficientStock {
                product_id,
                available,
                requested,
            },
            other => EngineError::Validation {
                message: other.to_string(),
            },
        }
    }
}

impl From<stocklane_core::ValidationError> for EngineError {
    fn from(err: stocklane_core::ValidationError) -> Self {
        EngineError::Validation {
            message: err.to_string(),
        }
    }
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Rejects a blank caller identity before any work happens.
pub(crate) fn require_user(user_id: &str) -> EngineResult<()> {
    if user_id.trim().is_empty() {
        return Err(EngineError::unauthorized("Missing user id"));
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_not_found_maps_through() {
        let err: EngineError = DbError::not_found("Product", "p-1").into();
        assert!(matches!(err, EngineError::NotFound { .. }));
    }

    #[test]
    fn test_core_insufficient_stock_keeps_detail() {
        let core = CoreError::InsufficientStock {
            product_id: "p-1".to_string(),
            available: 2,
            requested: 5,
        };
        match EngineError::from(core) {
            EngineError::InsufficientStock {
                available,
                requested,
                ..
            } => {
                assert_eq!(available, 2);
                assert_eq!(requested, 5);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_blank_user_is_unauthorized() {
        assert!(matches!(
            require_user("  "),
            Err(EngineError::Unauthorized { .. })
        ));
        assert!(require_user("u-1").is_ok());
    }
}
