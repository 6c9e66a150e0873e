//! # Error Types
//!
//! Domain-specific error types for greenbill-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  greenbill-core errors (this file)                                     │
//! │  ├── CoreError        - Bill engine failures                           │
//! │  ├── LookupError      - Catalog misses / outages                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  greenbill-db errors (separate crate)                                  │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  Scanner app errors                                                    │
//! │  └── ApiError         - What the frontend sees (serialized)            │
//! │                                                                         │
//! │  Flow: LookupError/ValidationError → CoreError → ApiError → Frontend   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Guarantees
//! Every engine operation is all-or-nothing. When one of these errors is
//! returned the bill is exactly as it was before the call.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Bill engine errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A mutation was attempted on a bill that has been ended.
    ///
    /// ## When This Occurs
    /// - Scanning after "End Bill" was pressed
    /// - Changing quantities in the results modal
    /// - Ending the same bill twice
    #[error("Bill {bill_id} is closed, start a new bill first")]
    InactiveBill { bill_id: String },

    /// Ending or exporting a bill with no items.
    #[error("Bill has no items, add at least one item first")]
    EmptyBill,

    /// The product catalog could not resolve a barcode.
    #[error(transparent)]
    Lookup(#[from] LookupError),

    /// Configuration value is unusable (e.g. a non-positive benchmark).
    #[error("Invalid configuration: {reason}")]
    Config { reason: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates an InactiveBill error for the given bill.
    pub fn inactive(bill_id: impl Into<String>) -> Self {
        CoreError::InactiveBill {
            bill_id: bill_id.into(),
        }
    }

    /// Creates a Config error.
    pub fn config(reason: impl Into<String>) -> Self {
        CoreError::Config {
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Lookup Error
// =============================================================================

/// Product catalog lookup failures.
///
/// Returned by catalog implementations and surfaced to the caller once.
/// The engine never retries a lookup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    /// No product is registered for this barcode.
    #[error("Product not found for barcode {0}")]
    NotFound(String),

    /// The catalog could not be reached or failed internally.
    #[error("Product catalog unavailable: {0}")]
    Unavailable(String),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Used for early validation before engine logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., whitespace inside a barcode).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Numeric value outside the accepted range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::inactive("bill-1");
        assert_eq!(
            err.to_string(),
            "Bill bill-1 is closed, start a new bill first"
        );

        let err: CoreError = LookupError::NotFound("5901234123457".to_string()).into();
        assert_eq!(
            err.to_string(),
            "Product not found for barcode 5901234123457"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "barcode".to_string(),
        };
        assert_eq!(err.to_string(), "barcode is required");

        let err = ValidationError::TooLong {
            field: "name".to_string(),
            max: 200,
        };
        assert_eq!(err.to_string(), "name must be at most 200 characters");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "barcode".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
