//! # Validation Module
//!
//! Input validation utilities for Greenbill.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Decoder                                                      │
//! │  └── Symbology checks (EAN-13, EAN-8, UPC-A, UPC-E, Code 128)          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Scanner Command (Rust)                                       │
//! │  └── THIS MODULE: barcode shape, benchmark, catalog names              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL constraints                                              │
//! │  └── PRIMARY KEY on products.barcode                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use greenbill_core::validation::{validate_barcode, validate_benchmark_points};
//!
//! assert_eq!(validate_barcode(" 5901234123457 ").unwrap(), "5901234123457");
//! assert!(validate_benchmark_points(50).is_ok());
//! ```

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::MAX_QUANTITY;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest barcode accepted. Code 128 payloads are variable length; EAN/UPC
/// are at most 13 digits.
pub const MAX_BARCODE_LEN: usize = 64;

/// Longest product name accepted into the catalog.
pub const MAX_PRODUCT_NAME_LEN: usize = 200;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a decoded barcode and returns it trimmed.
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most [`MAX_BARCODE_LEN`] characters
/// - Printable ASCII only, no inner whitespace
///
/// ## Example
/// ```rust
/// use greenbill_core::validation::validate_barcode;
///
/// assert!(validate_barcode("5901234123457").is_ok());
/// assert!(validate_barcode("").is_err());
/// assert!(validate_barcode("590 123").is_err());
/// ```
pub fn validate_barcode(barcode: &str) -> ValidationResult<String> {
    let barcode = barcode.trim();

    if barcode.is_empty() {
        return Err(ValidationError::Required {
            field: "barcode".to_string(),
        });
    }

    if barcode.len() > MAX_BARCODE_LEN {
        return Err(ValidationError::TooLong {
            field: "barcode".to_string(),
            max: MAX_BARCODE_LEN,
        });
    }

    if !barcode.chars().all(|c| c.is_ascii_graphic()) {
        return Err(ValidationError::InvalidFormat {
            field: "barcode".to_string(),
            reason: "must contain only printable ASCII without spaces".to_string(),
        });
    }

    Ok(barcode.to_string())
}

/// Validates a product name coming from a catalog source.
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.chars().count() > MAX_PRODUCT_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_PRODUCT_NAME_LEN,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates the progress benchmark.
///
/// A non-positive benchmark would divide by zero (or invert the scale), so
/// it is a configuration error rather than a validation error.
pub fn validate_benchmark_points(points: i64) -> CoreResult<()> {
    if points <= 0 {
        return Err(CoreError::config(format!(
            "benchmark greenpoints must be positive, got {}",
            points
        )));
    }

    Ok(())
}

/// Validates a quantity adjustment.
///
/// A delta larger than [`MAX_QUANTITY`] in either direction can never be a
/// real edit.
pub fn validate_quantity_delta(delta: i64) -> ValidationResult<()> {
    if !(-MAX_QUANTITY..=MAX_QUANTITY).contains(&delta) {
        return Err(ValidationError::OutOfRange {
            field: "delta".to_string(),
            min: -MAX_QUANTITY,
            max: MAX_QUANTITY,
        });
    }

    Ok(())
}

/// Error for a line item that would exceed [`MAX_QUANTITY`].
pub(crate) fn quantity_limit() -> ValidationError {
    ValidationError::OutOfRange {
        field: "quantity".to_string(),
        min: 1,
        max: MAX_QUANTITY,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_barcode() {
        assert_eq!(validate_barcode("5901234123457").unwrap(), "5901234123457");
        assert_eq!(validate_barcode("  012345  ").unwrap(), "012345");
        assert!(validate_barcode("CODE-128/ABC").is_ok());

        assert!(validate_barcode("").is_err());
        assert!(validate_barcode("   ").is_err());
        assert!(validate_barcode("590 123").is_err());
        assert!(validate_barcode("5901\t23").is_err());
        assert!(validate_barcode("código").is_err());
        assert!(validate_barcode(&"9".repeat(65)).is_err());
        assert!(validate_barcode(&"9".repeat(64)).is_ok());
    }

    #[test]
    fn test_validate_product_name() {
        assert!(validate_product_name("Oat Milk 1L").is_ok());
        assert!(validate_product_name("").is_err());
        assert!(validate_product_name(&"A".repeat(201)).is_err());
    }

    #[test]
    fn test_validate_benchmark_points() {
        assert!(validate_benchmark_points(1).is_ok());
        assert!(validate_benchmark_points(50).is_ok());
        assert!(matches!(
            validate_benchmark_points(0),
            Err(CoreError::Config { .. })
        ));
        assert!(validate_benchmark_points(-10).is_err());
    }

    #[test]
    fn test_validate_quantity_delta() {
        assert!(validate_quantity_delta(1).is_ok());
        assert!(validate_quantity_delta(-1).is_ok());
        assert!(validate_quantity_delta(MAX_QUANTITY).is_ok());
        assert!(validate_quantity_delta(-MAX_QUANTITY).is_ok());

        assert!(matches!(
            validate_quantity_delta(MAX_QUANTITY + 1),
            Err(ValidationError::OutOfRange { .. })
        ));
        assert!(validate_quantity_delta(i64::MAX).is_err());
        assert!(validate_quantity_delta(i64::MIN + 1).is_err());
        assert!(validate_quantity_delta(i64::MIN).is_err());
    }
}
