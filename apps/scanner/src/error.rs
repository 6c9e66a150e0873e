//! # API Error Type
//!
//! Unified error type for scanner commands.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Greenbill                              │
//! │                                                                         │
//! │  Command Function ── Result<T, ApiError>                               │
//! │         │                                                               │
//! │         ├── CoreError::InactiveBill ─────────► INACTIVE_BILL           │
//! │         ├── CoreError::EmptyBill ────────────► EMPTY_BILL              │
//! │         ├── CoreError::Lookup(NotFound) ─────► NOT_FOUND               │
//! │         ├── CoreError::Lookup(Unavailable) ──► CATALOG_UNAVAILABLE     │
//! │         ├── DbError::* ──────────────────────► DATABASE_ERROR          │
//! │         ├── ConfigError ─────────────────────► CONFIG_ERROR            │
//! │         └── decoder returned nothing ────────► NO_BARCODE              │
//! │                                                                         │
//! │  UI receives: { "code": "NOT_FOUND", "message": "Product not found…" } │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every error leaves the bill exactly as it was. Nothing is retried.

use serde::Serialize;

use crate::state::ConfigError;
use greenbill_core::{CoreError, LookupError};
use greenbill_db::DbError;

/// Error returned from scanner commands.
///
/// ## Serialization
/// ```json
/// {
///   "code": "INACTIVE_BILL",
///   "message": "Bill 6f1c… has ended; start a new bill"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,
}

/// Error codes for command responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Barcode not in the catalog, or archive entry missing
    NotFound,

    /// Mutation attempted on an ended bill
    InactiveBill,

    /// End/export attempted on a bill with no items
    EmptyBill,

    /// No bill has been started
    NoActiveBill,

    /// Save attempted before the bill was ended
    BillStillOpen,

    /// The decoder found no barcode in the image
    NoBarcode,

    /// The catalog backend could not answer
    CatalogUnavailable,

    /// Input validation failed
    ValidationError,

    /// Configuration is invalid
    ConfigError,

    /// Database operation failed
    DatabaseError,

    /// Export file could not be written
    ExportFailed,

    /// Internal error
    Internal,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    pub fn no_active_bill() -> Self {
        ApiError::new(
            ErrorCode::NoActiveBill,
            "No bill in progress; start a new bill first",
        )
    }

    pub fn bill_still_open(bill_id: &str) -> Self {
        ApiError::new(
            ErrorCode::BillStillOpen,
            format!("Bill {} is still open; end it before saving", bill_id),
        )
    }

    pub fn no_barcode() -> Self {
        ApiError::new(ErrorCode::NoBarcode, "No barcode found in image")
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn export_failed(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ExportFailed, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InactiveBill { bill_id } => ApiError::new(
                ErrorCode::InactiveBill,
                format!("Bill {} has ended; start a new bill", bill_id),
            ),
            CoreError::EmptyBill => {
                ApiError::new(ErrorCode::EmptyBill, "The bill has no items")
            }
            CoreError::Lookup(LookupError::NotFound(barcode)) => {
                ApiError::not_found("Product", &barcode)
            }
            CoreError::Lookup(LookupError::Unavailable(reason)) => {
                tracing::error!("Catalog unavailable: {}", reason);
                ApiError::new(
                    ErrorCode::CatalogUnavailable,
                    "Product catalog is unavailable",
                )
            }
            CoreError::Config { reason } => ApiError::new(ErrorCode::ConfigError, reason),
            CoreError::Validation(e) => ApiError::validation(e.to_string()),
        }
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { value, .. } => ApiError::new(
                ErrorCode::ValidationError,
                format!("Bill '{}' has already been saved", value),
            ),
            DbError::ConstraintViolation(e) => {
                tracing::error!("Constraint violation: {}", e);
                ApiError::validation("Bill could not be stored")
            }
            DbError::ConnectionFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::PoolExhausted => {
                ApiError::new(ErrorCode::DatabaseError, "Database pool exhausted")
            }
            DbError::QueryFailed(e) | DbError::Serialization(e) | DbError::Internal(e) => {
                // Log the actual error but return a generic message
                tracing::error!("Database operation failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        ApiError::new(ErrorCode::ConfigError, err.to_string())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}
