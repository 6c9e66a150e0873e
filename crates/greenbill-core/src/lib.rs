//! # greenbill-core: Pure Bill Engine for Greenbill
//!
//! This crate is the **heart** of Greenbill. It owns the bill data model and
//! every transition rule as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Greenbill Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Scanner Frontend                             │   │
//! │  │    Camera/Upload ──► Bill List ──► Progress Ring ──► Results   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    Scanner Commands                             │   │
//! │  │    scan_barcode, update_quantity, end_bill, save_bill, etc.    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ greenbill-core (THIS CRATE) ★                   │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   bill    │  │  summary  │  │ validation│  │   │
//! │  │   │ EcoGrade  │  │   Bill    │  │  Export   │  │   rules   │  │   │
//! │  │   │ LineItem  │  │ Progress  │  │  format   │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (EcoGrade, ProductInfo, LineItem, Progress)
//! - [`bill`] - The bill and its lifecycle transitions
//! - [`summary`] - Serializable bill snapshot (export format)
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Example Usage
//!
//! ```rust
//! use greenbill_core::{Bill, EcoGrade, ProductInfo, ProgressTier};
//!
//! let mut bill = Bill::start();
//! bill.add_or_increment("111", |_| Ok(ProductInfo::new("Oat Milk", EcoGrade::A)))
//!     .unwrap();
//! bill.add_or_increment("222", |_| Ok(ProductInfo::new("Cheddar", EcoGrade::C)))
//!     .unwrap();
//! bill.add_or_increment("111", |_| unreachable!("already in bill")).unwrap();
//!
//! let totals = bill.totals();
//! assert_eq!(totals.item_count, 3);
//! assert_eq!(totals.total_carbon, 70);
//! assert_eq!(totals.total_points, 115);
//!
//! let progress = bill.progress(50).unwrap();
//! assert_eq!(progress.percentage, 100.0);
//! assert_eq!(progress.tier, ProgressTier::High);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod bill;
pub mod error;
pub mod summary;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use bill::{Bill, QuantityChange};
pub use error::{CoreError, CoreResult, LookupError, ValidationError};
pub use summary::{BillSummary, SummaryBlock, SummaryItem};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Greenpoints collected by an average customer in one bill.
///
/// Used as the default progress benchmark. The scanner app can override it
/// through configuration.
pub const AVG_CUSTOMER_GREENPOINTS: i64 = 50;

/// Largest quantity a single line item can reach.
///
/// Keeps every subtotal and total well inside `i64`.
pub const MAX_QUANTITY: i64 = 9_999;

/// Carbon per unit (grams CO2e) for a grade the tables do not recognise.
pub const DEFAULT_UNIT_CARBON: i64 = 50;

/// Greenpoints per unit for a grade the tables do not recognise.
pub const DEFAULT_UNIT_POINTS: i64 = 10;
