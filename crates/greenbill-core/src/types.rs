//! # Domain Types
//!
//! Core domain types used throughout Greenbill.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    EcoGrade     │   │   ProductInfo   │   │    LineItem     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  A (best)       │   │  name           │   │  barcode (key)  │       │
//! │  │  B, C, D        │──►│  grade          │──►│  quantity ≥ 1   │       │
//! │  │  E (worst)      │   │                 │   │  unit_carbon    │       │
//! │  │  Unknown        │   │                 │   │  unit_points    │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   BillTotals    │   │    Progress     │   │  ProgressTier   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  item_count     │   │  current_points │   │  None  (= 0%)   │       │
//! │  │  total_carbon   │   │  percentage     │   │  Low   (< 40%)  │       │
//! │  │  total_points   │   │  tier           │   │  Medium(< 100%) │       │
//! │  └─────────────────┘   └─────────────────┘   │  High  (≥ 100%) │       │
//! │                                              └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Frozen Scores
//! `unit_carbon` and `unit_points` are derived from the grade once, when the
//! line item is created. Later catalog changes never rewrite an open bill.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::{DEFAULT_UNIT_CARBON, DEFAULT_UNIT_POINTS};

// =============================================================================
// Eco Grade
// =============================================================================

/// Ordinal eco-grade of a product, `A` best.
///
/// `Unknown` holds any grade label the tables do not recognise (catalogs in
/// the wild also return things like "not-applicable"). It scores with the
/// table defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "UPPERCASE")]
pub enum EcoGrade {
    A,
    B,
    C,
    D,
    E,
    Unknown,
}

impl EcoGrade {
    /// Grams CO2e per unit.
    ///
    /// ```text
    /// A:10  B:30  C:50  D:75  E:100  (unknown: 50)
    /// ```
    pub const fn unit_carbon(&self) -> i64 {
        match self {
            EcoGrade::A => 10,
            EcoGrade::B => 30,
            EcoGrade::C => 50,
            EcoGrade::D => 75,
            EcoGrade::E => 100,
            EcoGrade::Unknown => DEFAULT_UNIT_CARBON,
        }
    }

    /// Greenpoints awarded per unit.
    ///
    /// ```text
    /// A:50  B:30  C:15  D:5  E:0  (unknown: 10)
    /// ```
    pub const fn unit_points(&self) -> i64 {
        match self {
            EcoGrade::A => 50,
            EcoGrade::B => 30,
            EcoGrade::C => 15,
            EcoGrade::D => 5,
            EcoGrade::E => 0,
            EcoGrade::Unknown => DEFAULT_UNIT_POINTS,
        }
    }

    /// Parses a catalog grade label, falling back to `Unknown`.
    ///
    /// Never fails: unrecognised labels are a scoring concern, not an error.
    pub fn parse_lenient(label: &str) -> Self {
        label.parse().unwrap_or(EcoGrade::Unknown)
    }
}

impl fmt::Display for EcoGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EcoGrade::A => write!(f, "A"),
            EcoGrade::B => write!(f, "B"),
            EcoGrade::C => write!(f, "C"),
            EcoGrade::D => write!(f, "D"),
            EcoGrade::E => write!(f, "E"),
            EcoGrade::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

impl FromStr for EcoGrade {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A" => Ok(EcoGrade::A),
            "B" => Ok(EcoGrade::B),
            "C" => Ok(EcoGrade::C),
            "D" => Ok(EcoGrade::D),
            "E" => Ok(EcoGrade::E),
            "UNKNOWN" => Ok(EcoGrade::Unknown),
            other => Err(format!("Unknown eco-grade: '{}'", other)),
        }
    }
}

// =============================================================================
// Carbon Band
// =============================================================================

/// Display classification of an item's per-unit carbon.
///
/// The bill list colours each row by this band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum CarbonBand {
    /// Under 30 g per unit.
    Low,
    /// 30 g to under 60 g per unit.
    Medium,
    /// 60 g and above.
    High,
}

impl CarbonBand {
    /// Classifies a per-unit carbon value.
    pub const fn from_unit_carbon(grams: i64) -> Self {
        if grams < 30 {
            CarbonBand::Low
        } else if grams < 60 {
            CarbonBand::Medium
        } else {
            CarbonBand::High
        }
    }
}

// =============================================================================
// Product Info
// =============================================================================

/// Product metadata returned by a catalog lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ProductInfo {
    /// Display name.
    pub name: String,

    /// Eco-grade used to derive carbon and points.
    pub grade: EcoGrade,
}

impl ProductInfo {
    pub fn new(name: impl Into<String>, grade: EcoGrade) -> Self {
        ProductInfo {
            name: name.into(),
            grade,
        }
    }
}

// =============================================================================
// Line Item
// =============================================================================

/// One product on a bill.
///
/// ## Invariants
/// - `quantity >= 1` (an item that would drop below 1 is removed)
/// - `unit_carbon` / `unit_points` are frozen at insertion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    /// Barcode, the item's key within a bill.
    pub barcode: String,

    /// Product name at time of scanning (frozen).
    pub name: String,

    /// Eco-grade at time of scanning (frozen).
    pub grade: EcoGrade,

    /// Number of units scanned.
    pub quantity: i64,

    /// Grams CO2e per unit.
    pub unit_carbon: i64,

    /// Greenpoints per unit.
    pub unit_points: i64,

    /// When the first unit was scanned.
    #[ts(as = "String")]
    pub added_at: DateTime<Utc>,
}

impl LineItem {
    /// Creates a line item with quantity 1, scoring it from the grade tables.
    pub fn from_product(barcode: impl Into<String>, product: ProductInfo) -> Self {
        LineItem {
            barcode: barcode.into(),
            unit_carbon: product.grade.unit_carbon(),
            unit_points: product.grade.unit_points(),
            name: product.name,
            grade: product.grade,
            quantity: 1,
            added_at: Utc::now(),
        }
    }

    /// Carbon for all units of this item.
    #[inline]
    pub fn subtotal_carbon(&self) -> i64 {
        self.unit_carbon * self.quantity
    }

    /// Greenpoints for all units of this item.
    #[inline]
    pub fn subtotal_points(&self) -> i64 {
        self.unit_points * self.quantity
    }

    /// Display band of this item's per-unit carbon.
    #[inline]
    pub fn carbon_band(&self) -> CarbonBand {
        CarbonBand::from_unit_carbon(self.unit_carbon)
    }
}

// =============================================================================
// Totals
// =============================================================================

/// Aggregates recomputed from a bill's items on every call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BillTotals {
    /// Sum of quantities.
    pub item_count: i64,

    /// Sum of `unit_carbon × quantity`, grams CO2e.
    pub total_carbon: i64,

    /// Sum of `unit_points × quantity`.
    pub total_points: i64,
}

// =============================================================================
// Progress
// =============================================================================

/// Progress classification against the benchmark.
///
/// Classified from the *unclamped* ratio, so a bill far above the benchmark
/// is still `High`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ProgressTier {
    /// Exactly 0%.
    None,
    /// Above 0% and below 40%.
    Low,
    /// 40% up to (not including) 100%.
    Medium,
    /// 100% and above.
    High,
}

impl ProgressTier {
    /// Classifies an unclamped percentage.
    pub fn classify(raw_percentage: f64) -> Self {
        if raw_percentage <= 0.0 {
            ProgressTier::None
        } else if raw_percentage < 40.0 {
            ProgressTier::Low
        } else if raw_percentage < 100.0 {
            ProgressTier::Medium
        } else {
            ProgressTier::High
        }
    }
}

/// Greenpoints progress against the average-customer benchmark.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    /// Greenpoints on the bill.
    pub current_points: i64,

    /// Benchmark the bill is scored against.
    pub benchmark_points: i64,

    /// `current / benchmark × 100`, clamped to 100.
    pub percentage: f64,

    /// Same ratio without the clamp.
    pub raw_percentage: f64,

    /// Tier of the unclamped ratio.
    pub tier: ProgressTier,
}

// =============================================================================
// Unit Tests
// =============================================================================
