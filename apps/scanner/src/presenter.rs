//! # Presenter
//!
//! The view model the UI draws from, and the trait through which the bill
//! state pushes it out after every change.
//!
//! ## Screen Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │   ╭───────╮   115 / 50 greenpoints                                     │
//! │  │  ring   │  "⭐ WOW! You're above average! …"                         │
//! │   ╰───────╯                                                             │
//! │  ───────────────────────────────────────────────────────────────────── │
//! │  Oat Milk      Barcode: 111 | Grade: A   ×2   20 g   100 pts   [low]   │
//! │  Cheddar       Barcode: 222 | Grade: C   ×1   50 g    15 pts   [med]   │
//! │  ───────────────────────────────────────────────────────────────────── │
//! │  Items: 3      Carbon: 70 g CO2e      Greenpoints: 115                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Rendering is stateless: a [`BillView`] is rebuilt from the bill each time.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::f64::consts::PI;
use tracing::{debug, info};

use greenbill_core::{Bill, BillTotals, CarbonBand, CoreResult, EcoGrade, LineItem, Progress};

/// Radius of the progress ring, in SVG user units.
pub const PROGRESS_RING_RADIUS: f64 = 65.0;

// =============================================================================
// Presenter Trait
// =============================================================================

/// Receives a fresh view after every successful bill change.
///
/// Implementations must be cheap; they run while the bill lock is held so
/// views arrive in the order the changes happened.
pub trait Presenter: Send + Sync {
    /// Draws the current bill.
    fn render(&self, view: &BillView);

    /// Returns the screen to its idle state (no bill).
    fn reset(&self);
}

/// Presenter that draws nothing (headless use and tests).
pub struct NoOpPresenter;

impl Presenter for NoOpPresenter {
    fn render(&self, _view: &BillView) {}
    fn reset(&self) {}
}

/// Presenter that writes each view to the log.
pub struct LogPresenter;

impl Presenter for LogPresenter {
    fn render(&self, view: &BillView) {
        info!(
            bill_id = %view.bill_id,
            active = view.active,
            items = view.totals.item_count,
            carbon = view.totals.total_carbon,
            points = view.totals.total_points,
            percentage = view.progress.percentage,
            "{}",
            view.encouragement.message
        );
        for item in &view.items {
            debug!(
                barcode = %item.barcode,
                grade = %item.grade,
                quantity = item.quantity,
                band = ?item.carbon_band,
                "  {}",
                item.name
            );
        }
    }

    fn reset(&self) {
        info!("Scanner idle");
    }
}

// =============================================================================
// View Model
// =============================================================================

/// Everything the UI needs to draw one bill.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BillView {
    pub bill_id: String,
    pub active: bool,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub items: Vec<ItemView>,
    pub totals: BillTotals,
    pub progress: Progress,
    pub encouragement: Encouragement,
    pub ring: ProgressRing,
}

impl BillView {
    /// Builds the view of `bill` scored against `benchmark_points`.
    pub fn build(bill: &Bill, benchmark_points: i64) -> CoreResult<Self> {
        let progress = bill.progress(benchmark_points)?;

        Ok(BillView {
            bill_id: bill.id().to_string(),
            active: bill.is_active(),
            started_at: bill.started_at(),
            ended_at: bill.ended_at(),
            items: bill.items().iter().map(ItemView::from).collect(),
            totals: bill.totals(),
            encouragement: Encouragement::for_points(progress.current_points, benchmark_points),
            ring: ProgressRing::for_percentage(progress.percentage),
            progress,
        })
    }
}

/// One row of the bill list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemView {
    pub barcode: String,
    pub name: String,
    pub grade: EcoGrade,
    pub quantity: i64,
    pub unit_carbon: i64,
    pub unit_points: i64,
    pub subtotal_carbon: i64,
    pub subtotal_points: i64,
    pub carbon_band: CarbonBand,
}

impl From<&LineItem> for ItemView {
    fn from(item: &LineItem) -> Self {
        ItemView {
            barcode: item.barcode.clone(),
            name: item.name.clone(),
            grade: item.grade,
            quantity: item.quantity,
            unit_carbon: item.unit_carbon,
            unit_points: item.unit_points,
            subtotal_carbon: item.subtotal_carbon(),
            subtotal_points: item.subtotal_points(),
            carbon_band: item.carbon_band(),
        }
    }
}

// =============================================================================
// Progress Ring
// =============================================================================

/// SVG circle geometry for the progress ring.
///
/// ```text
/// circumference = 2π × 65
/// dash_offset   = circumference × (1 − percentage / 100)
/// ```
/// `dash_offset == circumference` draws an empty ring, `0` a full one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRing {
    pub radius: f64,
    pub circumference: f64,
    pub dash_offset: f64,
}

impl ProgressRing {
    /// Geometry for a clamped percentage (0..=100).
    pub fn for_percentage(percentage: f64) -> Self {
        let circumference = 2.0 * PI * PROGRESS_RING_RADIUS;
        let filled = percentage.clamp(0.0, 100.0) / 100.0;

        ProgressRing {
            radius: PROGRESS_RING_RADIUS,
            circumference,
            dash_offset: circumference - filled * circumference,
        }
    }
}

// =============================================================================
// Encouragement
// =============================================================================

/// Which encouragement band the bill falls into.
///
/// Bands use the unclamped ratio, so "reached" and "above" stay distinct
/// even though the ring is full for both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EncouragementLevel {
    /// 0 points.
    Idle,
    /// Under 40%.
    KeepScanning,
    /// 40% to under 70%.
    GoodProgress,
    /// 70% to under 100%.
    AlmostThere,
    /// Exactly the benchmark.
    ReachedAverage,
    /// Above the benchmark.
    AboveAverage,
}

impl EncouragementLevel {
    /// Classifies `points` against `benchmark` (must be positive).
    ///
    /// Compares in integers so the "exactly 100%" band is exact.
    pub fn classify(points: i64, benchmark: i64) -> Self {
        let scaled = points.saturating_mul(100);

        if points <= 0 {
            EncouragementLevel::Idle
        } else if scaled < benchmark.saturating_mul(40) {
            EncouragementLevel::KeepScanning
        } else if scaled < benchmark.saturating_mul(70) {
            EncouragementLevel::GoodProgress
        } else if points < benchmark {
            EncouragementLevel::AlmostThere
        } else if points == benchmark {
            EncouragementLevel::ReachedAverage
        } else {
            EncouragementLevel::AboveAverage
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            EncouragementLevel::Idle => "🌱 Click \"Start New Bill\" to begin scanning",
            EncouragementLevel::KeepScanning => {
                "💪 Keep scanning! Try eco-friendly options for more points!"
            }
            EncouragementLevel::GoodProgress => "🌿 Good progress! You're building a greener cart!",
            EncouragementLevel::AlmostThere => {
                "🌟 Excellent! You're almost at the average eco-shopper!"
            }
            EncouragementLevel::ReachedAverage => {
                "🏆 AMAZING! You've reached the average! You're an eco-champion!"
            }
            EncouragementLevel::AboveAverage => {
                "⭐ WOW! You're above average! Inspire others to shop green!"
            }
        }
    }
}

/// Message shown under the ring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Encouragement {
    pub level: EncouragementLevel,
    pub message: String,
}

impl Encouragement {
    pub fn for_points(points: i64, benchmark: i64) -> Self {
        let level = EncouragementLevel::classify(points, benchmark);
        Encouragement {
            level,
            message: level.message().to_string(),
        }
    }
}
