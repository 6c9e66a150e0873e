//! # Bill Engine
//!
//! The active bill and its lifecycle transitions.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Bill Lifecycle                                  │
//! │                                                                         │
//! │   start()                                                               │
//! │      │                                                                  │
//! │      ▼                                                                  │
//! │  ┌──────────────┐  add_or_increment  ┌──────────────────┐              │
//! │  │ Empty/Active │───────────────────►│ Populated/Active │◄──┐          │
//! │  └──────────────┘                    └──────────────────┘   │          │
//! │         ▲                              │   │   │            │          │
//! │         │            clear()           │   │   └────────────┘          │
//! │         └──────────────────────────────┘   │   change_quantity /       │
//! │                                            │   remove / scan again     │
//! │                                      end() │                           │
//! │                                            ▼                           │
//! │                                  ┌──────────────────┐                  │
//! │                                  │ Populated/Closed │  (immutable)     │
//! │                                  └──────────────────┘                  │
//! │                                                                         │
//! │  No transition leads from Closed back to Active: start a new bill.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## All-or-Nothing
//! Every fallible operation validates first and mutates last, so an error
//! always leaves the bill untouched.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::summary::{round_div, BillSummary, SummaryBlock, SummaryItem};
use crate::types::{BillTotals, LineItem, ProductInfo, Progress, ProgressTier};
use crate::validation::{quantity_limit, validate_benchmark_points};
use crate::MAX_QUANTITY;

/// Result of [`Bill::change_quantity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QuantityChange {
    /// The item now has this quantity.
    Updated { quantity: i64 },
    /// The quantity dropped below 1 and the item was removed.
    Removed,
    /// No item with that barcode is on the bill; nothing changed.
    NotInBill,
}

/// A shopper's bill.
///
/// ## Invariants
/// - At most one [`LineItem`] per barcode
/// - Every quantity is between 1 and [`MAX_QUANTITY`]
/// - Totals are never stored; [`Bill::totals`] recomputes them
///
/// Serialize-only: a bill is built through [`Bill::start`] and its
/// mutators, never from outside data.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Bill {
    id: String,
    items: Vec<LineItem>,
    active: bool,
    #[ts(as = "String")]
    started_at: DateTime<Utc>,
    #[ts(as = "Option<String>")]
    ended_at: Option<DateTime<Utc>>,
}

impl Bill {
    /// Starts a new, empty, active bill.
    pub fn start() -> Self {
        Bill {
            id: Uuid::new_v4().to_string(),
            items: Vec::new(),
            active: true,
            started_at: Utc::now(),
            ended_at: None,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Line items in scan order.
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Looks up a line item by barcode.
    pub fn item(&self, barcode: &str) -> Option<&LineItem> {
        self.items.iter().find(|i| i.barcode == barcode)
    }

    pub fn contains(&self, barcode: &str) -> bool {
        self.item(barcode).is_some()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.ended_at
    }

    fn ensure_active(&self) -> CoreResult<()> {
        if self.active {
            Ok(())
        } else {
            Err(CoreError::inactive(&self.id))
        }
    }

    fn position(&self, barcode: &str) -> Option<usize> {
        self.items.iter().position(|i| i.barcode == barcode)
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    /// Adds one unit of `barcode` to the bill.
    ///
    /// ## Behavior
    /// - Barcode already on the bill: quantity += 1, `lookup` is not called
    /// - New barcode: `lookup` resolves the product, the item is scored from
    ///   its grade and appended with quantity 1
    ///
    /// ## Errors
    /// - [`CoreError::InactiveBill`] if the bill was ended (checked before lookup)
    /// - [`CoreError::Validation`] if the item is already at [`MAX_QUANTITY`]
    /// - Whatever `lookup` returns, typically [`CoreError::Lookup`]
    ///
    /// ## Returns
    /// The line item after the change.
    pub fn add_or_increment<F>(&mut self, barcode: &str, lookup: F) -> CoreResult<&LineItem>
    where
        F: FnOnce(&str) -> CoreResult<ProductInfo>,
    {
        self.ensure_active()?;

        if let Some(idx) = self.position(barcode) {
            if self.items[idx].quantity >= MAX_QUANTITY {
                return Err(quantity_limit().into());
            }
            self.items[idx].quantity += 1;
            return Ok(&self.items[idx]);
        }

        let product = lookup(barcode)?;
        self.items.push(LineItem::from_product(barcode, product));

        let last = self.items.len() - 1;
        Ok(&self.items[last])
    }

    /// Adds `delta` to an item's quantity.
    ///
    /// An item whose quantity would fall below 1 is removed rather than
    /// clamped. An unknown barcode is a no-op reported as
    /// [`QuantityChange::NotInBill`]. A result above [`MAX_QUANTITY`] is
    /// rejected and the item keeps its quantity.
    pub fn change_quantity(&mut self, barcode: &str, delta: i64) -> CoreResult<QuantityChange> {
        self.ensure_active()?;

        let Some(idx) = self.position(barcode) else {
            return Ok(QuantityChange::NotInBill);
        };

        let quantity = self.items[idx].quantity.saturating_add(delta);
        if quantity > MAX_QUANTITY {
            return Err(quantity_limit().into());
        }
        if quantity < 1 {
            self.items.remove(idx);
            return Ok(QuantityChange::Removed);
        }

        self.items[idx].quantity = quantity;
        Ok(QuantityChange::Updated { quantity })
    }

    /// Removes an item. Returns whether anything was removed.
    pub fn remove(&mut self, barcode: &str) -> CoreResult<bool> {
        self.ensure_active()?;

        let before = self.items.len();
        self.items.retain(|i| i.barcode != barcode);
        Ok(self.items.len() != before)
    }

    /// Empties the bill. It stays active.
    pub fn clear(&mut self) -> CoreResult<()> {
        self.ensure_active()?;
        self.items.clear();
        Ok(())
    }

    /// Closes the bill and returns its summary.
    ///
    /// Items are kept so the caller can still save or export after ending.
    ///
    /// ## Errors
    /// - [`CoreError::InactiveBill`] if already ended
    /// - [`CoreError::EmptyBill`] if there are no items
    pub fn end(&mut self) -> CoreResult<BillSummary> {
        self.ensure_active()?;

        let ended_at = Utc::now();
        let summary = self.export_snapshot_at(ended_at)?;

        self.active = false;
        self.ended_at = Some(ended_at);
        Ok(summary)
    }

    // =========================================================================
    // Derived Values
    // =========================================================================

    /// Item count, carbon and points recomputed from the items.
    pub fn totals(&self) -> BillTotals {
        self.items
            .iter()
            .fold(BillTotals::default(), |acc, item| BillTotals {
                item_count: acc.item_count.saturating_add(item.quantity),
                total_carbon: acc.total_carbon.saturating_add(item.subtotal_carbon()),
                total_points: acc.total_points.saturating_add(item.subtotal_points()),
            })
    }

    /// Greenpoints progress against `benchmark_points`.
    ///
    /// ## Formula
    /// ```text
    /// raw        = current / benchmark × 100
    /// percentage = min(raw, 100)
    /// tier       = classify(raw)      ← unclamped
    /// ```
    ///
    /// ## Errors
    /// [`CoreError::Config`] if `benchmark_points <= 0`.
    pub fn progress(&self, benchmark_points: i64) -> CoreResult<Progress> {
        validate_benchmark_points(benchmark_points)?;

        let current_points = self.totals().total_points;
        let raw_percentage = current_points as f64 / benchmark_points as f64 * 100.0;

        Ok(Progress {
            current_points,
            benchmark_points,
            percentage: raw_percentage.min(100.0),
            raw_percentage,
            tier: ProgressTier::classify(raw_percentage),
        })
    }

    /// Builds the serializable snapshot, timestamped now.
    ///
    /// ## Errors
    /// [`CoreError::EmptyBill`] if the bill has no items.
    pub fn export_snapshot(&self) -> CoreResult<BillSummary> {
        self.export_snapshot_at(Utc::now())
    }

    /// Builds the serializable snapshot with an explicit timestamp.
    pub fn export_snapshot_at(&self, timestamp: DateTime<Utc>) -> CoreResult<BillSummary> {
        let totals = self.totals();
        if totals.item_count == 0 {
            return Err(CoreError::EmptyBill);
        }

        Ok(BillSummary {
            bill_id: self.id.clone(),
            timestamp,
            summary: SummaryBlock {
                total_items: totals.item_count,
                total_carbon_footprint: totals.total_carbon,
                total_greenpoints: totals.total_points,
                average_carbon_per_item: round_div(totals.total_carbon, totals.item_count),
            },
            items: self.items.iter().map(SummaryItem::from).collect(),
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
