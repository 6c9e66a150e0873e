//! # Bill Summary
//!
//! The serializable snapshot of a bill, used for the results modal, the
//! saved-bill archive and the JSON export file.
//!
//! ## Export Format
//! ```json
//! {
//!   "billId": "6f1c…",
//!   "timestamp": "2026-10-18T09:30:00Z",
//!   "summary": {
//!     "totalItems": 3,
//!     "totalCarbonFootprint": 70,
//!     "totalGreenpoints": 115,
//!     "averageCarbonPerItem": 23
//!   },
//!   "items": [
//!     { "barcode": "111", "itemName": "Oat Milk", "quantity": 2, "grade": "A",
//!       "carbonFootprint": 10, "pointsAwarded": 50,
//!       "subtotalCarbon": 20, "subtotalPoints": 100 }
//!   ]
//! }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::types::{EcoGrade, LineItem};

/// A finalized (or exported) bill snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BillSummary {
    /// Bill the snapshot was taken from.
    pub bill_id: String,

    /// When the snapshot was taken.
    #[ts(as = "String")]
    pub timestamp: DateTime<Utc>,

    /// Aggregates.
    pub summary: SummaryBlock,

    /// One entry per line item, in scan order.
    pub items: Vec<SummaryItem>,
}

/// Aggregate block of a [`BillSummary`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SummaryBlock {
    pub total_items: i64,
    pub total_carbon_footprint: i64,
    pub total_greenpoints: i64,
    /// `round(total_carbon / total_items)`, halves rounded up.
    pub average_carbon_per_item: i64,
}

/// One line of a [`BillSummary`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SummaryItem {
    pub barcode: String,
    pub item_name: String,
    pub quantity: i64,
    pub grade: EcoGrade,
    /// Grams CO2e per unit.
    pub carbon_footprint: i64,
    /// Greenpoints per unit.
    pub points_awarded: i64,
    pub subtotal_carbon: i64,
    pub subtotal_points: i64,
}

impl From<&LineItem> for SummaryItem {
    fn from(item: &LineItem) -> Self {
        SummaryItem {
            barcode: item.barcode.clone(),
            item_name: item.name.clone(),
            quantity: item.quantity,
            grade: item.grade,
            carbon_footprint: item.unit_carbon,
            points_awarded: item.unit_points,
            subtotal_carbon: item.subtotal_carbon(),
            subtotal_points: item.subtotal_points(),
        }
    }
}

impl BillSummary {
    /// Serializes the snapshot as indented JSON (the export file body).
    pub fn to_pretty_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Integer division rounded half up, matching browser `Math.round` for
/// non-negative operands.
///
/// `divisor` must be positive.
pub(crate) fn round_div(dividend: i64, divisor: i64) -> i64 {
    (2 * dividend + divisor) / (2 * divisor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_div() {
        assert_eq!(round_div(70, 3), 23); // 23.33
        assert_eq!(round_div(5, 2), 3); // 2.5 rounds up
        assert_eq!(round_div(100, 1), 100);
        assert_eq!(round_div(0, 4), 0);
        assert_eq!(round_div(11, 4), 3); // 2.75
    }

    #[test]
    fn test_summary_json_field_names() {
        let summary = BillSummary {
            bill_id: "bill-1".to_string(),
            timestamp: Utc::now(),
            summary: SummaryBlock {
                total_items: 1,
                total_carbon_footprint: 50,
                total_greenpoints: 15,
                average_carbon_per_item: 50,
            },
            items: vec![SummaryItem {
                barcode: "222".to_string(),
                item_name: "Cheddar".to_string(),
                quantity: 1,
                grade: EcoGrade::C,
                carbon_footprint: 50,
                points_awarded: 15,
                subtotal_carbon: 50,
                subtotal_points: 15,
            }],
        };

        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(value["summary"]["totalCarbonFootprint"], 50);
        assert_eq!(value["summary"]["averageCarbonPerItem"], 50);
        assert_eq!(value["items"][0]["itemName"], "Cheddar");
        assert_eq!(value["items"][0]["grade"], "C");
        assert_eq!(value["items"][0]["subtotalPoints"], 15);
        assert!(value["timestamp"].is_string());
    }
}
