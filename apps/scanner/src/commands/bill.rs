//! # Bill Commands
//!
//! Commands for the bill lifecycle and for editing line items.
//!
//! ## Bill Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Bill Lifecycle                                       │
//! │                                                                         │
//! │  ┌──────────┐     ┌──────────┐     ┌──────────┐     ┌──────────┐       │
//! │  │   Idle   │────►│  Active  │────►│  Ended   │────►│   Idle   │       │
//! │  │ (no bill)│     │          │     │ (results)│     │          │       │
//! │  └──────────┘     └──────────┘     └──────────┘     └──────────┘       │
//! │       start_bill       │   end_bill     │   save_bill                  │
//! │                        │                │   (archive.rs)               │
//! │                   scan_barcode          │                              │
//! │                   update_quantity       └── start_bill (discard)       │
//! │                   remove_item                                          │
//! │                   clear_bill                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use tracing::debug;

use crate::error::ApiError;
use crate::presenter::BillView;
use crate::state::BillState;
use greenbill_core::validation::{validate_barcode, validate_quantity_delta};
use greenbill_core::{BillSummary, QuantityChange};

/// Response for `update_quantity`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuantityResponse {
    pub change: QuantityChange,
    pub bill: BillView,
}

/// Response for `remove_item`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveResponse {
    pub removed: bool,
    pub bill: BillView,
}

/// Response for `end_bill`: the results modal plus the closed bill.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EndBillResponse {
    pub summary: BillSummary,
    pub bill: BillView,
}

/// Starts a new, empty bill. Any current bill is discarded unsaved.
pub fn start_bill(bill: &BillState) -> Result<BillView, ApiError> {
    debug!("start_bill command");
    bill.start()
}

/// Gets the current bill.
///
/// ## Errors
/// `NO_ACTIVE_BILL` while idle.
pub fn get_bill(bill: &BillState) -> Result<BillView, ApiError> {
    debug!("get_bill command");
    bill.view()
}

/// Adds `delta` to an item's quantity.
///
/// ## Behavior
/// - Result below 1: the item is removed
/// - Barcode not on the bill: nothing changes (`change.kind == "not_in_bill"`)
///
/// ## Errors
/// `VALIDATION_ERROR` if `delta` or the resulting quantity is beyond
/// `MAX_QUANTITY`; the bill is unchanged.
pub fn update_quantity(
    bill: &BillState,
    barcode: String,
    delta: i64,
) -> Result<QuantityResponse, ApiError> {
    debug!(barcode = %barcode, delta, "update_quantity command");
    let barcode = validate_barcode(&barcode).map_err(|e| ApiError::validation(e.to_string()))?;
    validate_quantity_delta(delta).map_err(|e| ApiError::validation(e.to_string()))?;

    let (change, view) = bill.update_quantity(&barcode, delta)?;
    Ok(QuantityResponse { change, bill: view })
}

/// Removes an item from the bill.
pub fn remove_item(bill: &BillState, barcode: String) -> Result<RemoveResponse, ApiError> {
    debug!(barcode = %barcode, "remove_item command");
    let barcode = validate_barcode(&barcode).map_err(|e| ApiError::validation(e.to_string()))?;

    let (removed, view) = bill.remove(&barcode)?;
    Ok(RemoveResponse {
        removed,
        bill: view,
    })
}

/// Removes every item. The bill stays active.
pub fn clear_bill(bill: &BillState) -> Result<BillView, ApiError> {
    debug!("clear_bill command");
    bill.clear()
}

/// Ends the bill and returns the results.
///
/// ## Errors
/// - `EMPTY_BILL` if nothing was scanned
/// - `INACTIVE_BILL` if already ended
pub fn end_bill(bill: &BillState) -> Result<EndBillResponse, ApiError> {
    debug!("end_bill command");
    let (summary, view) = bill.end()?;
    Ok(EndBillResponse {
        summary,
        bill: view,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::scan::scan_barcode;
    use crate::error::ErrorCode;
    use crate::presenter::NoOpPresenter;
    use crate::catalog::InMemoryCatalog;
    use greenbill_core::{EcoGrade, ProductInfo, ProgressTier};
    use std::sync::Arc;

    fn catalog() -> InMemoryCatalog {
        InMemoryCatalog::new()
            .with_product("111", ProductInfo::new("Oat Milk", EcoGrade::A))
            .with_product("222", ProductInfo::new("Cheddar", EcoGrade::C))
    }

    fn bill_state() -> BillState {
        BillState::new(Arc::new(NoOpPresenter), 50).unwrap()
    }

    #[tokio::test]
    async fn test_full_bill_scenario() {
        let bill = bill_state();
        let catalog = catalog();

        start_bill(&bill).unwrap();
        scan_barcode(&bill, &catalog, "111".into()).await.unwrap();
        scan_barcode(&bill, &catalog, "222".into()).await.unwrap();
        scan_barcode(&bill, &catalog, "111".into()).await.unwrap();

        let view = get_bill(&bill).unwrap();
        assert_eq!(view.totals.item_count, 3);
        assert_eq!(view.totals.total_carbon, 70);
        assert_eq!(view.totals.total_points, 115);
        assert_eq!(view.progress.percentage, 100.0);
        assert_eq!(view.progress.tier, ProgressTier::High);

        let response = update_quantity(&bill, "222".into(), -1).unwrap();
        assert_eq!(response.change, QuantityChange::Removed);
        assert_eq!(response.bill.totals.item_count, 2);
        assert_eq!(response.bill.totals.total_points, 100);

        let ended = end_bill(&bill).unwrap();
        assert!(!ended.bill.active);
        assert_eq!(ended.summary.summary.total_items, 2);
        assert_eq!(ended.summary.summary.average_carbon_per_item, 10);
    }

    #[tokio::test]
    async fn test_export_average_on_three_items() {
        let bill = bill_state();
        let catalog = catalog();

        start_bill(&bill).unwrap();
        for barcode in ["111", "222", "111"] {
            scan_barcode(&bill, &catalog, barcode.into()).await.unwrap();
        }

        let ended = end_bill(&bill).unwrap();
        assert_eq!(ended.summary.summary.average_carbon_per_item, 23);
    }

    #[test]
    fn test_idle_commands_fail() {
        let bill = bill_state();
        assert_eq!(get_bill(&bill).unwrap_err().code, ErrorCode::NoActiveBill);
        assert_eq!(end_bill(&bill).unwrap_err().code, ErrorCode::NoActiveBill);
        assert_eq!(
            remove_item(&bill, "111".into()).unwrap_err().code,
            ErrorCode::NoActiveBill
        );
    }

    #[test]
    fn test_end_empty_bill() {
        let bill = bill_state();
        start_bill(&bill).unwrap();
        assert_eq!(end_bill(&bill).unwrap_err().code, ErrorCode::EmptyBill);
        assert!(get_bill(&bill).unwrap().active);
    }

    #[test]
    fn test_blank_barcode_rejected() {
        let bill = bill_state();
        start_bill(&bill).unwrap();
        assert_eq!(
            update_quantity(&bill, "  ".into(), 1).unwrap_err().code,
            ErrorCode::ValidationError
        );
    }

    #[tokio::test]
    async fn test_out_of_range_delta_rejected() {
        let bill = bill_state();
        let catalog = catalog();
        start_bill(&bill).unwrap();
        scan_barcode(&bill, &catalog, "111".into()).await.unwrap();

        for delta in [i64::MAX, i64::MIN + 1, i64::MIN] {
            assert_eq!(
                update_quantity(&bill, "111".into(), delta).unwrap_err().code,
                ErrorCode::ValidationError
            );
        }

        let response = update_quantity(&bill, "111".into(), 1).unwrap();
        assert_eq!(response.change, QuantityChange::Updated { quantity: 2 });
        assert_eq!(get_bill(&bill).unwrap().totals.total_points, 100);
    }

    #[tokio::test]
    async fn test_remove_and_clear() {
        let bill = bill_state();
        let catalog = catalog();
        start_bill(&bill).unwrap();
        scan_barcode(&bill, &catalog, "111".into()).await.unwrap();
        scan_barcode(&bill, &catalog, "222".into()).await.unwrap();

        let response = remove_item(&bill, "111".into()).unwrap();
        assert!(response.removed);
        assert!(!remove_item(&bill, "111".into()).unwrap().removed);

        let view = clear_bill(&bill).unwrap();
        assert!(view.items.is_empty());
        assert!(view.active);
    }
}
