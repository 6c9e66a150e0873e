//! # Archive Commands
//!
//! Saving ended bills, browsing the saved-bill history, and exporting a bill
//! as a JSON file.

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::ApiError;
use crate::export::write_export;
use crate::state::{BillState, ConfigState, DbState};
use greenbill_core::BillSummary;
use greenbill_db::SavedBill;

/// Response for `export_bill`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportResponse {
    /// Where the file was written.
    pub path: String,
    pub summary: BillSummary,
}

/// Archives the ended bill and returns the session to idle.
///
/// ## Flow
/// ```text
/// closed_summary() ──► saved_bills.append() ──► finish(bill_id) ──► presenter.reset()
///   BILL_STILL_OPEN        DATABASE_ERROR         (skipped if a new bill
///                                                  was started meanwhile)
/// ```
/// If the append fails the bill stays ended and can be saved again.
pub async fn save_bill(bill: &BillState, db: &DbState) -> Result<SavedBill, ApiError> {
    debug!("save_bill command");
    let summary = bill.closed_summary()?;

    let saved = db.inner().saved_bills().append(&summary).await?;

    if !bill.finish(&saved.bill_id) {
        debug!(bill_id = %saved.bill_id, "Session moved on before save completed");
    }

    info!(id = %saved.id, bill_id = %saved.bill_id, "save_bill completed");
    Ok(saved)
}

/// Writes the current bill (open or ended) to the export directory.
///
/// ## Errors
/// - `NO_ACTIVE_BILL` while idle
/// - `EMPTY_BILL` if there is nothing to export
/// - `EXPORT_FAILED` if the file cannot be written
pub async fn export_bill(bill: &BillState, config: &ConfigState) -> Result<ExportResponse, ApiError> {
    debug!("export_bill command");
    let summary = bill.export_summary()?;

    let path = write_export(&config.resolve_export_dir(), &summary, Utc::now()).await?;

    Ok(ExportResponse {
        path: path.display().to_string(),
        summary,
    })
}

/// Lists saved bills, newest first.
///
/// ## Arguments
/// * `limit` - Maximum rows (default: `saved_bills_page_size`)
pub async fn list_saved_bills(
    db: &DbState,
    config: &ConfigState,
    limit: Option<u32>,
) -> Result<Vec<SavedBill>, ApiError> {
    let limit = limit.unwrap_or(config.saved_bills_page_size);
    debug!(limit, "list_saved_bills command");

    if limit == 0 {
        return Err(ApiError::validation("limit must be greater than 0"));
    }

    Ok(db.inner().saved_bills().list_recent(limit).await?)
}

/// Gets one saved bill by its archive id.
pub async fn get_saved_bill(db: &DbState, id: String) -> Result<SavedBill, ApiError> {
    debug!(id = %id, "get_saved_bill command");

    db.inner()
        .saved_bills()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Saved bill", &id))
}
