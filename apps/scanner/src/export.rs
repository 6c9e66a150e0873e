//! # Bill Export
//!
//! Writes a [`BillSummary`] as pretty-printed JSON.
//!
//! ## File Naming
//! ```text
//! bill_2026-03-14_1773494400123.json
//!      └── date ─┘ └─ epoch millis ┘
//! ```
//! The millisecond suffix keeps two exports from the same day apart.

use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tracing::{error, info};

use crate::error::ApiError;
use greenbill_core::BillSummary;

/// File name for an export taken at `at`.
pub fn export_file_name(at: DateTime<Utc>) -> String {
    format!(
        "bill_{}_{}.json",
        at.format("%Y-%m-%d"),
        at.timestamp_millis()
    )
}

/// Writes `summary` into `dir`, creating the directory if needed.
///
/// ## Returns
/// Full path of the written file.
///
/// ## Errors
/// `EXPORT_FAILED` if the directory or file cannot be written.
pub async fn write_export(
    dir: &Path,
    summary: &BillSummary,
    at: DateTime<Utc>,
) -> Result<PathBuf, ApiError> {
    let json = summary
        .to_pretty_json()
        .map_err(|e| ApiError::export_failed(format!("Cannot serialize bill: {}", e)))?;

    tokio::fs::create_dir_all(dir).await.map_err(|e| {
        error!(dir = %dir.display(), error = %e, "Export directory unavailable");
        ApiError::export_failed(format!("Cannot create {}: {}", dir.display(), e))
    })?;

    let path = dir.join(export_file_name(at));
    tokio::fs::write(&path, json).await.map_err(|e| {
        error!(path = %path.display(), error = %e, "Export write failed");
        ApiError::export_failed(format!("Cannot write {}: {}", path.display(), e))
    })?;

    info!(bill_id = %summary.bill_id, path = %path.display(), "Bill exported");
    Ok(path)
}
