//! # Saved-Bill Repository
//!
//! Append-only archive of finalized bills.
//!
//! ## Storage
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  saved_bills                                                            │
//! │  ─────────────────────────────────────────────────────────────────────  │
//! │  id            archive entry id (UUID)                                  │
//! │  bill_id       id of the bill that was saved (UNIQUE)                   │
//! │  saved_at      when it was archived                                     │
//! │  total_items   ┐                                                        │
//! │  total_carbon  ├─ copied from the summary for listing without JSON     │
//! │  total_points  ┘                                                        │
//! │  payload       full BillSummary as JSON                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! There is deliberately no update or delete: an archived bill is a receipt.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use greenbill_core::BillSummary;

/// One archived bill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedBill {
    pub id: String,
    pub bill_id: String,
    pub saved_at: DateTime<Utc>,
    pub total_items: i64,
    pub total_carbon: i64,
    pub total_points: i64,
    pub summary: BillSummary,
}

#[derive(Debug, sqlx::FromRow)]
struct SavedBillRow {
    id: String,
    bill_id: String,
    saved_at: DateTime<Utc>,
    total_items: i64,
    total_carbon: i64,
    total_points: i64,
    payload: String,
}

impl TryFrom<SavedBillRow> for SavedBill {
    type Error = DbError;

    fn try_from(row: SavedBillRow) -> Result<Self, Self::Error> {
        let summary: BillSummary = serde_json::from_str(&row.payload)?;

        Ok(SavedBill {
            id: row.id,
            bill_id: row.bill_id,
            saved_at: row.saved_at,
            total_items: row.total_items,
            total_carbon: row.total_carbon,
            total_points: row.total_points,
            summary,
        })
    }
}

/// Repository for the saved-bill archive.
#[derive(Debug, Clone)]
pub struct SavedBillRepository {
    pool: SqlitePool,
}

impl SavedBillRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SavedBillRepository { pool }
    }

    /// Archives a finalized bill summary.
    ///
    /// ## Errors
    /// - [`DbError::UniqueViolation`] if this bill was already archived
    /// - [`DbError::ConstraintViolation`] if the summary has no items
    pub async fn append(&self, summary: &BillSummary) -> DbResult<SavedBill> {
        let id = Uuid::new_v4().to_string();
        let saved_at = Utc::now();
        let payload = serde_json::to_string(summary)?;

        debug!(id = %id, bill_id = %summary.bill_id, "Archiving bill");

        sqlx::query(
            r#"
            INSERT INTO saved_bills (
                id, bill_id, saved_at,
                total_items, total_carbon, total_points,
                payload
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&id)
        .bind(&summary.bill_id)
        .bind(saved_at)
        .bind(summary.summary.total_items)
        .bind(summary.summary.total_carbon_footprint)
        .bind(summary.summary.total_greenpoints)
        .bind(&payload)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { field, .. } => DbError::UniqueViolation {
                field,
                value: summary.bill_id.clone(),
            },
            other => other,
        })?;

        info!(
            bill_id = %summary.bill_id,
            total_points = summary.summary.total_greenpoints,
            "Bill archived"
        );

        Ok(SavedBill {
            id,
            bill_id: summary.bill_id.clone(),
            saved_at,
            total_items: summary.summary.total_items,
            total_carbon: summary.summary.total_carbon_footprint,
            total_points: summary.summary.total_greenpoints,
            summary: summary.clone(),
        })
    }

    /// Lists archived bills, newest first.
    pub async fn list_recent(&self, limit: u32) -> DbResult<Vec<SavedBill>> {
        let rows = sqlx::query_as::<_, SavedBillRow>(
            r#"
            SELECT id, bill_id, saved_at, total_items, total_carbon, total_points, payload
            FROM saved_bills
            ORDER BY saved_at DESC, rowid DESC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(SavedBill::try_from).collect()
    }

    /// Gets an archive entry by its id.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<SavedBill>> {
        let row = sqlx::query_as::<_, SavedBillRow>(
            r#"
            SELECT id, bill_id, saved_at, total_items, total_carbon, total_points, payload
            FROM saved_bills
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(SavedBill::try_from).transpose()
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM saved_bills")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
