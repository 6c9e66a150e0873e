//! # Product Repository
//!
//! The local product catalog: barcode → name and eco-grade.
//!
//! Grades are stored as TEXT and read back leniently, so a catalog imported
//! with labels like `"not-applicable"` still scores (as `UNKNOWN`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use greenbill_core::{EcoGrade, ProductInfo};

/// A catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogProduct {
    pub barcode: String,
    pub name: String,
    pub grade: EcoGrade,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CatalogProduct {
    /// The part of the entry a bill needs.
    pub fn info(&self) -> ProductInfo {
        ProductInfo::new(self.name.clone(), self.grade)
    }
}

impl From<CatalogProduct> for ProductInfo {
    fn from(product: CatalogProduct) -> Self {
        ProductInfo::new(product.name, product.grade)
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    barcode: String,
    name: String,
    grade: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for CatalogProduct {
    fn from(row: ProductRow) -> Self {
        CatalogProduct {
            grade: EcoGrade::parse_lenient(&row.grade),
            barcode: row.barcode,
            name: row.name,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Repository for catalog operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
///
/// repo.upsert("111", &ProductInfo::new("Oat Milk 1L", EcoGrade::A)).await?;
/// let product = repo.get_by_barcode("111").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Gets a product by its barcode.
    ///
    /// ## Returns
    /// * `Ok(Some(product))` - Product found
    /// * `Ok(None)` - Barcode not in the catalog
    pub async fn get_by_barcode(&self, barcode: &str) -> DbResult<Option<CatalogProduct>> {
        debug!(barcode = %barcode, "Looking up product");

        let row = sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT barcode, name, grade, created_at, updated_at
            FROM products
            WHERE barcode = ?1
            "#,
        )
        .bind(barcode)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(CatalogProduct::from))
    }

    /// Inserts a product, or updates name and grade if the barcode exists.
    ///
    /// `created_at` is preserved on update. Bills already holding the
    /// barcode are unaffected; their scores were frozen at scan time.
    pub async fn upsert(&self, barcode: &str, info: &ProductInfo) -> DbResult<CatalogProduct> {
        debug!(barcode = %barcode, grade = %info.grade, "Upserting product");

        let now = Utc::now();

        let row = sqlx::query_as::<_, ProductRow>(
            r#"
            INSERT INTO products (barcode, name, grade, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?4)
            ON CONFLICT(barcode) DO UPDATE SET
                name = excluded.name,
                grade = excluded.grade,
                updated_at = excluded.updated_at
            RETURNING barcode, name, grade, created_at, updated_at
            "#,
        )
        .bind(barcode)
        .bind(&info.name)
        .bind(info.grade.to_string())
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    /// Lists products ordered by name.
    pub async fn list(&self, limit: u32) -> DbResult<Vec<CatalogProduct>> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT barcode, name, grade, created_at, updated_at
            FROM products
            ORDER BY name, barcode
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(CatalogProduct::from).collect())
    }

    /// Counts catalog entries (for diagnostics and the seed tool).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
