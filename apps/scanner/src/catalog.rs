//! # Product Catalogs
//!
//! Where a first-time barcode gets its name and eco-grade.
//!
//! ```text
//! ┌──────────────────┐     lookup("111")     ┌──────────────────────────┐
//! │  BillState scan  │──────────────────────►│  dyn ProductCatalog      │
//! │  (lock released) │◄──────────────────────│  ├── DbCatalog (SQLite)  │
//! └──────────────────┘  ProductInfo | Error  │  └── InMemoryCatalog     │
//!                                            └──────────────────────────┘
//! ```

use async_trait::async_trait;
use std::collections::HashMap;
use tracing::{debug, warn};

use greenbill_core::{LookupError, ProductInfo};
use greenbill_db::Database;

/// Resolves a barcode to product metadata.
///
/// Lookups are the one slow step of a scan, so they are async and run
/// without the bill lock held.
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    async fn lookup(&self, barcode: &str) -> Result<ProductInfo, LookupError>;
}

/// Catalog backed by the local `products` table.
#[derive(Debug, Clone)]
pub struct DbCatalog {
    db: Database,
}

impl DbCatalog {
    pub fn new(db: Database) -> Self {
        DbCatalog { db }
    }
}

#[async_trait]
impl ProductCatalog for DbCatalog {
    async fn lookup(&self, barcode: &str) -> Result<ProductInfo, LookupError> {
        match self.db.products().get_by_barcode(barcode).await {
            Ok(Some(product)) => {
                debug!(barcode = %barcode, grade = %product.grade, "Catalog hit");
                Ok(product.into())
            }
            Ok(None) => Err(LookupError::NotFound(barcode.to_string())),
            Err(e) => {
                warn!(barcode = %barcode, error = %e, "Catalog lookup failed");
                Err(LookupError::Unavailable(e.to_string()))
            }
        }
    }
}

/// Fixed catalog held in memory (demos and tests).
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    products: HashMap<String, ProductInfo>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with_product(mut self, barcode: impl Into<String>, info: ProductInfo) -> Self {
        self.insert(barcode, info);
        self
    }

    pub fn insert(&mut self, barcode: impl Into<String>, info: ProductInfo) {
        self.products.insert(barcode.into(), info);
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

#[async_trait]
impl ProductCatalog for InMemoryCatalog {
    async fn lookup(&self, barcode: &str) -> Result<ProductInfo, LookupError> {
        self.products
            .get(barcode)
            .cloned()
            .ok_or_else(|| LookupError::NotFound(barcode.to_string()))
    }
}
