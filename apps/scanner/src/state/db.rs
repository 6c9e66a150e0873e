//! # Database State
//!
//! Wraps the `Database` handle shared by the archive commands and the
//! database-backed catalog. `SqlitePool` is thread-safe, so no lock.

use greenbill_db::{Database, DbConfig};
use tracing::info;

use crate::error::ApiError;
use crate::state::ConfigState;

#[derive(Debug, Clone)]
pub struct DbState {
    db: Database,
}

impl DbState {
    pub fn new(db: Database) -> Self {
        DbState { db }
    }

    /// Opens the database named by `config`, creating parent directories.
    pub async fn open(config: &ConfigState) -> Result<Self, ApiError> {
        let path = config.resolve_database_path();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                ApiError::internal(format!("Cannot create {}: {}", parent.display(), e))
            })?;
        }

        info!(path = %path.display(), "Opening database");
        let db = Database::new(DbConfig::new(path)).await?;
        Ok(DbState::new(db))
    }

    pub fn inner(&self) -> &Database {
        &self.db
    }
}
