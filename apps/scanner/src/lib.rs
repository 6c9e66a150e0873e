//! # Greenbill Scanner Library
//!
//! Application layer of the Greenbill scanner: session state, the
//! collaborator seams a UI host plugs into, and the commands it invokes.
//!
//! ## Module Organization
//! ```text
//! greenbill_scanner/
//! ├── lib.rs          ◄─── You are here (logging, bootstrap)
//! ├── state/
//! │   ├── mod.rs      ◄─── State type exports
//! │   ├── bill.rs     ◄─── Bill session + stale-lookup guard
//! │   ├── db.rs       ◄─── Database state wrapper
//! │   └── config.rs   ◄─── Configuration state
//! ├── commands/
//! │   ├── bill.rs     ◄─── start/end/edit commands
//! │   ├── scan.rs     ◄─── scan_barcode, scan_image
//! │   ├── archive.rs  ◄─── save, export, history
//! │   └── config.rs   ◄─── get_config
//! ├── catalog.rs      ◄─── ProductCatalog trait + implementations
//! ├── decoder.rs      ◄─── BarcodeDecoder trait + blocking-pool runner
//! ├── presenter.rs    ◄─── Presenter trait + BillView model
//! ├── export.rs       ◄─── JSON export files
//! └── error.rs        ◄─── API error type for commands
//! ```
//!
//! ## Collaborators
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   UI host ──► commands ──► BillState ──► Presenter::render(view)        │
//! │                  │                                                      │
//! │                  ├──► BarcodeDecoder   (image → barcode, blocking pool) │
//! │                  ├──► ProductCatalog   (barcode → name + grade, async)  │
//! │                  └──► DbState          (saved-bill archive)             │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//! The host owns the decoder and passes it to `scan_image`; everything else
//! is assembled by [`bootstrap`].

pub mod catalog;
pub mod commands;
pub mod decoder;
pub mod error;
pub mod export;
pub mod presenter;
pub mod state;

use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use catalog::{DbCatalog, ProductCatalog};
use error::ApiError;
use presenter::Presenter;
use state::{BillState, ConfigState, DbState};

/// Everything the commands need, assembled once at startup.
#[derive(Clone)]
pub struct AppContext {
    pub config: ConfigState,
    pub db: DbState,
    pub bill: BillState,
    pub catalog: Arc<dyn ProductCatalog>,
}

/// Builds the application context.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  1. Open Database ────────────────────────────────────────────────────► │
/// │     • path from config (platform data dir by default)                   │
/// │     • SQLite with WAL mode, pending migrations applied                  │
/// │                                                                         │
/// │  2. Catalog ──────────────────────────────────────────────────────────► │
/// │     • DbCatalog over the `products` table                               │
/// │                                                                         │
/// │  3. Bill Session ─────────────────────────────────────────────────────► │
/// │     • idle (no bill), benchmark from config                             │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub async fn bootstrap(
    config: ConfigState,
    presenter: Arc<dyn Presenter>,
) -> Result<AppContext, ApiError> {
    let db = DbState::open(&config).await?;
    info!("Database connected and migrations applied");

    let catalog: Arc<dyn ProductCatalog> = Arc::new(DbCatalog::new(db.inner().clone()));
    let bill = BillState::new(presenter, config.benchmark_points)?;

    info!(benchmark = config.benchmark_points, "State initialized");
    Ok(AppContext {
        config,
        db,
        bill,
        catalog,
    })
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=greenbill_scanner=trace` - Trace the scanner only
/// - Default: INFO, DEBUG for greenbill crates
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,greenbill=debug,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{archive, bill, scan};
    use crate::presenter::NoOpPresenter;
    use greenbill_core::{EcoGrade, ProductInfo};

    #[tokio::test]
    async fn test_bootstrap_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let config = ConfigState {
            database_path: Some(dir.path().join("data").join("greenbill.db")),
            export_dir: Some(dir.path().join("exports")),
            ..ConfigState::default()
        };

        let ctx = bootstrap(config, Arc::new(NoOpPresenter)).await.unwrap();
        ctx.db
            .inner()
            .products()
            .upsert("111", &ProductInfo::new("Oat Milk", EcoGrade::A))
            .await
            .unwrap();

        bill::start_bill(&ctx.bill).unwrap();
        scan::scan_barcode(&ctx.bill, ctx.catalog.as_ref(), "111".into())
            .await
            .unwrap();
        archive::export_bill(&ctx.bill, &ctx.config).await.unwrap();
        bill::end_bill(&ctx.bill).unwrap();

        let saved = archive::save_bill(&ctx.bill, &ctx.db).await.unwrap();
        assert_eq!(saved.total_points, 50);

        let history = archive::list_saved_bills(&ctx.db, &ctx.config, None)
            .await
            .unwrap();
        assert_eq!(history.len(), 1);
    }

    #[tokio::test]
    async fn test_bootstrap_rejects_bad_benchmark() {
        let dir = tempfile::tempdir().unwrap();
        let config = ConfigState {
            benchmark_points: -5,
            database_path: Some(dir.path().join("greenbill.db")),
            ..ConfigState::default()
        };

        let err = bootstrap(config, Arc::new(NoOpPresenter)).await.err().unwrap();
        assert_eq!(err.code, error::ErrorCode::ConfigError);
    }
}
