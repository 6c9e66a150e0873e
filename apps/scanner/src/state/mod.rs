//! # State Module
//!
//! Session state for the scanner, split by concern so each command asks
//! only for what it touches.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────┐  ┌──────────────────┐  ┌──────────────────┐          │
//! │  │   DbState    │  │    BillState     │  │   ConfigState    │          │
//! │  │              │  │                  │  │                  │          │
//! │  │  Database    │  │  Arc<Mutex<      │  │  benchmark       │          │
//! │  │  (SQLite     │  │    Session       │  │  database path   │          │
//! │  │   pool)      │  │  >>              │  │  export dir      │          │
//! │  └──────────────┘  └──────────────────┘  └──────────────────┘          │
//! │                                                                         │
//! │  THREAD SAFETY:                                                        │
//! │  • DbState: Database has internal connection pool (thread-safe)        │
//! │  • BillState: Mutex held only for in-memory changes, never for I/O     │
//! │  • ConfigState: Read-only after initialization                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod bill;
mod config;
mod db;

pub use bill::{BillState, LookupTicket, ScanOutcome, ScanStart};
pub use config::{ConfigError, ConfigState, ENV_BENCHMARK_POINTS, ENV_DB_PATH, ENV_EXPORT_DIR};
pub use db::DbState;
