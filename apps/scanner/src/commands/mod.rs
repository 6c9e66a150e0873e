//! # Scanner Commands Module
//!
//! Every operation a UI host can invoke.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs      ◄─── You are here (exports)
//! ├── bill.rs     ◄─── Bill lifecycle and editing
//! ├── scan.rs     ◄─── Barcode and image scanning
//! ├── archive.rs  ◄─── Save, export, saved-bill history
//! └── config.rs   ◄─── Configuration retrieval
//! ```
//!
//! ## How Commands Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Command Flow                                         │
//! │                                                                         │
//! │  UI host                                                                │
//! │  ───────                                                                │
//! │  scan_barcode(&ctx.bill, ctx.catalog.as_ref(), "111".into()).await      │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  Rust command                                                           │
//! │  ────────────                                                           │
//! │  validate input ─► BillState (lock) ─► catalog (no lock) ─► BillState   │
//! │         │                                                               │
//! │         │  presenter.render(view) after every change                    │
//! │         ▼                                                               │
//! │  Result<ScanOutcome, ApiError>  (serde JSON for the UI)                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## State Injection
//! Each command takes only the state it needs:
//! ```rust,ignore
//! // Only needs the bill
//! fn end_bill(bill: &BillState)
//!
//! // Bill plus a collaborator
//! async fn scan_barcode(bill: &BillState, catalog: &dyn ProductCatalog, ...)
//!
//! // Bill plus storage
//! async fn save_bill(bill: &BillState, db: &DbState)
//! ```

pub mod archive;
pub mod bill;
pub mod config;
pub mod scan;
