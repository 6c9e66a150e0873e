//! # Repository Module
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Scanner command                                                       │
//! │       │                                                                 │
//! │       │  db.products().get_by_barcode("111")                           │
//! │       ▼                                                                 │
//! │  ProductRepository                 SavedBillRepository                 │
//! │  ├── get_by_barcode                ├── append      (no update/delete)  │
//! │  ├── upsert                        ├── list_recent                     │
//! │  ├── list                          ├── get_by_id                       │
//! │  └── count                         └── count                           │
//! │       │                                  │                              │
//! │       ▼                                  ▼                              │
//! │  products table                    saved_bills table                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Queries are checked at runtime and mapped through private `FromRow`
//! row structs, so no `DATABASE_URL` is needed at build time.

pub mod bill;
pub mod product;
