//! # Repository Module
//!
//! Database repository implementations for Relais POS.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  The Repository pattern abstracts database access behind a clean API.  │
//! │                                                                         │
//! │  Embedding application                                                 │
//! │       │                                                                 │
//! │       │  db.stays().create(room_id, "Alice", "2024-06-05")             │
//! │       │  ↓                                                              │
//! │       ▼                                                                 │
//! │  StayRepository                                                        │
//! │  ├── list_active(&self)                                                │
//! │  ├── create(&self, room_id, client_name, planned_checkout)             │
//! │  ├── checkout(&self, stay_id, final_bill_cents)                        │
//! │  └── ...                                                               │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  No repository calls another: all coordination happens through the     │
//! │  shared store (the order repository and the stay repository both       │
//! │  touch sejours.solde_actuel, each in its own transaction).             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`room::RoomRepository`] - Room CRUD with the occupancy delete guard
//! - [`product::ProductRepository`] - Catalog CRUD (lodging excluded)
//! - [`stay::StayRepository`] - Check-in, active board, itemized bill, checkout
//! - [`order::OrderRepository`] - Cart capture with payment routing
//! - [`reporting::ReportingRepository`] - Occupancy and revenue dashboard

pub mod order;
pub mod product;
pub mod reporting;
pub mod room;
pub mod stay;

use chrono::Local;

use relais_core::TIMESTAMP_FORMAT;

/// Current local time in the stored `YYYY-MM-DD HH:MM:SS` format.
///
/// Every timestamp column in the schema is written through this function so
/// the reporting prefix comparisons stay valid.
pub(crate) fn now_timestamp() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}
