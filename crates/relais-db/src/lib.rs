//! # relais-db: Database Layer for Relais POS
//!
//! This crate provides database access for the Relais POS hotel system.
//! It uses SQLite for local storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Relais POS Data Flow                              │
//! │                                                                         │
//! │  Embedding application (front desk / POS terminal)                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     relais-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │ room, product │    │  (embedded)  │  │   │
//! │  │   │               │    │ stay, order,  │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ reporting     │    │ 001_init.sql │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database (relais.db)                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (rooms, stays, orders, ...)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use relais_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/relais.db")).await?;
//!
//! // Check a guest in and charge the minibar to the room
//! let stay = db.stays().create(&room_id, "Alice Martin", "2024-06-05").await?;
//! db.orders()
//!     .create("reception", &cart, "Transfert Compte", Some(&stay.id))
//!     .await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::order::OrderRepository;
pub use repository::product::ProductRepository;
pub use repository::reporting::ReportingRepository;
pub use repository::room::RoomRepository;
pub use repository::stay::StayRepository;
