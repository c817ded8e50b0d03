//! # kasa-db: Database Layer for Kasa
//!
//! This crate provides database access for the Kasa invoice system.
//! It uses SQLite for local storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                        Kasa Data Flow                                │
//! │                                                                      │
//! │  Service operation (create_invoice, render_receipt, ...)             │
//! │       │                                                              │
//! │       ▼                                                              │
//! │  ┌────────────────────────────────────────────────────────────────┐  │
//! │  │                     kasa-db (THIS CRATE)                       │  │
//! │  │                                                                │  │
//! │  │   ┌─────────────┐   ┌────────────────┐   ┌─────────────────┐  │  │
//! │  │   │  Database   │   │  Repositories  │   │   Migrations    │  │  │
//! │  │   │  (pool.rs)  │   │  (invoice.rs)  │   │   (embedded)    │  │  │
//! │  │   │             │   │                │   │                 │  │  │
//! │  │   │ SqlitePool  │◄──│ InvoiceRepo    │   │ 001_initial.sql │  │  │
//! │  │   │ WAL mode    │   │ SerialAlloc    │   │ ...             │  │  │
//! │  │   └─────────────┘   └────────────────┘   └─────────────────┘  │  │
//! │  │                                                                │  │
//! │  └────────────────────────────────────────────────────────────────┘  │
//! │       │                                                              │
//! │       ▼                                                              │
//! │  SQLite Database (kasa.db)                                           │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`serial`] - Durable serial number allocation
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use kasa_db::{Database, DbConfig};
//!
//! let config = DbConfig::new("path/to/kasa.db");
//! let db = Database::new(config).await?;
//!
//! let serial = db.serials().issue().await?;
//! let invoice = db.invoices().get_by_id(&id).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod serial;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::invoice::{InvoiceRepository, PaymentUpdate};
pub use serial::SerialAllocator;
