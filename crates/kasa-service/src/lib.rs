//! # kasa-service: Invoice Service Layer for Kasa
//!
//! Orchestrates the invoice system over [`kasa_core`] (pure business
//! logic) and [`kasa_db`] (SQLite storage).
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                        Kasa Layering                                 │
//! │                                                                      │
//! │  Transport (HTTP handler, IPC command, CLI, ...)                     │
//! │       │                                                              │
//! │       ▼                                                              │
//! │  ┌────────────────────────────────────────────────────────────────┐  │
//! │  │                  kasa-service (THIS CRATE)                     │  │
//! │  │                                                                │  │
//! │  │   InvoiceService  ── create / get / update / delete /          │  │
//! │  │        │             list / render_receipt                     │  │
//! │  │        │                                                       │  │
//! │  │   InvoicePager ── page cache, prefetch, invalidation           │  │
//! │  │        │                                                       │  │
//! │  │   ApiError ── stable machine-readable error codes              │  │
//! │  └────────────────────────────────────────────────────────────────┘  │
//! │       │                          │                                   │
//! │       ▼                          ▼                                   │
//! │   kasa-core                   kasa-db                                │
//! │   (money, totals,             (pool, repositories,                   │
//! │    receipt, validation)        serial allocator)                     │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use kasa_db::{Database, DbConfig};
//! use kasa_service::{CreateInvoiceRequest, InvoiceService};
//!
//! let db = Database::new(DbConfig::new("./kasa.db")).await?;
//! let service = InvoiceService::new(db);
//!
//! let invoice = service.create_invoice(request).await?;
//! let receipt = service.render_receipt(&invoice.id).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod pager;
pub mod requests;
pub mod service;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{ApiError, ApiResult, ErrorCode};
pub use pager::{InvoicePage, InvoicePager, DEFAULT_PAGE_SIZE};
pub use requests::{
    CreateInvoiceRequest, InvoiceResponse, PaymentDto, PaymentInput, PaymentPatch,
    ProductLineDto, ProductLineInput, UpdateInvoiceRequest,
};
pub use service::{InvoiceService, ServiceConfig};
