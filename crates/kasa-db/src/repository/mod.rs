//! # Repository Module
//!
//! Database repository implementations for Kasa.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                  Repository Pattern Explained                        │
//! │                                                                      │
//! │  The Repository pattern abstracts database access behind a clean     │
//! │  API.                                                                │
//! │                                                                      │
//! │  Service call                                                        │
//! │       │                                                              │
//! │       │  db.invoices().get_by_id(&id)                                │
//! │       ▼                                                              │
//! │  InvoiceRepository                                                   │
//! │  ├── create(&self, invoice, lines, payment)                          │
//! │  ├── get_by_id(&self, id)                                            │
//! │  ├── update(&self, invoice, lines, payment_update)                   │
//! │  └── list_page(&self, skip, limit)                                   │
//! │       │                                                              │
//! │       │  SQL Query                                                   │
//! │       ▼                                                              │
//! │  SQLite Database                                                     │
//! │                                                                      │
//! │  Benefits:                                                           │
//! │  • SQL is isolated in one place                                      │
//! │  • Multi-row writes stay inside one transaction                      │
//! │  • Easy to test against an in-memory database                        │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`invoice::InvoiceRepository`] - Invoice, product line, and payment
//!   operations

pub mod invoice;
