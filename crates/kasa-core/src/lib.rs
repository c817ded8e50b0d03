//! # kasa-core: Pure Business Logic for Kasa
//!
//! This crate is the heart of the invoice system. It contains the parts
//! with real invariants (money arithmetic, totals and change computation,
//! payment linking rules, and the canonical receipt text) as pure
//! functions with zero I/O dependencies.
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Invoice, ProductLine, Payment)
//! - [`money`] - Money type with integer-cent arithmetic (no floating point)
//! - [`totals`] - Line totals, invoice total, and change computation
//! - [`receipt`] - Deterministic receipt text rendering
//! - [`validation`] - Input validation rules
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure functions**: same input always produces the same output
//! 2. **No I/O**: database, network, file system access is forbidden here
//! 3. **Integer money**: all monetary values are cents (i64), so line
//!    totals and sums are exact and no rounding drift can occur
//! 4. **Explicit errors**: all errors are typed, never strings or panics

pub mod error;
pub mod money;
pub mod receipt;
pub mod totals;
pub mod types;
pub mod validation;

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use receipt::ReceiptConfig;
pub use totals::{Change, Totals};
pub use types::*;

/// Maximum number of product lines on a single invoice.
///
/// Prevents runaway requests; a paper receipt longer than this is not a
/// realistic retail transaction.
pub const MAX_PRODUCT_LINES: usize = 100;

/// Maximum length of a product title, matching the store's column width.
pub const MAX_TITLE_LEN: usize = 255;
