//! # Error Types
//!
//! Domain-specific error types for kasa-core.
//!
//! Error flow: `ValidationError` → `CoreError` → `DbError` (kasa-db) →
//! `ApiError` (kasa-service) → caller.
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (invoice id, offending value)
//! 3. Errors are enum variants, never String

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These represent business rule violations; they are rejected before any
/// mutation takes place.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A product line carries a negative quantity.
    #[error("invalid quantity: {stock}")]
    InvalidQuantity { stock: i64 },

    /// A product line carries a negative unit price.
    #[error("invalid price: {cents} cents")]
    InvalidPrice { cents: i64 },

    /// A payment was linked to an invoice it does not belong to.
    #[error("payment {payment_id} does not belong to invoice {invoice_id}")]
    PaymentNotOwned {
        invoice_id: String,
        payment_id: String,
    },

    /// The invoice has been rendered as a receipt; its products and
    /// payment are frozen.
    #[error("invoice {invoice_id} is finalized and can no longer be modified")]
    InvoiceFinalized { invoice_id: String },

    /// Validation error (wraps ValidationError).
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when caller input doesn't meet requirements; used for early
/// validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustBeNonNegative { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Invalid format (e.g. malformed UUID).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InvalidQuantity { stock: -3 };
        assert_eq!(err.to_string(), "invalid quantity: -3");

        let err = CoreError::InvoiceFinalized {
            invoice_id: "abc".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invoice abc is finalized and can no longer be modified"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "title".to_string(),
        };
        assert_eq!(err.to_string(), "title is required");

        let err = ValidationError::MustBeNonNegative {
            field: "stock".to_string(),
        };
        assert_eq!(err.to_string(), "stock must not be negative");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "products".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
