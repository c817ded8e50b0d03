//! # Validation Module
//!
//! Input validation for invoice requests.
//!
//! Validation runs before any mutation: a request that fails any rule here
//! leaves the store untouched and never consumes a serial number.

use crate::error::ValidationError;
use crate::{MAX_PRODUCT_LINES, MAX_TITLE_LEN};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a product title.
///
/// ## Rules
/// - Must not be empty (after trimming)
/// - Must be at most 255 characters
pub fn validate_title(title: &str) -> ValidationResult<()> {
    let title = title.trim();

    if title.is_empty() {
        return Err(ValidationError::Required {
            field: "title".to_string(),
        });
    }

    if title.chars().count() > MAX_TITLE_LEN {
        return Err(ValidationError::TooLong {
            field: "title".to_string(),
            max: MAX_TITLE_LEN,
        });
    }

    Ok(())
}

/// Validates an invoice id string (UUID v4 format).
pub fn validate_invoice_id(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line quantity. Zero is allowed; negative is not.
pub fn validate_stock(stock: i64) -> ValidationResult<()> {
    if stock < 0 {
        return Err(ValidationError::MustBeNonNegative {
            field: "stock".to_string(),
        });
    }

    Ok(())
}

/// Validates a unit price in cents. Zero is allowed (free items).
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::MustBeNonNegative {
            field: "price".to_string(),
        });
    }

    Ok(())
}

/// Validates a payment amount in cents.
pub fn validate_payment_amount(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::MustBeNonNegative {
            field: "payment amount".to_string(),
        });
    }

    Ok(())
}

/// Validates a listing limit. Must be positive.
pub fn validate_limit(limit: i64) -> ValidationResult<()> {
    if limit <= 0 {
        return Err(ValidationError::OutOfRange {
            field: "limit".to_string(),
            min: 1,
            max: i64::MAX,
        });
    }

    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates the product line count of a request.
///
/// An invoice must carry at least one line and at most
/// [`MAX_PRODUCT_LINES`].
pub fn validate_product_count(count: usize) -> ValidationResult<()> {
    if count == 0 {
        return Err(ValidationError::Required {
            field: "products".to_string(),
        });
    }

    if count > MAX_PRODUCT_LINES {
        return Err(ValidationError::OutOfRange {
            field: "products".to_string(),
            min: 1,
            max: MAX_PRODUCT_LINES as i64,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_title() {
        assert!(validate_title("Bread").is_ok());
        assert!(validate_title("Молоко 2.5%").is_ok());

        assert!(validate_title("").is_err());
        assert!(validate_title("   ").is_err());
        assert!(validate_title(&"x".repeat(300)).is_err());
    }

    #[test]
    fn test_validate_stock() {
        assert!(validate_stock(0).is_ok());
        assert!(validate_stock(5).is_ok());
        assert!(validate_stock(-1).is_err());
    }

    #[test]
    fn test_validate_price_cents() {
        assert!(validate_price_cents(0).is_ok());
        assert!(validate_price_cents(150).is_ok());
        assert!(validate_price_cents(-1).is_err());
    }

    #[test]
    fn test_validate_payment_amount() {
        assert!(validate_payment_amount(0).is_ok());
        assert!(validate_payment_amount(500).is_ok());
        assert!(validate_payment_amount(-500).is_err());
    }

    #[test]
    fn test_validate_limit() {
        assert!(validate_limit(1).is_ok());
        assert!(validate_limit(100).is_ok());
        assert!(validate_limit(0).is_err());
        assert!(validate_limit(-5).is_err());
    }

    #[test]
    fn test_validate_product_count() {
        assert!(validate_product_count(1).is_ok());
        assert!(validate_product_count(100).is_ok());
        assert!(validate_product_count(0).is_err());
        assert!(validate_product_count(101).is_err());
    }

    #[test]
    fn test_validate_invoice_id() {
        assert!(validate_invoice_id("550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_invoice_id("").is_err());
        assert!(validate_invoice_id("not-a-uuid").is_err());
    }
}
