//! # API Error Type
//!
//! Unified error type for service operations.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      Error Flow in Kasa                              │
//! │                                                                      │
//! │  Caller                       Service                                │
//! │  ──────                       ───────                                │
//! │                                                                      │
//! │  create_invoice(req)                                                 │
//! │         │                                                            │
//! │         ▼                                                            │
//! │  ┌────────────────────────────────────────────────────────────────┐ │
//! │  │  Service method: Result<T, ApiError>                           │ │
//! │  │         │                                                      │ │
//! │  │  Validation failed? ── ValidationError(field) ──┐              │ │
//! │  │         │                                       │              │ │
//! │  │  Serial failed? ────── DbError::AllocationFailed├── ApiError ─►│ │
//! │  │         │                                       │              │ │
//! │  │  Database failed? ──── DbError::QueryFailed ────┘              │ │
//! │  └────────────────────────────────────────────────────────────────┘ │
//! │                                                                      │
//! │  e.code = "ALLOCATION_ERROR", e.message = "..."                      │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Errors carry both a machine-readable `code` and a human-readable
//! `message`, serialized in camelCase for any frontend consumer.

use serde::Serialize;
use tracing::error;

use kasa_core::CoreError;
use kasa_db::DbError;

/// API error returned from service operations.
///
/// ## Serialization
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "Invoice not found: 550e8400-..."
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found (404)
    NotFound,

    /// Input validation failed (400)
    ValidationError,

    /// The durable serial counter could not issue a number (503).
    /// Creation must not proceed; the client retries.
    AllocationError,

    /// A uniqueness guarantee was violated (409). For serial numbers
    /// this indicates allocator corruption and is logged loudly.
    ConflictError,

    /// The linked payment does not cover the amount due (400)
    PaymentMismatch,

    /// Database operation failed (500)
    DatabaseError,

    /// Business logic error, e.g. editing a finalized invoice (422)
    BusinessLogic,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(
            ErrorCode::NotFound,
            format!("{} not found: {}", resource, id),
        )
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates a payment mismatch error.
    pub fn payment_mismatch(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::PaymentMismatch, message)
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => {
                if field.contains("serial_number") {
                    // The allocator is the only serial source; a UNIQUE
                    // hit here means the counter and the data disagree.
                    error!(field = %field, "Serial uniqueness violated despite allocator");
                    ApiError::new(
                        ErrorCode::ConflictError,
                        "Serial number conflict; invoice not created",
                    )
                } else {
                    ApiError::new(
                        ErrorCode::ConflictError,
                        format!("{} '{}' already exists", field, value),
                    )
                }
            }
            DbError::AllocationFailed(e) => {
                error!("Serial allocation failed: {}", e);
                ApiError::new(
                    ErrorCode::AllocationError,
                    "Could not allocate a serial number",
                )
            }
            DbError::ConnectionFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                // Log the actual error but return a generic message
                error!("Database query failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::TransactionFailed(e) => {
                error!("Transaction failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database transaction failed")
            }
            DbError::ForeignKeyViolation { message } => {
                error!("Foreign key violation: {}", message);
                ApiError::new(ErrorCode::ValidationError, "Invalid reference")
            }
            DbError::PoolExhausted => {
                ApiError::new(ErrorCode::DatabaseError, "Database pool exhausted")
            }
            DbError::Internal(e) => {
                error!("Internal database error: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidQuantity { stock } => ApiError::validation(format!(
                "Quantity must be non-negative, got {}",
                stock
            )),
            CoreError::InvalidPrice { cents } => ApiError::validation(format!(
                "Price must be non-negative, got {} cents",
                cents
            )),
            CoreError::PaymentNotOwned {
                invoice_id,
                payment_id,
            } => ApiError::new(
                ErrorCode::BusinessLogic,
                format!(
                    "Payment {} does not belong to invoice {}",
                    payment_id, invoice_id
                ),
            ),
            CoreError::InvoiceFinalized { invoice_id } => ApiError::new(
                ErrorCode::BusinessLogic,
                format!("Invoice {} is finalized and cannot be changed", invoice_id),
            ),
            CoreError::Validation(e) => ApiError::validation(e.to_string()),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

/// Result type for service operations.
pub type ApiResult<T> = Result<T, ApiError>;

// =============================================================================
// Unit Tests
// =============================================================================
