//! # Serial Number Allocator
//!
//! Issues the business serial numbers printed on receipts.
//!
//! ## Guarantees
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                    Serial Allocation                                 │
//! │                                                                      │
//! │  issue()                                                             │
//! │    │                                                                 │
//! │    ▼                                                                 │
//! │  UPDATE serial_counter SET value = value + 1 RETURNING value         │
//! │    │                                                                 │
//! │    │  One statement: read-increment-write is atomic, and SQLite      │
//! │    │  serializes writers, so two concurrent calls can never see      │
//! │    │  the same value.                                                │
//! │    ▼                                                                 │
//! │  Committed BEFORE the invoice insert: a crash after issue() leaves   │
//! │  a gap in the printed sequence, never a duplicate.                   │
//! │                                                                      │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Serials are unique and strictly increasing across the lifetime of the
//! store. They are never reused, including after invoice deletion.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};

/// Allocator handle over the durable `serial_counter` row.
#[derive(Debug, Clone)]
pub struct SerialAllocator {
    pool: SqlitePool,
}

impl SerialAllocator {
    /// Creates a new SerialAllocator.
    pub fn new(pool: SqlitePool) -> Self {
        SerialAllocator { pool }
    }

    /// Issues the next serial number.
    ///
    /// The increment is committed before this returns: once a caller
    /// holds a serial it is theirs even if the invoice insert that
    /// follows fails. Gaps are acceptable; duplicates are not.
    pub async fn issue(&self) -> DbResult<i64> {
        let serial: i64 = sqlx::query_scalar(
            "UPDATE serial_counter SET value = value + 1 WHERE id = 1 RETURNING value",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => {
                DbError::AllocationFailed("serial_counter row missing".to_string())
            }
            other => DbError::AllocationFailed(other.to_string()),
        })?;

        debug!(serial, "Issued serial number");
        Ok(serial)
    }

    /// Returns the last issued serial without consuming one.
    ///
    /// Diagnostics only; never use this to derive the next serial.
    pub async fn current(&self) -> DbResult<i64> {
        let value: i64 = sqlx::query_scalar("SELECT value FROM serial_counter WHERE id = 1")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DbError::AllocationFailed(e.to_string()))?;

        Ok(value)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
