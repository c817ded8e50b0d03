//! # Domain Types
//!
//! Core domain types for the invoice system.
//!
//! ## Dual-Key Identity Pattern
//! Every invoice has:
//! - `id`: UUID v4 - immutable, used for store relations and lookups
//! - `serial_number`: the business identifier printed on the receipt,
//!   issued by the durable serial allocator (unique, monotonic, never
//!   reused even after deletion)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;

// =============================================================================
// Product Line
// =============================================================================

/// One purchased line item on an invoice.
///
/// Line data is a snapshot: once the invoice is finalized the title,
/// quantity and price are frozen with the receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ProductLine {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Invoice this line belongs to.
    pub invoice_id: String,

    /// Display order on the invoice and receipt (0-based).
    pub position: i64,

    /// Product title shown on the receipt.
    pub title: String,

    /// Quantity purchased. Never negative; zero is allowed.
    pub stock: i64,

    /// Unit price in cents.
    pub price_cents: i64,

    /// Line total in cents (stock × price, exact).
    pub line_total_cents: i64,
}

impl ProductLine {
    /// Returns the unit price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Returns the line total as Money.
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.line_total_cents)
    }
}

// =============================================================================
// Payment
// =============================================================================

/// How an invoice was paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum PaymentKind {
    /// Physical cash payment.
    Cash,
    /// Card or other non-cash payment.
    Cashless,
}

/// The label printed on the receipt's payment line.
impl fmt::Display for PaymentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentKind::Cash => write!(f, "cash"),
            PaymentKind::Cashless => write!(f, "cashless"),
        }
    }
}

/// A payment attached to an invoice.
///
/// Owned exclusively by one invoice; an invoice has zero or one payment
/// at any time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Payment {
    pub id: String,
    pub invoice_id: String,
    pub kind: PaymentKind,
    /// Amount tendered, in cents.
    pub amount_cents: i64,
    pub created_at: DateTime<Utc>,
}

impl Payment {
    /// Returns the payment amount as Money.
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

// =============================================================================
// Invoice Status
// =============================================================================

/// Lifecycle status of an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    /// Products and payment may still be replaced.
    Open,
    /// A receipt has been rendered; products and payment are frozen.
    Finalized,
}

impl Default for InvoiceStatus {
    fn default() -> Self {
        InvoiceStatus::Open
    }
}

// =============================================================================
// Invoice
// =============================================================================

/// A retail invoice.
///
/// `total_amount_cents` and `rest_cents` are derived values, recomputed by
/// the totals module whenever products or payment change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Invoice {
    pub id: String,
    /// Business identifier printed on the receipt. Unique and monotonic.
    pub serial_number: i64,
    /// Optional owning actor, kept for display and filtering only.
    pub user_id: Option<String>,
    /// Currently linked payment, if any.
    pub payment_id: Option<String>,
    pub status: InvoiceStatus,
    /// Amount due: the exact sum of line totals, in cents.
    pub total_amount_cents: i64,
    /// Change: payment amount minus total amount (zero with no payment).
    pub rest_cents: i64,
    /// Set once at creation, never mutated afterwards.
    pub date_of_issue: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Invoice {
    /// Returns the amount due as Money.
    #[inline]
    pub fn total_amount(&self) -> Money {
        Money::from_cents(self.total_amount_cents)
    }

    /// Returns the change as Money.
    #[inline]
    pub fn rest(&self) -> Money {
        Money::from_cents(self.rest_cents)
    }

    /// Whether a receipt has been rendered for this invoice.
    #[inline]
    pub fn is_finalized(&self) -> bool {
        self.status == InvoiceStatus::Finalized
    }

    /// Links a payment, replacing any existing one.
    ///
    /// Only the `payment_id` field changes; totals are not touched (the
    /// caller re-runs change computation afterwards). Returns the id of
    /// the replaced payment, if there was one. There is no intermediate
    /// state with two payments.
    pub fn link_payment(&mut self, payment: &Payment) -> CoreResult<Option<String>> {
        if self.is_finalized() {
            return Err(CoreError::InvoiceFinalized {
                invoice_id: self.id.clone(),
            });
        }
        if payment.invoice_id != self.id {
            return Err(CoreError::PaymentNotOwned {
                invoice_id: self.id.clone(),
                payment_id: payment.id.clone(),
            });
        }

        Ok(self.payment_id.replace(payment.id.clone()))
    }

    /// Removes the linked payment, returning its id if one was linked.
    pub fn unlink_payment(&mut self) -> CoreResult<Option<String>> {
        if self.is_finalized() {
            return Err(CoreError::InvoiceFinalized {
                invoice_id: self.id.clone(),
            });
        }

        Ok(self.payment_id.take())
    }
}

// =============================================================================
// Invoice Summary
// =============================================================================

/// Listing row shape returned by the list operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct InvoiceSummary {
    pub id: String,
    pub serial_number: i64,
    pub user_id: Option<String>,
    pub payment_id: Option<String>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn invoice(id: &str) -> Invoice {
        let now = Utc::now();
        Invoice {
            id: id.to_string(),
            serial_number: 1,
            user_id: None,
            payment_id: None,
            status: InvoiceStatus::Open,
            total_amount_cents: 0,
            rest_cents: 0,
            date_of_issue: now,
            created_at: now,
            updated_at: now,
        }
    }

    fn payment(id: &str, invoice_id: &str) -> Payment {
        Payment {
            id: id.to_string(),
            invoice_id: invoice_id.to_string(),
            kind: PaymentKind::Cash,
            amount_cents: 500,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_link_payment_sets_id() {
        let mut inv = invoice("inv-1");
        let replaced = inv.link_payment(&payment("pay-1", "inv-1")).unwrap();

        assert_eq!(replaced, None);
        assert_eq!(inv.payment_id.as_deref(), Some("pay-1"));
    }

    #[test]
    fn test_link_second_payment_replaces_first() {
        let mut inv = invoice("inv-1");
        inv.link_payment(&payment("pay-1", "inv-1")).unwrap();
        let replaced = inv.link_payment(&payment("pay-2", "inv-1")).unwrap();

        // The old id comes back and exactly one payment remains linked.
        assert_eq!(replaced.as_deref(), Some("pay-1"));
        assert_eq!(inv.payment_id.as_deref(), Some("pay-2"));
    }

    #[test]
    fn test_link_foreign_payment_rejected() {
        let mut inv = invoice("inv-1");
        let err = inv.link_payment(&payment("pay-1", "inv-2")).unwrap_err();
        assert!(matches!(err, CoreError::PaymentNotOwned { .. }));
        assert_eq!(inv.payment_id, None);
    }

    #[test]
    fn test_unlink_payment() {
        let mut inv = invoice("inv-1");
        inv.link_payment(&payment("pay-1", "inv-1")).unwrap();

        let removed = inv.unlink_payment().unwrap();
        assert_eq!(removed.as_deref(), Some("pay-1"));
        assert_eq!(inv.payment_id, None);

        // Unlinking again is a no-op.
        assert_eq!(inv.unlink_payment().unwrap(), None);
    }

    #[test]
    fn test_finalized_invoice_rejects_link_and_unlink() {
        let mut inv = invoice("inv-1");
        inv.status = InvoiceStatus::Finalized;

        let err = inv.link_payment(&payment("pay-1", "inv-1")).unwrap_err();
        assert!(matches!(err, CoreError::InvoiceFinalized { .. }));
        assert!(matches!(
            inv.unlink_payment().unwrap_err(),
            CoreError::InvoiceFinalized { .. }
        ));
    }

    #[test]
    fn test_payment_kind_labels() {
        assert_eq!(PaymentKind::Cash.to_string(), "cash");
        assert_eq!(PaymentKind::Cashless.to_string(), "cashless");
    }

    #[test]
    fn test_product_line_money_accessors() {
        let line = ProductLine {
            id: "line-1".to_string(),
            invoice_id: "inv-1".to_string(),
            position: 0,
            title: "Bread".to_string(),
            stock: 2,
            price_cents: 150,
            line_total_cents: 300,
        };
        assert_eq!(line.price(), Money::from_cents(150));
        assert_eq!(line.line_total(), Money::from_cents(300));
    }
}
