//! # Totals Module
//!
//! Pure computation of line totals, the invoice total, and change.
//!
//! All arithmetic runs on integer cents, so line totals are exact and the
//! grand total is the exact sum of full-precision line totals. No
//! per-line rounding happens anywhere, and summation order cannot
//! change the result.

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::ProductLine;

// =============================================================================
// Totals
// =============================================================================

/// The computed amounts for an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Totals {
    /// Sum of all line totals.
    pub total_products: Money,
    /// Amount due. Equals `total_products`; the core models no discount
    /// or payment adjustment.
    pub total_amount: Money,
}

/// Computes one line total (`stock × price`).
///
/// Validates the inputs before computing anything: a negative quantity is
/// `InvalidQuantity`, a negative price `InvalidPrice`. Zero is allowed
/// for both.
pub fn line_total(stock: i64, price: Money) -> CoreResult<Money> {
    if stock < 0 {
        return Err(CoreError::InvalidQuantity { stock });
    }
    if price.is_negative() {
        return Err(CoreError::InvalidPrice {
            cents: price.cents(),
        });
    }

    Ok(price.multiply_quantity(stock))
}

/// Sums the line totals of an invoice.
///
/// Lines are expected to carry already-validated `line_total_cents`
/// (see [`line_total`]); summation order does not matter.
pub fn invoice_total(lines: &[ProductLine]) -> Totals {
    let total_products = lines
        .iter()
        .fold(Money::zero(), |acc, line| acc + line.line_total());

    Totals {
        total_products,
        total_amount: total_products,
    }
}

// =============================================================================
// Change
// =============================================================================

/// The change ("rest") owed after a payment.
///
/// A negative rest means the payment was insufficient. The value is
/// reported as-is, never clamped or hidden, and [`Change::is_short`]
/// signals the advisory payment-mismatch condition; callers decide
/// whether to block finalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Change {
    pub rest: Money,
}

impl Change {
    /// Zero change: no payment linked, or an exact payment.
    #[inline]
    pub const fn none() -> Self {
        Change {
            rest: Money::zero(),
        }
    }

    /// True when the payment does not cover the amount due.
    #[inline]
    pub const fn is_short(&self) -> bool {
        self.rest.is_negative()
    }
}

/// Computes the change for a payment: `paid − total_amount`.
pub fn compute_change(total_amount: Money, paid: Money) -> Change {
    Change {
        rest: paid - total_amount,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn line(position: i64, title: &str, stock: i64, price_cents: i64) -> ProductLine {
        ProductLine {
            id: format!("line-{position}"),
            invoice_id: "inv-1".to_string(),
            position,
            title: title.to_string(),
            stock,
            price_cents,
            line_total_cents: line_total(stock, Money::from_cents(price_cents))
                .unwrap()
                .cents(),
        }
    }

    #[test]
    fn test_line_total() {
        assert_eq!(
            line_total(2, Money::from_cents(150)).unwrap(),
            Money::from_cents(300)
        );
        assert_eq!(
            line_total(0, Money::from_cents(150)).unwrap(),
            Money::zero()
        );
    }

    #[test]
    fn test_line_total_rejects_negative_quantity() {
        let err = line_total(-1, Money::from_cents(100)).unwrap_err();
        assert!(matches!(err, CoreError::InvalidQuantity { stock: -1 }));
    }

    #[test]
    fn test_line_total_rejects_negative_price() {
        let err = line_total(1, Money::from_cents(-100)).unwrap_err();
        assert!(matches!(err, CoreError::InvalidPrice { cents: -100 }));
    }

    #[test]
    fn test_invoice_total_is_exact_sum() {
        let lines = vec![line(0, "Bread", 2, 150), line(1, "Milk", 1, 200)];
        let totals = invoice_total(&lines);

        assert_eq!(totals.total_products, Money::from_cents(500));
        assert_eq!(totals.total_amount, Money::from_cents(500));
    }

    #[test]
    fn test_invoice_total_is_order_independent() {
        let forward = vec![line(0, "A", 3, 299), line(1, "B", 7, 101), line(2, "C", 1, 9999)];
        let mut reversed = forward.clone();
        reversed.reverse();

        assert_eq!(invoice_total(&forward), invoice_total(&reversed));
    }

    #[test]
    fn test_invoice_total_empty_is_zero() {
        let totals = invoice_total(&[]);
        assert!(totals.total_amount.is_zero());
    }

    #[test]
    fn test_change_exact_overpay_and_shortfall() {
        // total 80.00, paid 100.00 -> rest 20.00
        let change = compute_change(Money::from_cents(8000), Money::from_cents(10000));
        assert_eq!(change.rest, Money::from_cents(2000));
        assert!(!change.is_short());

        // total 80.00, paid 60.00 -> rest -40.00, advisory shortfall
        let change = compute_change(Money::from_cents(8000), Money::from_cents(6000));
        assert_eq!(change.rest, Money::from_cents(-4000));
        assert!(change.is_short());

        // exact payment
        let change = compute_change(Money::from_cents(500), Money::from_cents(500));
        assert!(change.rest.is_zero());
        assert!(!change.is_short());
    }

    #[test]
    fn test_change_none_is_zero() {
        assert!(Change::none().rest.is_zero());
        assert!(!Change::none().is_short());
    }
}
