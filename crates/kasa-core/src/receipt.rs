//! # Receipt Renderer
//!
//! Formats an invoice, its product lines, and its payment into the
//! canonical printable receipt text.
//!
//! Rendering is a pure function: identical inputs always produce
//! byte-identical output. The layout is fixed-width with a right-aligned
//! amount column:
//!
//! ```text
//!           ФОП Джонсонюк Борис
//! ========================================
//!                 ЧЕК №42
//! ========================================
//! 2.00 x 1.50                         3.00
//! Bread                               3.00
//! ----------------------------------------
//! ========================================
//! СУМА                                5.00
//! cash                                5.00
//! РЕШТА                               0.00
//! ========================================
//!             07.03.2025 14:30
//!           Дякуємо за покупку!
//! ```
//!
//! The payment line appears only when a payment is linked; the РЕШТА
//! (change) line is always present and reads `0.00` when there is no
//! payment or the payment is exact.

use crate::money::Money;
use crate::totals;
use crate::types::{Invoice, Payment, ProductLine};

/// Default receipt width in characters, matching the original till paper.
pub const DEFAULT_WIDTH: usize = 40;

/// Width of the right-aligned amount column.
const AMOUNT_COL: usize = 10;

/// Shop header printed at the top of every receipt.
const DEFAULT_SHOP_NAME: &str = "ФОП Джонсонюк Борис";

const HEADER_PREFIX: &str = "ЧЕК №";
const TOTAL_LABEL: &str = "СУМА";
const REST_LABEL: &str = "РЕШТА";
const FOOTER: &str = "Дякуємо за покупку!";

// =============================================================================
// Configuration
// =============================================================================

/// Receipt rendering configuration.
#[derive(Debug, Clone)]
pub struct ReceiptConfig {
    /// Shop name centered at the top of the receipt.
    pub shop_name: String,
    /// Display width in characters. Must exceed the amount column (10).
    pub width: usize,
}

impl ReceiptConfig {
    /// Creates a configuration with the given shop name and default width.
    pub fn new(shop_name: impl Into<String>) -> Self {
        ReceiptConfig {
            shop_name: shop_name.into(),
            width: DEFAULT_WIDTH,
        }
    }

    /// Sets the display width.
    pub fn width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }
}

impl Default for ReceiptConfig {
    fn default() -> Self {
        ReceiptConfig::new(DEFAULT_SHOP_NAME)
    }
}

// =============================================================================
// Rendering
// =============================================================================

/// Renders the canonical receipt text for an invoice.
///
/// Product lines print in the order given (the repository returns them in
/// `position` order). The change line recomputes `rest` from the payment
/// and the invoice's amount due, so the text never disagrees with the
/// amounts it displays.
pub fn render(
    config: &ReceiptConfig,
    invoice: &Invoice,
    lines: &[ProductLine],
    payment: Option<&Payment>,
) -> String {
    let width = config.width;
    let divider = "=".repeat(width);
    let sub_divider = "-".repeat(width);

    let mut out: Vec<String> = Vec::with_capacity(lines.len() * 3 + 10);

    out.push(centered(&config.shop_name, width));
    out.push(divider.clone());
    out.push(centered(
        &format!("{}{}", HEADER_PREFIX, invoice.serial_number),
        width,
    ));
    out.push(divider.clone());

    for line in lines {
        let qty_price = format!("{}.00 x {}", line.stock, line.price());
        out.push(amount_line(&qty_price, line.line_total(), width));
        out.push(amount_line(&line.title, line.line_total(), width));
        out.push(sub_divider.clone());
    }

    out.push(divider.clone());

    let totals = totals::invoice_total(lines);
    out.push(amount_line(TOTAL_LABEL, totals.total_products, width));

    let rest = match payment {
        Some(payment) => {
            out.push(amount_line(
                &payment.kind.to_string(),
                invoice.total_amount(),
                width,
            ));
            totals::compute_change(invoice.total_amount(), payment.amount()).rest
        }
        None => Money::zero(),
    };
    out.push(amount_line(REST_LABEL, rest, width));

    out.push(divider);
    out.push(centered(
        &invoice.date_of_issue.format("%d.%m.%Y %H:%M").to_string(),
        width,
    ));
    out.push(centered(FOOTER, width));

    out.join("\n")
}

/// Centers `text` within `width` characters (extra padding on the right).
fn centered(text: &str, width: usize) -> String {
    format!("{text:^width$}")
}

/// A label padded left plus an amount right-aligned in the last column.
fn amount_line(label: &str, amount: Money, width: usize) -> String {
    let left = width.saturating_sub(AMOUNT_COL);
    format!("{label:<left$}{:>AMOUNT_COL$}", amount.to_string())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{InvoiceStatus, PaymentKind};
    use chrono::{TimeZone, Utc};

    fn line(position: i64, title: &str, stock: i64, price_cents: i64) -> ProductLine {
        ProductLine {
            id: format!("line-{position}"),
            invoice_id: "inv-1".to_string(),
            position,
            title: title.to_string(),
            stock,
            price_cents,
            line_total_cents: stock * price_cents,
        }
    }

    fn invoice(serial: i64, total_cents: i64, rest_cents: i64) -> Invoice {
        let issued = Utc.with_ymd_and_hms(2025, 3, 7, 14, 30, 0).unwrap();
        Invoice {
            id: "inv-1".to_string(),
            serial_number: serial,
            user_id: None,
            payment_id: None,
            status: InvoiceStatus::Open,
            total_amount_cents: total_cents,
            rest_cents,
            date_of_issue: issued,
            created_at: issued,
            updated_at: issued,
        }
    }

    fn cash_payment(amount_cents: i64) -> Payment {
        Payment {
            id: "pay-1".to_string(),
            invoice_id: "inv-1".to_string(),
            kind: PaymentKind::Cash,
            amount_cents,
            created_at: Utc.with_ymd_and_hms(2025, 3, 7, 14, 30, 0).unwrap(),
        }
    }

    /// The end-to-end example: Bread 2 x 1.50, Milk 1 x 2.00, cash 5.00.
    /// Expected lines are spelled out with explicit padding so any layout
    /// regression shows up as a byte difference.
    #[test]
    fn test_render_golden_receipt() {
        let config = ReceiptConfig::default();
        let inv = invoice(42, 500, 0);
        let lines = vec![line(0, "Bread", 2, 150), line(1, "Milk", 1, 200)];
        let payment = cash_payment(500);

        let divider = "=".repeat(40);
        let sub_divider = "-".repeat(40);
        let expected = [
            format!("{}ФОП Джонсонюк Борис{}", " ".repeat(10), " ".repeat(11)),
            divider.clone(),
            format!("{}ЧЕК №42{}", " ".repeat(16), " ".repeat(17)),
            divider.clone(),
            format!("2.00 x 1.50{}3.00", " ".repeat(25)),
            format!("Bread{}3.00", " ".repeat(31)),
            sub_divider.clone(),
            format!("1.00 x 2.00{}2.00", " ".repeat(25)),
            format!("Milk{}2.00", " ".repeat(32)),
            sub_divider,
            divider.clone(),
            format!("СУМА{}5.00", " ".repeat(32)),
            format!("cash{}5.00", " ".repeat(32)),
            format!("РЕШТА{}0.00", " ".repeat(31)),
            divider,
            format!("{}07.03.2025 14:30{}", " ".repeat(12), " ".repeat(12)),
            format!("{}Дякуємо за покупку!{}", " ".repeat(10), " ".repeat(11)),
        ]
        .join("\n");

        let text = render(&config, &inv, &lines, Some(&payment));
        assert_eq!(text, expected);
    }

    #[test]
    fn test_render_is_deterministic() {
        let config = ReceiptConfig::default();
        let inv = invoice(7, 300, 200);
        let lines = vec![line(0, "Bread", 2, 150)];
        let payment = cash_payment(500);

        let first = render(&config, &inv, &lines, Some(&payment));
        let second = render(&config, &inv, &lines, Some(&payment));
        assert_eq!(first, second);
    }

    #[test]
    fn test_render_without_payment_skips_payment_line() {
        let config = ReceiptConfig::default();
        let inv = invoice(3, 300, 0);
        let lines = vec![line(0, "Bread", 2, 150)];

        let text = render(&config, &inv, &lines, None);
        let rendered: Vec<&str> = text.lines().collect();

        // 4 header lines, one product block of 3, divider, СУМА, РЕШТА,
        // divider, date, footer; no payment line.
        assert_eq!(rendered.len(), 13);
        assert!(!text.contains("cash"));
        assert!(text.contains("РЕШТА"));
        assert!(rendered[9].starts_with("РЕШТА"));
        assert!(rendered[9].ends_with("0.00"));
    }

    #[test]
    fn test_render_shows_negative_rest_for_short_payment() {
        let config = ReceiptConfig::default();
        let inv = invoice(9, 8000, -4000);
        let lines = vec![line(0, "Cheese", 4, 2000)];
        let payment = cash_payment(4000);

        let text = render(&config, &inv, &lines, Some(&payment));
        let rest_line = text
            .lines()
            .find(|l| l.starts_with("РЕШТА"))
            .expect("rest line present");
        assert!(rest_line.ends_with("-40.00"));
    }

    #[test]
    fn test_render_respects_line_order() {
        let config = ReceiptConfig::default();
        let inv = invoice(5, 500, 0);
        let lines = vec![line(0, "Milk", 1, 200), line(1, "Bread", 2, 150)];

        let text = render(&config, &inv, &lines, None);
        let milk = text.find("Milk").unwrap();
        let bread = text.find("Bread").unwrap();
        assert!(milk < bread);
    }

    #[test]
    fn test_render_custom_width_and_shop_name() {
        let config = ReceiptConfig::new("Крамниця").width(32);
        let inv = invoice(1, 200, 0);
        let lines = vec![line(0, "Milk", 1, 200)];

        let text = render(&config, &inv, &lines, None);
        for rendered in text.lines() {
            // every structural line fits the configured width
            if rendered.starts_with('=') || rendered.starts_with('-') {
                assert_eq!(rendered.chars().count(), 32);
            }
        }
        assert!(text.lines().next().unwrap().contains("Крамниця"));
    }
}
