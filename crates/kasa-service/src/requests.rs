//! # Request and Response DTOs
//!
//! Serializable shapes for the service API. Field names are camelCase on
//! the wire; monetary values travel as integer cents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use kasa_core::{Invoice, InvoiceStatus, Payment, PaymentKind, ProductLine};

// =============================================================================
// Requests
// =============================================================================

/// One product line in a create/update request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductLineInput {
    pub title: String,
    /// Quantity purchased. Zero is allowed, negative is rejected.
    pub stock: i64,
    /// Unit price in cents.
    pub price_cents: i64,
}

/// Payment details in a create/update request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInput {
    pub kind: PaymentKind,
    /// Amount tendered, in cents.
    pub amount_cents: i64,
}

/// Request to create a new invoice.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInvoiceRequest {
    /// Optional owning actor; pass-through for display and filtering.
    #[serde(default)]
    pub user_id: Option<String>,
    /// Product lines in display order. At least one is required.
    pub products: Vec<ProductLineInput>,
    /// Optional payment. An invoice has zero or one payment.
    #[serde(default)]
    pub payment: Option<PaymentInput>,
}

/// How an update treats the invoice's payment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PaymentPatch {
    /// Leave the current payment (or its absence) as is.
    #[default]
    Keep,
    /// Replace the current payment with a new one. The swap is atomic:
    /// there is never a moment with two payments linked.
    Replace(PaymentInput),
    /// Remove the current payment.
    Clear,
}

/// Request to update an open invoice.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateInvoiceRequest {
    /// Replacement product lines. `None` keeps the existing lines.
    #[serde(default)]
    pub products: Option<Vec<ProductLineInput>>,
    /// Payment change to apply.
    #[serde(default)]
    pub payment: PaymentPatch,
}

// =============================================================================
// Responses
// =============================================================================

/// One product line as returned to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductLineDto {
    pub id: String,
    pub position: i64,
    pub title: String,
    pub stock: i64,
    pub price_cents: i64,
    pub line_total_cents: i64,
}

impl From<ProductLine> for ProductLineDto {
    fn from(line: ProductLine) -> Self {
        ProductLineDto {
            id: line.id,
            position: line.position,
            title: line.title,
            stock: line.stock,
            price_cents: line.price_cents,
            line_total_cents: line.line_total_cents,
        }
    }
}

/// A payment as returned to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDto {
    pub id: String,
    pub kind: PaymentKind,
    pub amount_cents: i64,
}

impl From<Payment> for PaymentDto {
    fn from(payment: Payment) -> Self {
        PaymentDto {
            id: payment.id,
            kind: payment.kind,
            amount_cents: payment.amount_cents,
        }
    }
}

/// Full invoice shape returned by create/get/update.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceResponse {
    pub id: String,
    pub serial_number: i64,
    pub user_id: Option<String>,
    pub status: InvoiceStatus,
    /// Sum of line totals, in cents.
    pub total_products_cents: i64,
    /// Amount due, in cents.
    pub total_amount_cents: i64,
    /// Change: payment minus amount due. Negative when the payment is
    /// short; zero when there is no payment.
    pub rest_cents: i64,
    /// Advisory flag: a payment is linked but does not cover the total.
    /// Creation and update succeed anyway; rendering is blocked.
    pub payment_short: bool,
    pub date_of_issue: DateTime<Utc>,
    pub products: Vec<ProductLineDto>,
    pub payment: Option<PaymentDto>,
}

impl InvoiceResponse {
    /// Assembles a response from stored rows.
    pub fn from_parts(
        invoice: Invoice,
        lines: Vec<ProductLine>,
        payment: Option<Payment>,
    ) -> Self {
        let payment_short = payment.is_some() && invoice.rest_cents < 0;

        InvoiceResponse {
            id: invoice.id,
            serial_number: invoice.serial_number,
            user_id: invoice.user_id,
            status: invoice.status,
            total_products_cents: invoice.total_amount_cents,
            total_amount_cents: invoice.total_amount_cents,
            rest_cents: invoice.rest_cents,
            payment_short,
            date_of_issue: invoice.date_of_issue,
            products: lines.into_iter().map(ProductLineDto::from).collect(),
            payment: payment.map(PaymentDto::from),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_deserializes_camel_case() {
        let json = r#"{
            "userId": "user-1",
            "products": [{"title": "Bread", "stock": 2, "priceCents": 150}],
            "payment": {"kind": "cash", "amountCents": 500}
        }"#;

        let req: CreateInvoiceRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.user_id.as_deref(), Some("user-1"));
        assert_eq!(req.products.len(), 1);
        assert_eq!(req.products[0].price_cents, 150);
        assert_eq!(req.payment.as_ref().unwrap().kind, PaymentKind::Cash);
    }

    #[test]
    fn test_create_request_optional_fields_default() {
        let json = r#"{"products": [{"title": "Milk", "stock": 1, "priceCents": 200}]}"#;

        let req: CreateInvoiceRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.user_id, None);
        assert!(req.payment.is_none());
    }

    #[test]
    fn test_update_request_defaults_to_keep() {
        let json = r#"{}"#;
        let req: UpdateInvoiceRequest = serde_json::from_str(json).unwrap();
        assert!(req.products.is_none());
        assert!(matches!(req.payment, PaymentPatch::Keep));
    }

    #[test]
    fn test_payment_patch_variants_deserialize() {
        let replace: PaymentPatch =
            serde_json::from_str(r#"{"replace": {"kind": "cashless", "amountCents": 1000}}"#)
                .unwrap();
        assert!(matches!(replace, PaymentPatch::Replace(_)));

        let clear: PaymentPatch = serde_json::from_str(r#""clear""#).unwrap();
        assert!(matches!(clear, PaymentPatch::Clear));
    }
}
