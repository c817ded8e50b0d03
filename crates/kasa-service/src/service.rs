//! # Invoice Service
//!
//! Orchestrates invoice operations end to end.
//!
//! ## Operation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      create_invoice(req)                             │
//! │                                                                      │
//! │  1. Validate request            ← nothing consumed on failure        │
//! │  2. Issue serial number         ← durable; a later failure leaves    │
//! │                                   a gap, never a duplicate           │
//! │  3. Compute totals and change   ← integer cents, exact               │
//! │  4. Persist invoice + lines +                                        │
//! │     payment in one transaction                                       │
//! │  5. Invalidate the page cache                                        │
//! │                                                                      │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Finalization
//! Rendering a receipt finalizes the invoice: products and payment are
//! frozen afterwards. Re-rendering a finalized invoice is allowed and
//! byte-stable.
//!
//! ## Payment Shortfall
//! A payment smaller than the amount due is accepted at create/update
//! time (the shortfall is advisory, surfaced as `paymentShort` and a
//! negative `restCents`) but blocks receipt rendering.

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use kasa_core::{
    receipt, totals, validation, CoreError, Invoice, InvoiceStatus, InvoiceSummary, Money,
    Payment, ProductLine, ReceiptConfig, ValidationError,
};
use kasa_db::{Database, PaymentUpdate};

use crate::error::{ApiError, ApiResult};
use crate::pager::{InvoicePage, InvoicePager, DEFAULT_PAGE_SIZE};
use crate::requests::{
    CreateInvoiceRequest, InvoiceResponse, PaymentInput, PaymentPatch, ProductLineInput,
    UpdateInvoiceRequest,
};

// =============================================================================
// Configuration
// =============================================================================

/// Service-level configuration.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Receipt rendering settings (shop name, paper width).
    pub receipt: ReceiptConfig,
    /// Listing page size.
    pub page_size: i64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        ServiceConfig {
            receipt: ReceiptConfig::default(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

// =============================================================================
// Service
// =============================================================================

/// The invoice service.
///
/// Cheap to clone; all handles share the same pool and page cache.
#[derive(Clone)]
pub struct InvoiceService {
    db: Database,
    receipt: ReceiptConfig,
    pager: InvoicePager,
}

impl InvoiceService {
    /// Creates a service with default configuration.
    pub fn new(db: Database) -> Self {
        InvoiceService::with_config(db, ServiceConfig::default())
    }

    /// Creates a service with explicit configuration.
    pub fn with_config(db: Database, config: ServiceConfig) -> Self {
        let pager = InvoicePager::new(db.invoices(), config.page_size);
        InvoiceService {
            db,
            receipt: config.receipt,
            pager,
        }
    }

    /// The listing pager. Exposed for cache-sensitive callers and tests.
    pub fn pager(&self) -> &InvoicePager {
        &self.pager
    }

    // =========================================================================
    // Create
    // =========================================================================

    /// Creates an invoice from validated request data.
    ///
    /// The serial number is issued only after the request passes
    /// validation, so a rejected request never burns a serial. A failure
    /// after issuance leaves a gap in the sequence, which is acceptable.
    pub async fn create_invoice(&self, req: CreateInvoiceRequest) -> ApiResult<InvoiceResponse> {
        debug!("create_invoice");

        let invoice_id = Uuid::new_v4().to_string();
        let lines = build_lines(&invoice_id, &req.products)?;
        let payment_input = req.payment.as_ref().map(validate_payment).transpose()?;

        // Everything below may consume the serial.
        let serial = self.db.serials().issue().await?;
        let now = Utc::now();

        let payment = payment_input.map(|input| Payment {
            id: Uuid::new_v4().to_string(),
            invoice_id: invoice_id.clone(),
            kind: input.kind,
            amount_cents: input.amount_cents,
            created_at: now,
        });

        let total = totals::invoice_total(&lines).total_amount;
        let rest = change_for(total, payment.as_ref());
        if rest.is_negative() {
            warn!(
                invoice_id = %invoice_id,
                total_cents = total.cents(),
                rest_cents = rest.cents(),
                "Payment does not cover the invoice total"
            );
        }

        let invoice = Invoice {
            id: invoice_id,
            serial_number: serial,
            user_id: req.user_id,
            payment_id: payment.as_ref().map(|p| p.id.clone()),
            status: InvoiceStatus::Open,
            total_amount_cents: total.cents(),
            rest_cents: rest.cents(),
            date_of_issue: now,
            created_at: now,
            updated_at: now,
        };

        self.db
            .invoices()
            .create(&invoice, &lines, payment.as_ref())
            .await?;
        self.pager.invalidate().await;

        info!(id = %invoice.id, serial, "Invoice created");
        Ok(InvoiceResponse::from_parts(invoice, lines, payment))
    }

    // =========================================================================
    // Read
    // =========================================================================

    /// Fetches a full invoice by ID.
    pub async fn get_invoice(&self, id: &str) -> ApiResult<InvoiceResponse> {
        validation::validate_invoice_id(id).map_err(CoreError::from)?;

        let (invoice, lines, payment) = self.load_invoice(id).await?;
        Ok(InvoiceResponse::from_parts(invoice, lines, payment))
    }

    /// Lists one page of invoice summaries, served through the page
    /// cache with background prefetch of the following page.
    pub async fn list_invoices(&self, page: u32) -> ApiResult<InvoicePage> {
        self.pager.load_page(page).await
    }

    /// Lists a raw skip/limit window of invoice summaries.
    ///
    /// Reads the store directly, bypassing the page cache. Callers that
    /// want caching and prefetch use [`InvoiceService::list_invoices`].
    pub async fn list(&self, skip: i64, limit: i64) -> ApiResult<Vec<InvoiceSummary>> {
        validation::validate_limit(limit).map_err(CoreError::from)?;
        if skip < 0 {
            return Err(CoreError::from(ValidationError::MustBeNonNegative {
                field: "skip".to_string(),
            })
            .into());
        }

        Ok(self.db.invoices().list_page(skip, limit).await?)
    }

    // =========================================================================
    // Update
    // =========================================================================

    /// Updates an open invoice: replaces products and/or applies a
    /// payment change, then recomputes the derived totals.
    pub async fn update_invoice(
        &self,
        id: &str,
        req: UpdateInvoiceRequest,
    ) -> ApiResult<InvoiceResponse> {
        debug!(id = %id, "update_invoice");
        validation::validate_invoice_id(id).map_err(CoreError::from)?;

        let (mut invoice, existing_lines, existing_payment) = self.load_invoice(id).await?;

        if invoice.is_finalized() {
            return Err(CoreError::InvoiceFinalized {
                invoice_id: invoice.id,
            }
            .into());
        }

        let lines = match &req.products {
            Some(inputs) => build_lines(&invoice.id, inputs)?,
            None => existing_lines,
        };

        let now = Utc::now();
        let (payment, payment_update) = match req.payment {
            PaymentPatch::Keep => (existing_payment, PaymentUpdate::Keep),
            PaymentPatch::Replace(input) => {
                let input = validate_payment(&input)?;
                let new_payment = Payment {
                    id: Uuid::new_v4().to_string(),
                    invoice_id: invoice.id.clone(),
                    kind: input.kind,
                    amount_cents: input.amount_cents,
                    created_at: now,
                };
                // Atomic swap at the domain level; the repository's
                // transaction mirrors it at the storage level.
                invoice.link_payment(&new_payment)?;
                (
                    Some(new_payment.clone()),
                    PaymentUpdate::Replace(new_payment),
                )
            }
            PaymentPatch::Clear => {
                invoice.unlink_payment()?;
                (None, PaymentUpdate::Clear)
            }
        };

        let total = totals::invoice_total(&lines).total_amount;
        let rest = change_for(total, payment.as_ref());
        if rest.is_negative() {
            warn!(
                invoice_id = %invoice.id,
                total_cents = total.cents(),
                rest_cents = rest.cents(),
                "Payment does not cover the invoice total"
            );
        }

        invoice.total_amount_cents = total.cents();
        invoice.rest_cents = rest.cents();
        invoice.updated_at = now;

        self.db
            .invoices()
            .update(&invoice, &lines, payment_update)
            .await?;
        self.pager.invalidate().await;

        info!(id = %invoice.id, "Invoice updated");
        Ok(InvoiceResponse::from_parts(invoice, lines, payment))
    }

    /// Removes the payment from an open invoice.
    pub async fn unlink_payment(&self, id: &str) -> ApiResult<InvoiceResponse> {
        self.update_invoice(
            id,
            UpdateInvoiceRequest {
                products: None,
                payment: PaymentPatch::Clear,
            },
        )
        .await
    }

    // =========================================================================
    // Delete
    // =========================================================================

    /// Deletes an invoice. Its serial number is never reused.
    pub async fn delete_invoice(&self, id: &str) -> ApiResult<()> {
        debug!(id = %id, "delete_invoice");
        validation::validate_invoice_id(id).map_err(CoreError::from)?;

        if !self.db.invoices().delete(id).await? {
            return Err(ApiError::not_found("Invoice", id));
        }
        self.pager.invalidate().await;

        info!(id = %id, "Invoice deleted");
        Ok(())
    }

    // =========================================================================
    // Receipt
    // =========================================================================

    /// Renders the receipt for an invoice and finalizes it.
    ///
    /// A linked payment that doesn't cover the total blocks rendering
    /// with `PAYMENT_MISMATCH`. Rendering an already finalized invoice
    /// returns the identical bytes again.
    pub async fn render_receipt(&self, id: &str) -> ApiResult<String> {
        debug!(id = %id, "render_receipt");
        validation::validate_invoice_id(id).map_err(CoreError::from)?;

        let (invoice, lines, payment) = self.load_invoice(id).await?;

        if payment.is_some() && invoice.rest_cents < 0 {
            return Err(ApiError::payment_mismatch(format!(
                "Payment is short by {}: cannot print a receipt",
                Money::from_cents(-invoice.rest_cents)
            )));
        }

        let text = receipt::render(&self.receipt, &invoice, &lines, payment.as_ref());

        if !invoice.is_finalized() {
            self.db.invoices().mark_finalized(id, Utc::now()).await?;
            self.pager.invalidate().await;
            info!(id = %id, serial = invoice.serial_number, "Invoice finalized");
        }

        Ok(text)
    }

    // =========================================================================
    // Internals
    // =========================================================================

    async fn load_invoice(
        &self,
        id: &str,
    ) -> ApiResult<(Invoice, Vec<ProductLine>, Option<Payment>)> {
        let repo = self.db.invoices();
        let invoice = repo
            .get_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Invoice", id))?;
        let lines = repo.get_lines(id).await?;
        let payment = repo.get_payment(id).await?;
        Ok((invoice, lines, payment))
    }
}

// =============================================================================
// Request Helpers
// =============================================================================

/// Validates line inputs and builds the stored rows with positions.
fn build_lines(invoice_id: &str, inputs: &[ProductLineInput]) -> ApiResult<Vec<ProductLine>> {
    validation::validate_product_count(inputs.len()).map_err(CoreError::from)?;

    let mut lines = Vec::with_capacity(inputs.len());
    for (position, input) in inputs.iter().enumerate() {
        validation::validate_title(&input.title).map_err(CoreError::from)?;
        let line_total = totals::line_total(input.stock, Money::from_cents(input.price_cents))?;

        lines.push(ProductLine {
            id: Uuid::new_v4().to_string(),
            invoice_id: invoice_id.to_string(),
            position: position as i64,
            title: input.title.trim().to_string(),
            stock: input.stock,
            price_cents: input.price_cents,
            line_total_cents: line_total.cents(),
        });
    }

    Ok(lines)
}

fn validate_payment(input: &PaymentInput) -> ApiResult<PaymentInput> {
    validation::validate_payment_amount(input.amount_cents).map_err(CoreError::from)?;
    Ok(input.clone())
}

fn change_for(total: Money, payment: Option<&Payment>) -> Money {
    match payment {
        Some(payment) => totals::compute_change(total, payment.amount()).rest,
        None => Money::zero(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
