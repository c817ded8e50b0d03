//! # Invoice Repository
//!
//! Database operations for invoices, their product lines, and payments.
//!
//! ## Invoice Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      Invoice Lifecycle                               │
//! │                                                                      │
//! │  1. CREATE                                                           │
//! │     └── create() → invoice + lines + optional payment, one tx        │
//! │                                                                      │
//! │  2. UPDATE (open invoices only; enforced by the service)             │
//! │     └── update() → replace lines, keep/replace/clear payment,        │
//! │         rewrite derived totals, one tx                               │
//! │                                                                      │
//! │  3. FINALIZE                                                         │
//! │     └── mark_finalized() → status = 'finalized', products and        │
//! │         payment frozen                                               │
//! │                                                                      │
//! │  4. (OPTIONAL) DELETE                                                │
//! │     └── delete() → cascades to lines and payment; the serial is      │
//! │         never reused                                                 │
//! │                                                                      │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! Product lines carry their own title, quantity, and price. The receipt
//! reads only from this snapshot, so later catalog changes never rewrite
//! history.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use kasa_core::{Invoice, InvoiceSummary, Payment, ProductLine};

/// How [`InvoiceRepository::update`] should treat the payment row.
#[derive(Debug, Clone)]
pub enum PaymentUpdate {
    /// Leave the existing payment row untouched.
    Keep,
    /// Replace whatever payment exists with this one. The delete and
    /// insert happen in the same transaction, so there is never a moment
    /// with two payments on one invoice.
    Replace(Payment),
    /// Remove the payment row if one exists.
    Clear,
}

/// Repository for invoice database operations.
#[derive(Debug, Clone)]
pub struct InvoiceRepository {
    pool: SqlitePool,
}

impl InvoiceRepository {
    /// Creates a new InvoiceRepository.
    pub fn new(pool: SqlitePool) -> Self {
        InvoiceRepository { pool }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Gets an invoice by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Invoice>> {
        let invoice = sqlx::query_as::<_, Invoice>(
            r#"
            SELECT
                id, serial_number, user_id, payment_id, status,
                total_amount_cents, rest_cents,
                date_of_issue, created_at, updated_at
            FROM invoices
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(invoice)
    }

    /// Gets the product lines of an invoice in display order.
    pub async fn get_lines(&self, invoice_id: &str) -> DbResult<Vec<ProductLine>> {
        let lines = sqlx::query_as::<_, ProductLine>(
            r#"
            SELECT
                id, invoice_id, position, title, stock,
                price_cents, line_total_cents
            FROM invoice_products
            WHERE invoice_id = ?1
            ORDER BY position ASC
            "#,
        )
        .bind(invoice_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(lines)
    }

    /// Gets the payment linked to an invoice, if any.
    pub async fn get_payment(&self, invoice_id: &str) -> DbResult<Option<Payment>> {
        let payment = sqlx::query_as::<_, Payment>(
            r#"
            SELECT id, invoice_id, kind, amount_cents, created_at
            FROM payments
            WHERE invoice_id = ?1
            "#,
        )
        .bind(invoice_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(payment)
    }

    /// Lists one page of invoice summaries.
    ///
    /// Ordered by serial number, so pages are stable under the
    /// skip/limit scheme as long as no rows are inserted or deleted
    /// between fetches (the service invalidates its page cache on every
    /// mutation for exactly that reason).
    pub async fn list_page(&self, skip: i64, limit: i64) -> DbResult<Vec<InvoiceSummary>> {
        let rows = sqlx::query_as::<_, InvoiceSummary>(
            r#"
            SELECT id, serial_number, user_id, payment_id
            FROM invoices
            ORDER BY serial_number ASC
            LIMIT ?1 OFFSET ?2
            "#,
        )
        .bind(limit)
        .bind(skip)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Inserts a complete invoice in one transaction.
    ///
    /// The invoice row, all product lines, and the optional payment
    /// either all land or none do. The serial number must already have
    /// been issued by the allocator.
    pub async fn create(
        &self,
        invoice: &Invoice,
        lines: &[ProductLine],
        payment: Option<&Payment>,
    ) -> DbResult<()> {
        debug!(id = %invoice.id, serial = invoice.serial_number, "Inserting invoice");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO invoices (
                id, serial_number, user_id, payment_id, status,
                total_amount_cents, rest_cents,
                date_of_issue, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&invoice.id)
        .bind(invoice.serial_number)
        .bind(&invoice.user_id)
        .bind(&invoice.payment_id)
        .bind(invoice.status)
        .bind(invoice.total_amount_cents)
        .bind(invoice.rest_cents)
        .bind(invoice.date_of_issue)
        .bind(invoice.created_at)
        .bind(invoice.updated_at)
        .execute(&mut *tx)
        .await?;

        for line in lines {
            insert_line(&mut tx, line).await?;
        }

        if let Some(payment) = payment {
            insert_payment(&mut tx, payment).await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Rewrites an invoice's lines, payment, and derived totals in one
    /// transaction.
    ///
    /// The old product lines are removed and the new set inserted; a
    /// reader never observes a mix of both. Returns `NotFound` when the
    /// invoice does not exist.
    pub async fn update(
        &self,
        invoice: &Invoice,
        lines: &[ProductLine],
        payment: PaymentUpdate,
    ) -> DbResult<()> {
        debug!(id = %invoice.id, "Updating invoice");

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE invoices SET
                user_id = ?2,
                payment_id = ?3,
                total_amount_cents = ?4,
                rest_cents = ?5,
                updated_at = ?6
            WHERE id = ?1
            "#,
        )
        .bind(&invoice.id)
        .bind(&invoice.user_id)
        .bind(&invoice.payment_id)
        .bind(invoice.total_amount_cents)
        .bind(invoice.rest_cents)
        .bind(invoice.updated_at)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Invoice", &invoice.id));
        }

        sqlx::query("DELETE FROM invoice_products WHERE invoice_id = ?1")
            .bind(&invoice.id)
            .execute(&mut *tx)
            .await?;

        for line in lines {
            insert_line(&mut tx, line).await?;
        }

        match payment {
            PaymentUpdate::Keep => {}
            PaymentUpdate::Replace(new_payment) => {
                sqlx::query("DELETE FROM payments WHERE invoice_id = ?1")
                    .bind(&invoice.id)
                    .execute(&mut *tx)
                    .await?;
                insert_payment(&mut tx, &new_payment).await?;
            }
            PaymentUpdate::Clear => {
                sqlx::query("DELETE FROM payments WHERE invoice_id = ?1")
                    .bind(&invoice.id)
                    .execute(&mut *tx)
                    .await?;
            }
        }

        tx.commit().await?;
        Ok(())
    }

    /// Marks an invoice finalized.
    ///
    /// Called once the receipt has been rendered; afterwards the service
    /// refuses product and payment changes.
    pub async fn mark_finalized(&self, id: &str, at: DateTime<Utc>) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE invoices SET status = 'finalized', updated_at = ?2 WHERE id = ?1",
        )
        .bind(id)
        .bind(at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Invoice", id));
        }

        Ok(())
    }

    /// Deletes an invoice.
    ///
    /// Product lines and the payment go with it (ON DELETE CASCADE).
    /// Returns `false` when no such invoice existed. The serial number
    /// is not returned to the allocator.
    pub async fn delete(&self, id: &str) -> DbResult<bool> {
        debug!(id = %id, "Deleting invoice");

        let result = sqlx::query("DELETE FROM invoices WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

// =============================================================================
// Row Helpers
// =============================================================================

async fn insert_line(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    line: &ProductLine,
) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO invoice_products (
            id, invoice_id, position, title, stock,
            price_cents, line_total_cents
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
    )
    .bind(&line.id)
    .bind(&line.invoice_id)
    .bind(line.position)
    .bind(&line.title)
    .bind(line.stock)
    .bind(line.price_cents)
    .bind(line.line_total_cents)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

async fn insert_payment(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    payment: &Payment,
) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO payments (id, invoice_id, kind, amount_cents, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
    )
    .bind(&payment.id)
    .bind(&payment.invoice_id)
    .bind(payment.kind)
    .bind(payment.amount_cents)
    .bind(payment.created_at)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use kasa_core::{InvoiceStatus, PaymentKind};
    use uuid::Uuid;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn make_invoice(serial: i64) -> Invoice {
        let now = Utc::now();
        Invoice {
            id: Uuid::new_v4().to_string(),
            serial_number: serial,
            user_id: Some("user-1".to_string()),
            payment_id: None,
            status: InvoiceStatus::Open,
            total_amount_cents: 500,
            rest_cents: 0,
            date_of_issue: now,
            created_at: now,
            updated_at: now,
        }
    }

    fn make_line(invoice_id: &str, position: i64, title: &str) -> ProductLine {
        ProductLine {
            id: Uuid::new_v4().to_string(),
            invoice_id: invoice_id.to_string(),
            position,
            title: title.to_string(),
            stock: 2,
            price_cents: 150,
            line_total_cents: 300,
        }
    }

    fn make_payment(invoice_id: &str, amount_cents: i64) -> Payment {
        Payment {
            id: Uuid::new_v4().to_string(),
            invoice_id: invoice_id.to_string(),
            kind: PaymentKind::Cash,
            amount_cents,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_create_and_get_round_trip() {
        let db = test_db().await;
        let repo = db.invoices();

        let mut invoice = make_invoice(1);
        let payment = make_payment(&invoice.id, 500);
        invoice.payment_id = Some(payment.id.clone());
        let lines = vec![
            make_line(&invoice.id, 0, "Bread"),
            make_line(&invoice.id, 1, "Milk"),
        ];

        repo.create(&invoice, &lines, Some(&payment)).await.unwrap();

        let fetched = repo.get_by_id(&invoice.id).await.unwrap().unwrap();
        assert_eq!(fetched.serial_number, 1);
        assert_eq!(fetched.payment_id, Some(payment.id.clone()));
        assert_eq!(fetched.status, InvoiceStatus::Open);

        let fetched_lines = repo.get_lines(&invoice.id).await.unwrap();
        assert_eq!(fetched_lines.len(), 2);
        assert_eq!(fetched_lines[0].title, "Bread");
        assert_eq!(fetched_lines[1].title, "Milk");

        let fetched_payment = repo.get_payment(&invoice.id).await.unwrap().unwrap();
        assert_eq!(fetched_payment.amount_cents, 500);
    }

    #[tokio::test]
    async fn test_get_missing_returns_none() {
        let db = test_db().await;
        let repo = db.invoices();

        assert!(repo.get_by_id("nope").await.unwrap().is_none());
        assert!(repo.get_payment("nope").await.unwrap().is_none());
        assert!(repo.get_lines("nope").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_lines_come_back_in_position_order() {
        let db = test_db().await;
        let repo = db.invoices();

        let invoice = make_invoice(1);
        // Inserted out of order on purpose.
        let lines = vec![
            make_line(&invoice.id, 2, "C"),
            make_line(&invoice.id, 0, "A"),
            make_line(&invoice.id, 1, "B"),
        ];
        repo.create(&invoice, &lines, None).await.unwrap();

        let fetched = repo.get_lines(&invoice.id).await.unwrap();
        let titles: Vec<&str> = fetched.iter().map(|l| l.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "B", "C"]);
    }

    #[tokio::test]
    async fn test_duplicate_serial_rejected() {
        let db = test_db().await;
        let repo = db.invoices();

        let first = make_invoice(7);
        repo.create(&first, &[make_line(&first.id, 0, "Bread")], None)
            .await
            .unwrap();

        let second = make_invoice(7);
        let err = repo
            .create(&second, &[make_line(&second.id, 0, "Milk")], None)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_update_replaces_lines() {
        let db = test_db().await;
        let repo = db.invoices();

        let mut invoice = make_invoice(1);
        repo.create(&invoice, &[make_line(&invoice.id, 0, "Bread")], None)
            .await
            .unwrap();

        invoice.total_amount_cents = 200;
        let new_lines = vec![
            make_line(&invoice.id, 0, "Milk"),
            make_line(&invoice.id, 1, "Cheese"),
        ];
        repo.update(&invoice, &new_lines, PaymentUpdate::Keep)
            .await
            .unwrap();

        let fetched = repo.get_lines(&invoice.id).await.unwrap();
        let titles: Vec<&str> = fetched.iter().map(|l| l.title.as_str()).collect();
        assert_eq!(titles, vec!["Milk", "Cheese"]);

        let row = repo.get_by_id(&invoice.id).await.unwrap().unwrap();
        assert_eq!(row.total_amount_cents, 200);
    }

    #[tokio::test]
    async fn test_update_replaces_payment_atomically() {
        let db = test_db().await;
        let repo = db.invoices();

        let mut invoice = make_invoice(1);
        let first = make_payment(&invoice.id, 500);
        invoice.payment_id = Some(first.id.clone());
        let lines = vec![make_line(&invoice.id, 0, "Bread")];
        repo.create(&invoice, &lines, Some(&first)).await.unwrap();

        let second = make_payment(&invoice.id, 1000);
        invoice.payment_id = Some(second.id.clone());
        repo.update(&invoice, &lines, PaymentUpdate::Replace(second.clone()))
            .await
            .unwrap();

        // Exactly one payment row remains.
        let payment = repo.get_payment(&invoice.id).await.unwrap().unwrap();
        assert_eq!(payment.id, second.id);
        assert_eq!(payment.amount_cents, 1000);

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM payments")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_update_clears_payment() {
        let db = test_db().await;
        let repo = db.invoices();

        let mut invoice = make_invoice(1);
        let payment = make_payment(&invoice.id, 500);
        invoice.payment_id = Some(payment.id.clone());
        let lines = vec![make_line(&invoice.id, 0, "Bread")];
        repo.create(&invoice, &lines, Some(&payment)).await.unwrap();

        invoice.payment_id = None;
        repo.update(&invoice, &lines, PaymentUpdate::Clear)
            .await
            .unwrap();

        assert!(repo.get_payment(&invoice.id).await.unwrap().is_none());
        let row = repo.get_by_id(&invoice.id).await.unwrap().unwrap();
        assert_eq!(row.payment_id, None);
    }

    #[tokio::test]
    async fn test_update_missing_invoice_is_not_found() {
        let db = test_db().await;
        let repo = db.invoices();

        let invoice = make_invoice(1);
        let err = repo
            .update(&invoice, &[], PaymentUpdate::Keep)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_mark_finalized() {
        let db = test_db().await;
        let repo = db.invoices();

        let invoice = make_invoice(1);
        repo.create(&invoice, &[make_line(&invoice.id, 0, "Bread")], None)
            .await
            .unwrap();

        repo.mark_finalized(&invoice.id, Utc::now()).await.unwrap();

        let row = repo.get_by_id(&invoice.id).await.unwrap().unwrap();
        assert_eq!(row.status, InvoiceStatus::Finalized);
    }

    #[tokio::test]
    async fn test_delete_cascades_to_lines_and_payment() {
        let db = test_db().await;
        let repo = db.invoices();

        let mut invoice = make_invoice(1);
        let payment = make_payment(&invoice.id, 500);
        invoice.payment_id = Some(payment.id.clone());
        repo.create(
            &invoice,
            &[make_line(&invoice.id, 0, "Bread")],
            Some(&payment),
        )
        .await
        .unwrap();

        assert!(repo.delete(&invoice.id).await.unwrap());

        assert!(repo.get_by_id(&invoice.id).await.unwrap().is_none());
        assert!(repo.get_lines(&invoice.id).await.unwrap().is_empty());
        assert!(repo.get_payment(&invoice.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_missing_returns_false() {
        let db = test_db().await;
        assert!(!db.invoices().delete("nope").await.unwrap());
    }

    #[tokio::test]
    async fn test_list_page_skip_and_limit() {
        let db = test_db().await;
        let repo = db.invoices();

        for serial in 1..=5 {
            let invoice = make_invoice(serial);
            repo.create(&invoice, &[make_line(&invoice.id, 0, "Bread")], None)
                .await
                .unwrap();
        }

        // page 1, limit 2 -> serials 1, 2
        let page1 = repo.list_page(0, 2).await.unwrap();
        let serials: Vec<i64> = page1.iter().map(|s| s.serial_number).collect();
        assert_eq!(serials, vec![1, 2]);

        // page 3, limit 2 -> serial 5 only
        let page3 = repo.list_page(4, 2).await.unwrap();
        let serials: Vec<i64> = page3.iter().map(|s| s.serial_number).collect();
        assert_eq!(serials, vec![5]);

        // past the end -> empty
        assert!(repo.list_page(10, 2).await.unwrap().is_empty());
    }
}
