//! # Seed Data Generator
//!
//! Populates the database with test invoices for development.
//!
//! ## Usage
//! ```bash
//! # Generate 25 invoices (default)
//! cargo run -p kasa-db --bin seed
//!
//! # Generate custom amount
//! cargo run -p kasa-db --bin seed -- --count 100
//!
//! # Specify database path
//! cargo run -p kasa-db --bin seed -- --db ./data/kasa.db
//! ```
//!
//! Each invoice gets 1-4 product lines drawn from a fixed catalog, a
//! serial from the allocator, and (for two out of three invoices) a
//! payment that covers the total with some change.

use chrono::Utc;
use std::env;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use kasa_core::{totals, Invoice, InvoiceStatus, Money, Payment, PaymentKind, ProductLine};
use kasa_db::{Database, DbConfig};

/// (title, unit price in cents) pairs for deterministic demo data.
const CATALOG: &[(&str, i64)] = &[
    ("Хліб", 150),
    ("Молоко", 200),
    ("Сир", 2000),
    ("Масло", 850),
    ("Яйця", 600),
    ("Кава", 1250),
    ("Цукор", 320),
    ("Вода", 110),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 25;
    let mut db_path = String::from("./kasa_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(25);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Kasa Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of invoices to generate (default: 25)");
                println!("  -d, --db <PATH>    Database file path (default: ./kasa_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Kasa Seed Data Generator");
    println!("===========================");
    println!("Database: {}", db_path);
    println!("Invoices: {}", count);
    println!();

    let config = DbConfig::new(&db_path);
    let db = Database::new(config).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.serials().current().await?;
    if existing > 0 {
        println!("⚠ Database already has {} issued serials", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Generating invoices...");

    let repo = db.invoices();
    let serials = db.serials();
    let start = std::time::Instant::now();

    for index in 0..count {
        let serial = serials.issue().await?;
        let invoice_id = Uuid::new_v4().to_string();
        let now = Utc::now();

        let line_count = 1 + index % 4;
        let lines: Vec<ProductLine> = (0..line_count)
            .map(|position| {
                let (title, price_cents) = CATALOG[(index + position) % CATALOG.len()];
                let stock = 1 + ((index + position) % 3) as i64;
                ProductLine {
                    id: Uuid::new_v4().to_string(),
                    invoice_id: invoice_id.clone(),
                    position: position as i64,
                    title: title.to_string(),
                    stock,
                    price_cents,
                    line_total_cents: stock * price_cents,
                }
            })
            .collect();

        let total = totals::invoice_total(&lines).total_amount;

        // Two out of three invoices carry a payment.
        let payment = if index % 3 != 0 {
            let kind = if index % 2 == 0 {
                PaymentKind::Cash
            } else {
                PaymentKind::Cashless
            };
            // Round the tendered amount up to the next whole unit.
            let tendered = Money::from_cents(((total.cents() + 99) / 100) * 100);
            Some(Payment {
                id: Uuid::new_v4().to_string(),
                invoice_id: invoice_id.clone(),
                kind,
                amount_cents: tendered.cents(),
                created_at: now,
            })
        } else {
            None
        };

        let rest = payment
            .as_ref()
            .map(|p| totals::compute_change(total, p.amount()).rest)
            .unwrap_or_else(Money::zero);

        let invoice = Invoice {
            id: invoice_id,
            serial_number: serial,
            user_id: Some(format!("user-{}", 1 + index % 3)),
            payment_id: payment.as_ref().map(|p| p.id.clone()),
            status: InvoiceStatus::Open,
            total_amount_cents: total.cents(),
            rest_cents: rest.cents(),
            date_of_issue: now,
            created_at: now,
            updated_at: now,
        };

        repo.create(&invoice, &lines, payment.as_ref()).await?;
    }

    let elapsed = start.elapsed();
    println!("✓ Generated {} invoices in {:.2?}", count, elapsed);
    println!();
    println!("Done.");

    Ok(())
}
