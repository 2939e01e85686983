//! # Seed Data Generator
//!
//! Populates the database with demo coupons for local use of the browser
//! client.
//!
//! ## Usage
//! ```bash
//! # Generate 25 coupons (default)
//! cargo run -p coupon-db --bin seed
//!
//! # Generate custom amount
//! cargo run -p coupon-db --bin seed -- --count 100
//!
//! # Specify database path
//! cargo run -p coupon-db --bin seed -- --db ./data/coupons.db
//! ```
//!
//! ## Generated Coupons
//! Codes follow `{PREFIX}{INDEX}` (e.g. `SPRING003`). Types rotate through
//! percentage, fixed amount and free shipping; expiry dates fall 30 to 365
//! days from today. Every coupon goes through the Coupon Store, so the
//! demo data obeys the same rules as API writes.

use std::env;

use anyhow::{bail, Context};
use chrono::{Duration, Utc};
use coupon_core::{CouponPayload, CouponType};
use coupon_db::{CouponBackend, Database, DbConfig, StoreError};
use serde_json::json;

const PREFIXES: &[&str] = &[
    "SPRING", "SUMMER", "AUTUMN", "WINTER", "WELCOME", "VIP", "FLASH", "LOYAL",
];

const STATUSES: &[&str] = &["active", "active", "active", "inactive", "expired"];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();
    let mut count: usize = 25;
    let mut db_path = String::from("./coupons.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1]
                        .parse()
                        .with_context(|| format!("invalid --count: {}", args[i + 1]))?;
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
                println!("Coupon Manager Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of coupons to generate (default: 25)");
                println!("  -d, --db <PATH>    Database file path (default: ./coupons.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            other => bail!("unknown argument: {other} (try --help)"),
        }
        i += 1;
    }

    println!("🌱 Coupon Manager Seed Data Generator");
    println!("====================================");
    println!("Database: {}", db_path);
    println!("Coupons:  {}", count);
    println!();

    let db = Database::new(DbConfig::new(&db_path))
        .await
        .context("failed to open database")?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.coupons().list().await?.len();
    if existing > 0 {
        println!("⚠ Database already has {} coupons", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Generating coupons...");

    let store = db.store();
    let start = std::time::Instant::now();
    let mut generated = 0;

    for index in 0..count {
        let payload = generate_coupon(index);
        match store.create(&payload).await {
            Ok(_) => generated += 1,
            Err(StoreError::Validation(errors)) => {
                eprintln!("Rejected coupon #{}: {}", index, errors);
            }
            Err(e) => return Err(e.into()),
        }
    }

    println!();
    println!("✓ Generated {} coupons in {:?}", generated, start.elapsed());

    db.close().await;
    println!("✓ Seed complete!");
    Ok(())
}

/// Builds a deterministic demo coupon for `index`.
fn generate_coupon(index: usize) -> CouponPayload {
    let prefix = PREFIXES[index % PREFIXES.len()];
    let coupon_type = CouponType::ALL[index % CouponType::ALL.len()];
    let status = STATUSES[index % STATUSES.len()];

    let value = match coupon_type {
        CouponType::Percentage => json!(5 + (index % 8) * 5),
        CouponType::FixedAmount => json!(2.5 * (1 + index % 10) as f64),
        CouponType::FreeShipping => json!(null),
    };

    let days = 30 + (index as i64 * 37) % 335;
    let expiry = (Utc::now() + Duration::days(days)).date_naive();

    CouponPayload {
        code: Some(json!(format!("{}{:03}", prefix, index))),
        coupon_type: Some(json!(coupon_type.as_str())),
        value: Some(value),
        status: Some(json!(status)),
        expiry_date: Some(json!(expiry.format("%Y-%m-%d").to_string())),
    }
}
