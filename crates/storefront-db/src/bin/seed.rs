//! # Seed Data Generator
//!
//! Populates the catalog with demo products for development.
//!
//! ## Usage
//! ```bash
//! # Generate 50 products (default)
//! cargo run -p storefront-db --bin seed
//!
//! # Generate custom amount into a specific file
//! cargo run -p storefront-db --bin seed -- --count 200 --db ./data/storefront.db
//! ```
//!
//! Seeding is skipped when the catalog already has products.

use chrono::Utc;
use std::env;
use storefront_core::{Product, ProductDraft};
use storefront_db::{Database, DbConfig};

/// Product families and base prices in cents.
const FAMILIES: &[(&str, i64)] = &[
    ("Desk Lamp", 2499),
    ("Notebook", 399),
    ("Water Bottle", 1299),
    ("Backpack", 4999),
    ("Headphones", 7999),
    ("Coffee Mug", 899),
    ("Phone Case", 1599),
    ("Mechanical Keyboard", 11999),
    ("Wireless Mouse", 2999),
    ("Sticker Pack", 250),
];

/// Variants and their price add-on in cents.
const VARIANTS: &[(&str, i64)] = &[
    ("Black", 0),
    ("White", 0),
    ("Blue", 100),
    ("Red", 100),
    ("Limited Edition", 1500),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 50;
    let mut db_path = String::from("./storefront.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse()?;
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
                println!("Storefront Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of products to generate (default: 50)");
                println!("  -d, --db <PATH>    Database file path (default: ./storefront.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            other => {
                eprintln!("Ignoring unknown argument: {}", other);
            }
        }
        i += 1;
    }

    println!("Storefront Seed Data Generator");
    println!("==============================");
    println!("Database: {}", db_path);
    println!("Products: {}", count);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database, migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        return Ok(());
    }

    let start = std::time::Instant::now();
    let mut generated = 0;

    for n in 0..count {
        let product = generate_product(n);
        if let Err(e) = db.products().insert(&product).await {
            eprintln!("Failed to insert {}: {}", product.name, e);
            continue;
        }
        generated += 1;
    }

    println!();
    println!("✓ Generated {} products in {:?}", generated, start.elapsed());

    db.close().await;
    Ok(())
}

/// Builds the `n`th demo product. Deterministic for a given `n`.
fn generate_product(n: usize) -> Product {
    let (family, base_price) = FAMILIES[n % FAMILIES.len()];
    let (variant, addon) = VARIANTS[(n / FAMILIES.len()) % VARIANTS.len()];
    let batch = n / (FAMILIES.len() * VARIANTS.len());

    let name = if batch == 0 {
        format!("{} ({})", family, variant)
    } else {
        format!("{} ({}) #{}", family, variant, batch + 1)
    };

    ProductDraft {
        description: format!("{} in {}, demo catalog item.", family, variant.to_lowercase()),
        name,
        price_cents: base_price + addon,
        stock: ((n * 37) % 100) as i64,
    }
    .into_product(Utc::now())
}
