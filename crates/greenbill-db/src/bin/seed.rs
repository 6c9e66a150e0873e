//! # Catalog Seed Tool
//!
//! Populates a development catalog with graded products.
//!
//! ## Usage
//! ```bash
//! # Default catalog (every product, every pack size)
//! cargo run -p greenbill-db --bin seed
//!
//! # Cap the number of products
//! cargo run -p greenbill-db --bin seed -- --count 100
//!
//! # Specify database path
//! cargo run -p greenbill-db --bin seed -- --db ./data/greenbill.db
//! ```
//!
//! ## Generated Products
//! - Barcodes `590` + 10 digits (EAN-13 shaped, checksum not valid)
//! - Each family has a fixed eco-grade, so a scan session produces a
//!   predictable spread of carbon bands
//! - A handful of short demo barcodes (`111`, `222`, ...) for manual testing

use std::env;

use greenbill_core::validation::{validate_barcode, validate_product_name};
use greenbill_core::{EcoGrade, ProductInfo};
use greenbill_db::{Database, DbConfig};

/// Product families and the grade every member gets.
const FAMILIES: &[(EcoGrade, &[&str])] = &[
    (
        EcoGrade::A,
        &[
            "Oat Milk",
            "Lentils",
            "Seasonal Apples",
            "Carrots",
            "Tap-Water Refill",
            "Dried Chickpeas",
        ],
    ),
    (
        EcoGrade::B,
        &[
            "Wholemeal Bread",
            "Pasta Penne",
            "Tofu",
            "Brown Rice",
            "Peanut Butter",
            "Frozen Peas",
        ],
    ),
    (
        EcoGrade::C,
        &[
            "Cheddar",
            "Free-Range Eggs",
            "Greek Yogurt",
            "Chicken Breast",
            "Orange Juice",
            "Dark Chocolate",
        ],
    ),
    (
        EcoGrade::D,
        &[
            "Pork Sausages",
            "Butter",
            "Imported Asparagus",
            "Farmed Salmon",
            "Ground Coffee",
        ],
    ),
    (
        EcoGrade::E,
        &["Beef Mince", "Lamb Chops", "Air-Freighted Berries", "Ribeye Steak"],
    ),
];

const PACK_SIZES: &[&str] = &["Single", "Family Pack", "Value Pack"];

/// Short barcodes for trying the scanner by hand.
const DEMO_PRODUCTS: &[(&str, &str, EcoGrade)] = &[
    ("111", "Oat Milk 1L", EcoGrade::A),
    ("222", "Cheddar 200g", EcoGrade::C),
    ("333", "Beef Mince 500g", EcoGrade::E),
    ("444", "Rye Crackers", EcoGrade::B),
    ("555", "Frozen Pizza", EcoGrade::D),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut count: usize = usize::MAX;
    let mut db_path = String::from("./greenbill_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if let Some(value) = args.get(i + 1) {
                    count = value.parse()?;
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if let Some(value) = args.get(i + 1) {
                    db_path = value.clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Greenbill catalog seed tool");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Maximum generated products (demo products always added)");
                println!("  -d, --db <PATH>    Database file path (default: ./greenbill_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            other => {
                eprintln!("Ignoring unknown argument: {}", other);
            }
        }
        i += 1;
    }

    println!("Greenbill catalog seed");
    println!("======================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected, migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Catalog already has {} products, skipping.", existing);
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let repo = db.products();
    let start = std::time::Instant::now();

    for (barcode, name, grade) in DEMO_PRODUCTS {
        repo.upsert(barcode, &ProductInfo::new(*name, *grade)).await?;
    }

    let mut generated = 0usize;
    let mut rejected = 0usize;

    'families: for (family_idx, (grade, names)) in FAMILIES.iter().enumerate() {
        for (name_idx, name) in names.iter().enumerate() {
            for (size_idx, size) in PACK_SIZES.iter().enumerate() {
                if generated >= count {
                    break 'families;
                }

                let seq = family_idx * 1000 + name_idx * 10 + size_idx;
                let barcode = format!("590{:010}", seq);
                let full_name = format!("{} ({})", name, size);

                if let Err(e) = validate_barcode(&barcode)
                    .map(|_| ())
                    .and_then(|_| validate_product_name(&full_name))
                {
                    eprintln!("Rejected {}: {}", barcode, e);
                    rejected += 1;
                    continue;
                }

                repo.upsert(&barcode, &ProductInfo::new(full_name, *grade))
                    .await?;
                generated += 1;
            }
        }
    }

    println!();
    println!(
        "✓ Added {} demo + {} generated products in {:?}",
        DEMO_PRODUCTS.len(),
        generated,
        start.elapsed()
    );
    if rejected > 0 {
        println!("⚠ {} products rejected by validation", rejected);
    }

    for grade in [EcoGrade::A, EcoGrade::B, EcoGrade::C, EcoGrade::D, EcoGrade::E] {
        let in_grade = FAMILIES
            .iter()
            .filter(|(g, _)| *g == grade)
            .map(|(_, names)| names.len() * PACK_SIZES.len())
            .sum::<usize>();
        println!(
            "  {}  {:>3} products  {:>3} g CO2e / {:>2} pts per unit",
            grade,
            in_grade,
            grade.unit_carbon(),
            grade.unit_points()
        );
    }

    println!();
    println!("✓ Seed complete! Catalog size: {}", repo.count().await?);

    Ok(())
}
