//! # Seed Data Generator
//!
//! Populates the database with test inventory for development.
//!
//! ## Usage
//! ```bash
//! # Generate 500 products (default)
//! cargo run -p stocklane-db --bin seed
//!
//! # Generate custom amount
//! cargo run -p stocklane-db --bin seed -- --count 2000
//!
//! # Specify database path
//! cargo run -p stocklane-db --bin seed -- --db ./data/stocklane.db
//! ```
//!
//! ## Generated Data
//! Creates realistic auto-parts inventory across categories:
//! - Engine (filters, plugs, belts)
//! - Brakes (pads, rotors, calipers)
//! - Suspension (shocks, struts, bushings)
//! - Electrical (batteries, alternators, sensors)
//! - Fluids (oils, coolants, cleaners)
//!
//! Each product has a deterministic pseudo-random price, stock level,
//! and low-stock threshold, plus a handful of suppliers and a few
//! expiry-dated fluid batches so the alert sweep has something to find.

use chrono::{Duration, Utc};
use std::env;
use stocklane_core::{Batch, Product, Supplier};
use stocklane_db::{Database, DbConfig};
use uuid::Uuid;

/// Default owner for seeded rows.
const SEED_USER_ID: &str = "seed-user";

/// Product categories for realistic test data
const CATEGORIES: &[(&str, &[&str])] = &[
    (
        "Engine",
        &[
            "Oil Filter",
            "Air Filter",
            "Fuel Filter",
            "Spark Plug",
            "Ignition Coil",
            "Timing Belt",
            "Serpentine Belt",
            "Water Pump",
            "Thermostat",
            "Valve Cover Gasket",
            "Head Gasket",
            "PCV Valve",
            "Engine Mount",
            "Camshaft Sensor",
            "Crankshaft Sensor",
        ],
    ),
    (
        "Brakes",
        &[
            "Brake Pad Set",
            "Brake Rotor",
            "Brake Caliper",
            "Brake Drum",
            "Brake Shoe Set",
            "Brake Line",
            "Master Cylinder",
            "Wheel Cylinder",
            "ABS Sensor",
            "Brake Hardware Kit",
        ],
    ),
    (
        "Suspension",
        &[
            "Shock Absorber",
            "Strut Assembly",
            "Coil Spring",
            "Control Arm",
            "Ball Joint",
            "Tie Rod End",
            "Sway Bar Link",
            "Bushing Kit",
            "Wheel Bearing",
            "CV Axle",
        ],
    ),
    (
        "Electrical",
        &[
            "Car Battery",
            "Alternator",
            "Starter Motor",
            "Oxygen Sensor",
            "MAF Sensor",
            "Headlight Bulb",
            "Tail Light Assembly",
            "Fuse Kit",
            "Relay",
            "Wiring Harness",
        ],
    ),
    (
        "Fluids",
        &[
            "Engine Oil 5W-30",
            "Engine Oil 10W-40",
            "Transmission Fluid",
            "Brake Fluid DOT4",
            "Coolant",
            "Power Steering Fluid",
            "Windshield Washer Fluid",
            "Carb Cleaner",
            "Penetrating Oil",
            "Grease Cartridge",
        ],
    ),
];

/// Manufacturer names cycled across products
const MANUFACTURERS: &[&str] = &[
    "Bosch", "Denso", "ACDelco", "Moog", "Monroe", "Wagner", "NGK", "Gates",
];

const SUPPLIERS: &[(&str, &str)] = &[
    ("Apex Auto Supply", "orders@apexauto.example"),
    ("Midland Parts Co", "sales@midlandparts.example"),
    ("Eastgate Distribution", "contact@eastgate.example"),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // RUST_LOG=debug surfaces pool and repository logging during seeding
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 500;
    let mut db_path = String::from("./stocklane_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(500);
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
                println!("Stocklane Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of products to generate (default: 500)");
                println!("  -d, --db <PATH>    Database file path (default: ./stocklane_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Stocklane Seed Data Generator");
    println!("================================");
    println!("Database: {}", db_path);
    println!("Products: {}", count);
    println!();

    // Connect to database
    let config = DbConfig::new(&db_path);
    let db = Database::new(config).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    // Check existing products
    let existing = db.products().count_by_user(SEED_USER_ID).await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    // Suppliers first so batches and links have something to reference
    for (name, email) in SUPPLIERS {
        let now = Utc::now();
        let supplier = Supplier {
            id: Uuid::new_v4().to_string(),
            user_id: SEED_USER_ID.to_string(),
            name: name.to_string(),
            contact_name: None,
            email: Some(email.to_string()),
            phone: None,
            address: None,
            notes: None,
            created_at: now,
            updated_at: now,
        };
        db.suppliers().insert(&supplier).await?;
    }
    println!("✓ Inserted {} suppliers", SUPPLIERS.len());

    // Generate products
    println!();
    println!("Generating products...");

    let mut generated = 0usize;
    let mut batches = 0usize;
    let start = std::time::Instant::now();

    'outer: loop {
        for (category, names) in CATEGORIES {
            for name in *names {
                if generated >= count {
                    break 'outer;
                }

                let product = generate_product(category, name, generated);
                let expiring = *category == "Fluids" && generated % 7 == 0;
                let product_id = product.id.clone();

                if let Err(e) = db.products().insert(&product).await {
                    eprintln!("Failed to insert {}: {}", product.name, e);
                    continue;
                }

                generated += 1;

                // Expiry-dated batches for a slice of the fluids so the
                // expiry sweep finds work in a fresh database.
                if expiring {
                    let now = Utc::now();
                    let batch = Batch {
                        id: Uuid::new_v4().to_string(),
                        user_id: SEED_USER_ID.to_string(),
                        product_id,
                        batch_number: format!("LOT-{:05}", generated),
                        quantity: 12,
                        manufactured_at: Some(now - Duration::days(300)),
                        expires_at: Some(now + Duration::days((generated % 60) as i64)),
                        received_at: now - Duration::days(30),
                        notes: None,
                        created_at: now,
                    };
                    db.batches().insert(&batch).await?;
                    batches += 1;
                }

                if generated % 100 == 0 {
                    println!("  Generated {} products...", generated);
                }
            }
        }
    }

    let elapsed = start.elapsed();
    println!();
    println!("✓ Generated {} products in {:?}", generated, elapsed);
    println!("✓ Generated {} expiry-dated batches", batches);
    println!(
        "  Rate: {:.0} products/second",
        generated as f64 / elapsed.as_secs_f64()
    );

    // Verify
    println!();
    let summary = db.products().inventory_summary(SEED_USER_ID).await?;
    println!("Inventory summary:");
    println!("  Products:      {}", summary.total_products);
    println!("  Units on hand: {}", summary.total_units);
    println!("  Stock value:   {} cents", summary.stock_value_cents);
    println!("  Low stock:     {}", summary.low_stock_count);
    println!("  Out of stock:  {}", summary.out_of_stock_count);

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Generates a single product with deterministic pseudo-random data.
fn generate_product(category: &str, name: &str, seed: usize) -> Product {
    let now = Utc::now();

    let manufacturer = MANUFACTURERS[seed % MANUFACTURERS.len()];
    let sku = format!(
        "{}-{:04}",
        &category[..3].to_uppercase(),
        seed
    );

    // Price: $4.99 - $204.99 in rough steps
    let price_cents = 499 + ((seed * 37) % 200) as i64 * 100;

    // Stock 0-60, with thresholds that leave some products already low
    let quantity = ((seed * 13) % 61) as i64;
    let low_stock_at = Some(5 + (seed % 10) as i64);

    Product {
        id: Uuid::new_v4().to_string(),
        user_id: SEED_USER_ID.to_string(),
        name: format!("{} {}", manufacturer, name),
        manufacturer: Some(manufacturer.to_string()),
        model: None,
        sku: Some(sku),
        quantity,
        low_stock_at,
        price_cents,
        category: Some(category.to_string()),
        supplier: None,
        specs: None,
        compatibility: None,
        notes: None,
        image_url: None,
        created_at: now,
        updated_at: now,
    }
}
