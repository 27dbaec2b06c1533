//! # Seed Data Generator
//!
//! Populates the database with rooms and catalog products for development.
//!
//! ## Usage
//! ```bash
//! # Seed the default database (./relais.db)
//! cargo run -p relais-db --bin seed
//!
//! # Specify database path
//! cargo run -p relais-db --bin seed -- --db ./data/relais.db
//! ```
//!
//! ## Generated Data
//! - A floor of rooms across the three categories (Simple, Double, Suite)
//! - A small POS catalog (bar, kitchen, services) plus the lodging rows
//!   that never appear in catalog listings
//!
//! Safe to re-run: rooms that already exist are skipped.

use std::env;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use relais_db::{Database, DbConfig};

/// Rooms: (number, type, nightly price in cents)
const ROOMS: &[(&str, &str, i64)] = &[
    ("101", "Simple", 9500),
    ("102", "Simple", 9500),
    ("103", "Double", 12500),
    ("104", "Double", 12500),
    ("201", "Double", 13500),
    ("202", "Double", 13500),
    ("203", "Suite", 24000),
    ("204", "Suite", 26000),
];

/// Catalog: (name, unit price in cents, sale type, category)
const CATALOG: &[(&str, i64, &str, &str)] = &[
    ("Café", 200, "Vente Directe", "Bar"),
    ("Eau minérale", 250, "Vente Directe", "Bar"),
    ("Jus d'orange", 400, "Vente Directe", "Bar"),
    ("Bière pression", 500, "Vente Directe", "Bar"),
    ("Club sandwich", 1500, "Vente Directe", "Cuisine"),
    ("Plateau fromage", 1800, "Vente Directe", "Cuisine"),
    ("Menu du jour", 2500, "Vente Directe", "Cuisine"),
    ("Blanchisserie", 1200, "Service", "Services"),
    ("Navette aéroport", 3500, "Service", "Services"),
    // Lodging rows are billed through stays, never listed at the POS
    ("Nuitée Simple", 9500, "Hébergement", "Chambres"),
    ("Nuitée Double", 12500, "Hébergement", "Chambres"),
    ("Nuitée Suite", 24000, "Hébergement", "Chambres"),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let db_path = parse_db_path().unwrap_or_else(|| "./relais.db".to_string());

    info!(path = %db_path, "Seeding development database");

    let db = Database::new(DbConfig::new(&db_path)).await?;

    let mut rooms_created = 0;
    for &(number, room_type, price) in ROOMS {
        match db.rooms().insert(number, room_type, price).await {
            Ok(_) => rooms_created += 1,
            Err(err) if err.is_rejection() => {
                warn!(number, "Room already exists, skipping");
            }
            Err(err) => return Err(err.into()),
        }
    }

    let existing_products = db.products().count().await?;
    let mut products_created = 0;
    if existing_products == 0 {
        for &(name, price, sale_type, category) in CATALOG {
            db.products().insert(name, price, sale_type, category).await?;
            products_created += 1;
        }
    } else {
        warn!(existing_products, "Catalog not empty, skipping product seed");
    }

    info!(rooms_created, products_created, "Seed complete");

    db.close().await;
    Ok(())
}

/// Parses `--db <path>` from the command line.
fn parse_db_path() -> Option<String> {
    let args: Vec<String> = env::args().collect();
    args.iter()
        .position(|a| a == "--db")
        .and_then(|i| args.get(i + 1))
        .cloned()
}
