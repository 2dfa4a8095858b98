//! # Seed Data Generator
//!
//! Populates a local document store with sample medicines for development.
//!
//! ## Usage
//! ```bash
//! # Generate 60 medicines (default)
//! cargo run -p medistock-store --bin seed
//!
//! # Generate custom amount
//! cargo run -p medistock-store --bin seed -- --count 200
//!
//! # Specify database path
//! cargo run -p medistock-store --bin seed -- --db ./data/medistock.db
//! ```
//!
//! ## Generated Medicines
//! Medicines are spread over aisles by therapeutic family:
//! - A: analgesics
//! - B: antibiotics
//! - C: antihistamines
//! - D: gastro-intestinal
//! - E: dermatology
//!
//! Each medicine has a UUID id, a name with its dosage, a stock between 0
//! and 100, and one "Added" history entry.

use std::env;

use medistock_core::{Actor, HistoryEntry, Medicine, HISTORY_COLLECTION, MEDICINES_COLLECTION};
use medistock_store::{Database, DbConfig, Document, RemoteStore};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Aisle prefixes and the medicines stored there.
const FAMILIES: &[(&str, &[&str])] = &[
    (
        "A",
        &["Aspirine", "Paracétamol", "Ibuprofène", "Doliprane", "Efferalgan", "Kétoprofène"],
    ),
    (
        "B",
        &["Amoxicilline", "Azithromycine", "Doxycycline", "Ciprofloxacine", "Clarithromycine"],
    ),
    (
        "C",
        &["Cétirizine", "Loratadine", "Desloratadine", "Fexofénadine", "Ébastine"],
    ),
    (
        "D",
        &["Oméprazole", "Smecta", "Gaviscon", "Spasfon", "Lopéramide", "Dompéridone"],
    ),
    (
        "E",
        &["Biafine", "Cicalfate", "Hydrocortisone", "Fucidine", "Bétadine"],
    ),
];

/// Dosages cycled over each medicine.
const DOSAGES: &[&str] = &["100mg", "250mg", "500mg", "1g"];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 60;
    let mut db_path = String::from("./medistock_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(60);
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
                println!("MediStock Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of medicines to generate (default: 60)");
                println!("  -d, --db <PATH>    Database file path (default: ./medistock_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    info!(database = %db_path, count, "Seeding medicines");

    let db = Database::new(DbConfig::new(&db_path)).await?;
    let store = db.documents();

    let existing = store.count(MEDICINES_COLLECTION).await?;
    if existing > 0 {
        warn!(existing, "Database already has medicines, skipping seed to avoid duplicates");
        return Ok(());
    }

    let actor = Actor::new("seed", "seed@medistock.local");
    let start = std::time::Instant::now();
    let mut generated = 0;

    for (index, medicine) in sample_medicines().take(count).enumerate() {
        let data = Document::encode(&medicine)?;
        if let Err(e) = store.set_document(MEDICINES_COLLECTION, &medicine.id, data).await {
            warn!(name = %medicine.name, error = %e, "Failed to insert medicine");
            continue;
        }

        let entry = HistoryEntry::record(
            &medicine.id,
            &actor,
            format!("Added {}", medicine.name),
            "Added new medicine",
        );
        store
            .add_document(HISTORY_COLLECTION, Document::encode(&entry)?)
            .await?;

        generated += 1;
        if (index + 1) % 20 == 0 {
            info!(generated, "Seeding in progress");
        }
    }

    info!(generated, elapsed = ?start.elapsed(), "Seed complete");
    db.close().await;

    Ok(())
}

/// Endless, deterministic stream of sample medicines.
fn sample_medicines() -> impl Iterator<Item = Medicine> {
    let catalog: Vec<(String, &'static str)> = FAMILIES
        .iter()
        .flat_map(|(aisle, names)| names.iter().map(move |name| (aisle.to_string(), *name)))
        .collect();

    (0usize..).map(move |seed| {
        let (aisle, name) = &catalog[seed % catalog.len()];
        let dosage = DOSAGES[(seed / catalog.len()) % DOSAGES.len()];
        let shelf = 1 + (seed % 3);
        let stock = ((seed * 37) % 101) as i64;

        Medicine::new(format!("{name} {dosage}"), stock, format!("{aisle}{shelf}"))
    })
}
