use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use etax_core::records::RecordStore;
use etax_data::IncomeCsvLoader;
use etax_kv_sqlite::SqliteKeyValueStore;
use tracing_subscriber::EnvFilter;

/// Import income rows from a CSV file into the per-year cache.
///
/// The CSV file should have the following columns:
/// - description: free text shown in the income list
/// - amount: money value ("." and "," decimal separators both work)
/// - date: optional YYYY-MM-DD
/// - id: optional stable row id (re-imports replace matching rows)
/// - include: optional true/false, defaults to true
#[derive(Parser, Debug)]
#[command(name = "etax-income-loader")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the CSV file containing income rows
    #[arg(short, long)]
    file: PathBuf,

    /// Tax year the rows belong to
    #[arg(short, long)]
    year: i32,

    /// SQLite database URL (e.g., sqlite:etax.db?mode=rwc to create if missing)
    #[arg(short, long, default_value = "sqlite:etax.db?mode=rwc")]
    database: String,

    /// Run database migrations before loading data
    #[arg(short, long, default_value_t = false)]
    migrate: bool,
}

/// Initialise the tracing subscriber.
///
/// Honours `RUST_LOG` when set; falls back to `info` so import warnings
/// (skipped rows, dropped dates) are visible by default.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::from("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .without_time()
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let args = Args::parse();

    let store = SqliteKeyValueStore::new(&args.database)
        .await
        .with_context(|| format!("Failed to connect to database: {}", args.database))?;

    if args.migrate {
        println!("Running migrations...");
        store
            .run_migrations()
            .await
            .context("Failed to run migrations")?;
        println!("Migrations complete.");
    }

    println!("Loading incomes from: {}", args.file.display());

    let file = File::open(&args.file)
        .with_context(|| format!("Failed to open: {}", args.file.display()))?;

    let rows = IncomeCsvLoader::parse(file)
        .with_context(|| format!("Failed to parse CSV: {}", args.file.display()))?;

    println!("Parsed {} rows from CSV", rows.len());

    let records = RecordStore::new(Arc::new(store));
    let written = IncomeCsvLoader::load(&records, args.year, &rows)
        .await
        .context("Failed to write imported incomes")?;

    println!(
        "Successfully imported {} income rows for year {}.",
        written, args.year
    );

    Ok(())
}
