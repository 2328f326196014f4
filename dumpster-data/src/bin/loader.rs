use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use dumpster_core::db::QuoteRepository;
use dumpster_data::PriceSheetLoader;
use dumpster_db_sqlite::SqliteRepository;

/// Load a container price sheet from a CSV file into the database.
///
/// The CSV file should have the following columns:
/// - area: service area code (nassau-suffolk, east-riverhead)
/// - material: material code (e.g. construction-demo, trees-brush)
/// - size: container size in cubic yards (5, 10, 15, 20, 30, 40)
/// - cash, debit, credit: price for each payment method
#[derive(Parser, Debug)]
#[command(name = "price-sheet-loader")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the CSV file containing the price sheet
    #[arg(short, long)]
    file: PathBuf,

    /// SQLite database URL (e.g., sqlite:dumpster.db?mode=rwc to create if missing)
    #[arg(short, long, default_value = "sqlite:dumpster.db?mode=rwc")]
    database: String,

    /// Run database migrations before loading data
    #[arg(short, long, default_value_t = false)]
    migrate: bool,

    /// Run seed files from the specified directory after migrations
    #[arg(short, long)]
    seeds: Option<PathBuf>,

    /// Validate the sheet without writing to the database
    #[arg(long, default_value_t = false)]
    check: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    println!("Reading price sheet from: {}", args.file.display());

    let file = File::open(&args.file)
        .with_context(|| format!("Failed to open: {}", args.file.display()))?;

    let records = PriceSheetLoader::parse(file)
        .with_context(|| format!("Failed to parse CSV: {}", args.file.display()))?;

    println!("Parsed {} rows from CSV", records.len());

    if args.check {
        let table = PriceSheetLoader::to_table(&records)
            .with_context(|| format!("Invalid price sheet: {}", args.file.display()))?;
        println!("Price sheet is valid ({} prices).", table.len());
        return Ok(());
    }

    let repo = SqliteRepository::new(&args.database)
        .await
        .with_context(|| format!("Failed to connect to database: {}", args.database))?;

    if args.migrate {
        println!("Running migrations...");
        repo.run_migrations()
            .await
            .context("Failed to run migrations")?;
        println!("Migrations complete.");
    }

    if let Some(seeds_dir) = &args.seeds {
        println!("Running seeds from: {}", seeds_dir.display());
        repo.run_seeds(seeds_dir)
            .await
            .with_context(|| format!("Failed to run seeds from: {}", seeds_dir.display()))?;
        println!("Seeds complete.");
    }

    let stored = PriceSheetLoader::load(&repo, &records)
        .await
        .context("Failed to load price sheet into database")?;

    let count = repo
        .load_price_entries()
        .await
        .context("Failed to read back price entries")?
        .len();

    println!(
        "Successfully loaded {} prices into the database ({} stored).",
        stored, count
    );

    Ok(())
}
