//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `load_config` - Resolve the pipeline configuration
//! - `open_db` - Shared utility to open the database
//! - `cmd_init` - Initialize the database
//! - `cmd_banks` - List supported banks

use std::path::Path;

use anyhow::{Context, Result};
use tally_core::{db::Database, Bank, StatementLayout, TallyConfig};

/// Load configuration from `--config`, the override file, or the built-in defaults
pub fn load_config(path: Option<&Path>) -> Result<TallyConfig> {
    TallyConfig::load(path).context("Failed to load configuration")
}

/// Open the database, seeding the category vocabulary on first use
pub fn open_db(db_path: &Path, config: &TallyConfig) -> Result<Database> {
    let path_str = db_path
        .to_str()
        .with_context(|| format!("Database path is not valid UTF-8: {}", db_path.display()))?;
    let db = Database::new(path_str).context("Failed to open database")?;
    db.seed_categories(&config.vocabulary())
        .context("Failed to seed categories")?;
    Ok(db)
}

pub fn cmd_init(db_path: &Path, config: &TallyConfig) -> Result<()> {
    println!("🔧 Initializing database at {}...", db_path.display());

    let db = open_db(db_path, config)?;
    let categories = db.list_categories()?;
    println!("   Categories: {}", categories.len());
    println!("   Transactions: {}", db.count_transactions()?);

    println!("✅ Database initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  1. Ingest a statement: tally ingest statement.csv");
    println!("  2. Review the ledger: tally transactions");

    Ok(())
}

pub fn cmd_banks() -> Result<()> {
    println!();
    println!("🏦 Supported Banks");
    println!("   ─────────────────────────────");

    for bank in Bank::all() {
        println!(
            "   {:<8} {:<22} layout: {}",
            bank.as_str(),
            bank.display_name(),
            StatementLayout::for_bank(*bank)
        );
    }
    println!(
        "   {:<8} {:<22} layout: {}",
        "-",
        "Any other CSV",
        StatementLayout::GenericCsv
    );

    println!();
    println!("   Screenshots from any payment app are read with OCR.");

    Ok(())
}
