//! Tally CLI - Statement and screenshot ledger
//!
//! Usage:
//!   tally init                    Initialize database
//!   tally ingest statement.csv    Ingest statements and screenshots
//!   tally transactions            List the ledger
//!   tally summary                 Credit/debit totals

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db, &config),
        Commands::Ingest {
            files,
            kind,
            bank,
            reference_date,
            json,
        } => {
            let db = commands::open_db(&cli.db, &config)?;
            let ocr = tally_core::default_engine();
            let options = commands::IngestOptions {
                kind: kind.as_deref(),
                bank: bank.as_deref(),
                reference_date: reference_date.as_deref(),
                json,
            };
            commands::cmd_ingest(&db, &config, ocr.as_ref(), &files, &options).map(|_| ())
        }
        Commands::Transactions { limit, json } => {
            let db = commands::open_db(&cli.db, &config)?;
            commands::cmd_transactions_list(&db, limit, json)
        }
        Commands::Categorize { id, category } => {
            let db = commands::open_db(&cli.db, &config)?;
            commands::cmd_categorize(&db, id, &category)
        }
        Commands::Recategorize { updates } => {
            let db = commands::open_db(&cli.db, &config)?;
            commands::cmd_recategorize(&db, &updates).map(|_| ())
        }
        Commands::Categories { action } => {
            let db = commands::open_db(&cli.db, &config)?;
            match action {
                None | Some(CategoriesAction::List) => commands::cmd_categories_list(&db),
                Some(CategoriesAction::Add { name }) => commands::cmd_categories_add(&db, &name),
            }
        }
        Commands::Summary { json } => {
            let db = commands::open_db(&cli.db, &config)?;
            commands::cmd_summary(&db, json)
        }
        Commands::Clear { yes } => {
            let db = commands::open_db(&cli.db, &config)?;
            commands::cmd_clear(&db, yes)
        }
        Commands::Export { output } => {
            let db = commands::open_db(&cli.db, &config)?;
            commands::cmd_export(&db, output.as_deref())
        }
        Commands::Restore { file, yes } => {
            let db = commands::open_db(&cli.db, &config)?;
            commands::cmd_restore(&db, &file, yes)
        }
        Commands::Banks => commands::cmd_banks(),
    }
}
