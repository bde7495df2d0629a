//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Tally - Turn bank statements and payment screenshots into one ledger
#[derive(Parser)]
#[command(name = "tally")]
#[command(about = "Statement and screenshot ledger with duplicate detection", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "tally.db", global = true)]
    pub db: PathBuf,

    /// Configuration file (categories, keyword rules, detection threshold)
    ///
    /// Defaults to ~/.config/tally/config.toml when present, otherwise the
    /// built-in configuration.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database and seed the category vocabulary
    Init,

    /// Ingest statements (CSV, PDF) and payment screenshots
    Ingest {
        /// Files to ingest, processed in order
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Document kind: csv, pdf, image (inferred from the extension if not specified)
        #[arg(short, long)]
        kind: Option<String>,

        /// Bank the documents come from: hdfc, sbi, icici, axis, kotak
        #[arg(short, long)]
        bank: Option<String>,

        /// Date used to resolve screenshot dates printed without a year (YYYY-MM-DD, default today)
        #[arg(long)]
        reference_date: Option<String>,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// List ledger transactions, newest first
    Transactions {
        /// Maximum number of transactions to show
        #[arg(short, long)]
        limit: Option<usize>,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Change the category of a transaction
    Categorize {
        /// Transaction ID
        id: i64,

        /// Category name (see `tally categories`)
        category: String,
    },

    /// Change the categories of several transactions at once
    ///
    /// All-or-nothing: one unknown ID or category and nothing is changed.
    Recategorize {
        /// Updates as ID=CATEGORY, e.g. 12=Shopping "14=Food & Dining"
        #[arg(required = true)]
        updates: Vec<String>,
    },

    /// Show or extend the category vocabulary
    Categories {
        #[command(subcommand)]
        action: Option<CategoriesAction>,
    },

    /// Show credit and debit totals
    Summary {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete every transaction (categories are kept)
    Clear {
        /// Skip confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Export the ledger to a JSON snapshot
    Export {
        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Replace the ledger with a JSON snapshot
    Restore {
        /// Snapshot file produced by `tally export`
        file: PathBuf,

        /// Skip confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// List supported banks and statement layouts
    Banks,
}

#[derive(Subcommand)]
pub enum CategoriesAction {
    /// List categories
    List,

    /// Add a category to the vocabulary
    Add {
        /// Category name
        name: String,
    },
}
