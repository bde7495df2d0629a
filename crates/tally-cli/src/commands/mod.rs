//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Core commands (init, banks) and shared utilities (open_db, load_config)
//! - `ingest` - Document ingestion
//! - `transactions` - Ledger commands (list, categorize, summary, clear)
//! - `categories` - Category vocabulary commands
//! - `snapshot` - Ledger export and restore

pub mod categories;
pub mod core;
pub mod ingest;
pub mod snapshot;
pub mod transactions;

// Re-export command functions for main.rs
pub use categories::*;
pub use core::*;
pub use ingest::*;
pub use snapshot::*;
pub use transactions::*;

use std::io::{self, Write};

use tally_core::TransactionType;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Format an amount with its direction, colored for terminals
pub fn format_amount(amount: f64, transaction_type: TransactionType) -> String {
    match transaction_type {
        TransactionType::Debit => format!("\x1b[31m-₹{:.2}\x1b[0m", amount), // Red for debits
        TransactionType::Credit => format!("\x1b[32m+₹{:.2}\x1b[0m", amount), // Green for credits
    }
}

/// Ask for a y/N confirmation on stdin
pub fn confirm(prompt: &str) -> anyhow::Result<bool> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}
