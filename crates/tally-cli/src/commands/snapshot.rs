//! Ledger snapshot command implementations

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tally_core::{db::Database, LedgerSnapshot};

use super::confirm;

/// Export the ledger to a JSON snapshot
pub fn cmd_export(db: &Database, output: Option<&Path>) -> Result<()> {
    let snapshot = db.export_snapshot()?;
    let json =
        serde_json::to_string_pretty(&snapshot).context("Failed to serialize snapshot to JSON")?;

    match output {
        Some(path) => {
            if path.exists() {
                anyhow::bail!(
                    "Output file already exists: {}\nUse a different filename or remove the existing file.",
                    path.display()
                );
            }
            fs::write(path, json)
                .with_context(|| format!("Failed to write snapshot: {}", path.display()))?;
            println!(
                "✅ Exported {} transactions and {} categories to {}",
                snapshot.transactions.len(),
                snapshot.categories.len(),
                path.display()
            );
        }
        None => println!("{}", json),
    }

    Ok(())
}

/// Replace the ledger with a snapshot file
pub fn cmd_restore(db: &Database, input: &Path, yes: bool) -> Result<()> {
    if !input.exists() {
        anyhow::bail!("Snapshot file not found: {}", input.display());
    }

    let json = fs::read_to_string(input)
        .with_context(|| format!("Failed to read snapshot file: {}", input.display()))?;
    let snapshot: LedgerSnapshot =
        serde_json::from_str(&json).context("Failed to parse snapshot file as JSON")?;

    println!("📦 Restoring snapshot from: {}", input.display());
    println!("   Version: {}", snapshot.version);
    println!("   Exported: {}", snapshot.exported_at);
    println!("   Transactions: {}", snapshot.transactions.len());
    println!("   Categories: {}", snapshot.categories.len());
    println!();

    if !yes {
        println!("⚠️  This will REPLACE the current ledger.");
        println!(
            "   Transactions: {} → {}",
            db.count_transactions()?,
            snapshot.transactions.len()
        );
        println!();
        if !confirm("Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let restored = db
        .restore_snapshot(&snapshot)
        .context("Snapshot rejected; the ledger was left unchanged")?;

    println!("✅ Restore complete!");
    println!("   Transactions: {}", restored);

    Ok(())
}
