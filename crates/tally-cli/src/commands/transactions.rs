//! Ledger command implementations

use anyhow::{Context, Result};
use tally_core::{db::Database, Error};

use super::{confirm, format_amount, truncate};

pub fn cmd_transactions_list(db: &Database, limit: Option<usize>, json: bool) -> Result<()> {
    let mut transactions = db.list_transactions()?;
    let total = transactions.len();
    if let Some(limit) = limit {
        transactions.truncate(limit);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&transactions)?);
        return Ok(());
    }

    if transactions.is_empty() {
        println!("No transactions found. Ingest some with:");
        println!("  tally ingest statement.csv");
        return Ok(());
    }

    println!();
    println!("📝 Transactions ({} total)", total);
    println!("   ─────────────────────────────────────────────────────────────");

    for tx in &transactions {
        println!(
            "   [{}] {} │ {:>12} │ {:<18} │ {:<18} │ {}",
            tx.id,
            tx.date,
            format_amount(tx.amount, tx.transaction_type),
            truncate(&tx.category, 18),
            truncate(&tx.bank, 18),
            truncate(&tx.description, 40)
        );
    }

    Ok(())
}

pub fn cmd_categorize(db: &Database, id: i64, category: &str) -> Result<()> {
    let vocab = db.load_vocabulary()?;

    let tx = match db.set_category(id, category, &vocab) {
        Ok(tx) => tx,
        Err(Error::InvalidCategory(_)) => anyhow::bail!(
            "Unknown category: {}\nAvailable: {}\nAdd it first with 'tally categories add'.",
            category,
            vocab.ordered().join(", ")
        ),
        Err(Error::NotFound(_)) => anyhow::bail!("Transaction {} not found", id),
        Err(e) => return Err(e).context("Failed to update category"),
    };

    println!("✅ Transaction {} is now '{}':", id, tx.category);
    println!(
        "   {} │ {} │ {}",
        tx.date,
        format_amount(tx.amount, tx.transaction_type),
        truncate(&tx.description, 40)
    );

    Ok(())
}

/// Parse `ID=CATEGORY` pairs and apply them in one transaction
pub fn cmd_recategorize(db: &Database, updates: &[String]) -> Result<usize> {
    let mut parsed: Vec<(i64, &str)> = Vec::with_capacity(updates.len());
    for update in updates {
        let (id, category) = update
            .split_once('=')
            .with_context(|| format!("Expected ID=CATEGORY, got '{}'", update))?;
        let id: i64 = id
            .trim()
            .parse()
            .with_context(|| format!("Invalid transaction ID in '{}'", update))?;
        parsed.push((id, category.trim()));
    }

    let vocab = db.load_vocabulary()?;
    let count = match db.set_categories(&parsed, &vocab) {
        Ok(count) => count,
        Err(Error::InvalidCategory(category)) => anyhow::bail!(
            "Unknown category: {}\nAvailable: {}\nNothing was changed.",
            category,
            vocab.ordered().join(", ")
        ),
        Err(Error::NotFound(what)) => {
            anyhow::bail!("{} not found; nothing was changed", capitalize(&what))
        }
        Err(e) => return Err(e).context("Failed to update categories"),
    };

    println!("✅ Updated {} transactions", count);
    Ok(count)
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn cmd_summary(db: &Database, json: bool) -> Result<()> {
    let summary = db.summary()?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "total_credit": summary.total_credit,
                "total_debit": summary.total_debit,
                "net": summary.net(),
            }))?
        );
        return Ok(());
    }

    println!();
    println!("📊 Ledger Summary");
    println!("   ─────────────────────────────");
    println!("   Transactions: {}", db.count_transactions()?);
    println!("   Total credit: \x1b[32m₹{:.2}\x1b[0m", summary.total_credit);
    println!("   Total debit:  \x1b[31m₹{:.2}\x1b[0m", summary.total_debit);
    println!("   Net:          ₹{:.2}", summary.net());

    Ok(())
}

pub fn cmd_clear(db: &Database, yes: bool) -> Result<()> {
    if !yes {
        println!("⚠️  This will delete all {} transactions.", db.count_transactions()?);
        println!("   Categories will be preserved.");
        println!();
        if !confirm("Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let removed = db.clear_ledger()?;
    println!("✅ Ledger cleared ({} transactions removed).", removed);

    Ok(())
}
