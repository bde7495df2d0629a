//! Whole-ledger export and restore

use std::collections::HashSet;

use chrono::Utc;
use rusqlite::params;
use tracing::info;

use super::transactions::TRANSACTION_COLUMNS;
use super::{format_datetime, Database};
use crate::dedup::fingerprint_stored;
use crate::error::{Error, Result};
use crate::models::{CategoryVocabulary, LedgerSnapshot, Transaction};

/// Snapshot format version written by [`Database::export_snapshot`]
pub const SNAPSHOT_VERSION: u32 = 1;

impl Database {
    /// Capture the whole ledger: vocabulary plus every transaction
    pub fn export_snapshot(&self) -> Result<LedgerSnapshot> {
        let categories = self.load_vocabulary()?.ordered().into_iter().map(String::from).collect();

        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM transactions ORDER BY id",
            TRANSACTION_COLUMNS
        ))?;
        let transactions = stmt
            .query_map([], |row| Self::row_to_transaction(row))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(LedgerSnapshot {
            version: SNAPSHOT_VERSION,
            exported_at: Utc::now(),
            categories,
            transactions,
        })
    }

    /// Replace the ledger with a snapshot
    ///
    /// The snapshot is validated first (version, non-negative amounts,
    /// categories from its own vocabulary, unique fingerprints); on any
    /// failure the current ledger is left untouched. Fingerprints are
    /// recomputed from the transaction fields rather than trusted.
    pub fn restore_snapshot(&self, snapshot: &LedgerSnapshot) -> Result<usize> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(Error::InvalidData(format!(
                "Unsupported snapshot version {} (expected {})",
                snapshot.version, SNAPSHOT_VERSION
            )));
        }

        let vocab = CategoryVocabulary::new(&snapshot.categories);
        let mut seen = HashSet::new();
        let mut fingerprints = Vec::with_capacity(snapshot.transactions.len());
        for tx in &snapshot.transactions {
            validate_transaction(tx, &vocab)?;
            let fp = fingerprint_stored(tx);
            if !seen.insert(fp.clone()) {
                return Err(Error::InvalidData(format!(
                    "Snapshot contains duplicate transaction {} ({} {} {})",
                    tx.id, tx.date, tx.amount, tx.description
                )));
            }
            fingerprints.push(fp);
        }

        let mut conn = self.conn()?;
        let db_tx = conn.transaction()?;
        db_tx.execute("DELETE FROM transactions", [])?;
        db_tx.execute("DELETE FROM categories", [])?;

        for (position, name) in vocab.names().iter().enumerate() {
            db_tx.execute(
                "INSERT INTO categories (name, position) VALUES (?, ?)",
                params![name, position as i64],
            )?;
        }

        for (tx, fp) in snapshot.transactions.iter().zip(&fingerprints) {
            db_tx.execute(
                r#"
                INSERT INTO transactions (id, date, amount, type, description, bank, category, fingerprint, source, created_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
                params![
                    tx.id,
                    tx.date.to_string(),
                    tx.amount,
                    tx.transaction_type.as_str(),
                    tx.description,
                    tx.bank,
                    tx.category,
                    fp,
                    tx.source.as_str(),
                    format_datetime(&tx.created_at),
                ],
            )?;
        }
        db_tx.commit()?;

        info!(
            "Restored snapshot: {} transactions, {} categories",
            snapshot.transactions.len(),
            vocab.len()
        );
        Ok(snapshot.transactions.len())
    }
}

fn validate_transaction(tx: &Transaction, vocab: &CategoryVocabulary) -> Result<()> {
    if !(tx.amount >= 0.0 && tx.amount.is_finite()) {
        return Err(Error::InvalidData(format!(
            "Transaction {} has invalid amount {}",
            tx.id, tx.amount
        )));
    }
    if !vocab.contains(&tx.category) {
        return Err(Error::InvalidCategory(format!(
            "Transaction {} uses unknown category '{}'",
            tx.id, tx.category
        )));
    }
    Ok(())
}
