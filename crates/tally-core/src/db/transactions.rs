//! Transaction operations

use rusqlite::{params, OptionalExtension};
use tracing::info;

use super::{parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{CategoryVocabulary, LedgerSummary, NewTransaction, Transaction};
use crate::normalize::round2;

/// Result of inserting a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionInsertResult {
    /// Transaction was inserted successfully, contains new transaction ID
    Inserted(i64),
    /// A transaction with the same fingerprint exists, contains its ID
    Duplicate(i64),
}

pub(crate) const TRANSACTION_COLUMNS: &str =
    "id, date, amount, type, description, bank, category, fingerprint, source, created_at";

impl Database {
    /// Insert a transaction unless its fingerprint is already in the ledger
    ///
    /// The existence check and the insert are one statement, so concurrent
    /// callers cannot both insert the same fingerprint.
    pub fn insert_transaction(&self, tx: &NewTransaction, fingerprint: &str) -> Result<TransactionInsertResult> {
        let conn = self.conn()?;

        let inserted = conn.execute(
            r#"
            INSERT INTO transactions (date, amount, type, description, bank, category, fingerprint, source)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(fingerprint) DO NOTHING
            "#,
            params![
                tx.date.to_string(),
                tx.amount,
                tx.transaction_type.as_str(),
                tx.description,
                tx.bank,
                tx.category,
                fingerprint,
                tx.source.as_str(),
            ],
        )?;

        if inserted == 1 {
            return Ok(TransactionInsertResult::Inserted(conn.last_insert_rowid()));
        }

        let existing: i64 = conn.query_row(
            "SELECT id FROM transactions WHERE fingerprint = ?",
            params![fingerprint],
            |row| row.get(0),
        )?;
        Ok(TransactionInsertResult::Duplicate(existing))
    }

    /// All ledger entries, newest first
    pub fn list_transactions(&self) -> Result<Vec<Transaction>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM transactions ORDER BY date DESC, id DESC",
            TRANSACTION_COLUMNS
        ))?;

        let transactions = stmt
            .query_map([], |row| Self::row_to_transaction(row))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(transactions)
    }

    /// Get a single transaction by ID
    pub fn get_transaction(&self, id: i64) -> Result<Option<Transaction>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM transactions WHERE id = ?",
            TRANSACTION_COLUMNS
        ))?;

        let transaction = stmt
            .query_row(params![id], |row| Self::row_to_transaction(row))
            .optional()?;

        Ok(transaction)
    }

    /// Count total transactions
    pub fn count_transactions(&self) -> Result<i64> {
        let conn = self.conn()?;
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM transactions", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Change the category of one transaction
    ///
    /// Fails with `InvalidCategory` for names outside the vocabulary and
    /// `NotFound` for unknown ids; nothing is written in either case.
    pub fn set_category(&self, id: i64, category: &str, vocab: &CategoryVocabulary) -> Result<Transaction> {
        if !vocab.contains(category) {
            return Err(Error::InvalidCategory(category.to_string()));
        }

        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE transactions SET category = ? WHERE id = ?",
            params![category, id],
        )?;
        if updated == 0 {
            return Err(Error::NotFound(format!("transaction {}", id)));
        }

        self.get_transaction(id)?
            .ok_or_else(|| Error::NotFound(format!("transaction {}", id)))
    }

    /// Change the categories of several transactions at once
    ///
    /// Every category is checked against the vocabulary before anything is
    /// written, and all updates share one SQLite transaction: a single
    /// unknown id or category leaves the whole ledger untouched.
    pub fn set_categories(&self, updates: &[(i64, &str)], vocab: &CategoryVocabulary) -> Result<usize> {
        if let Some((_, category)) = updates.iter().find(|(_, c)| !vocab.contains(c)) {
            return Err(Error::InvalidCategory(category.to_string()));
        }

        let mut conn = self.conn()?;
        let db_tx = conn.transaction()?;
        for (id, category) in updates {
            let updated = db_tx.execute(
                "UPDATE transactions SET category = ? WHERE id = ?",
                params![category, id],
            )?;
            if updated == 0 {
                return Err(Error::NotFound(format!("transaction {}", id)));
            }
        }
        db_tx.commit()?;

        info!("Recategorized {} transactions", updates.len());
        Ok(updates.len())
    }

    /// Delete every ledger entry; the category vocabulary is kept
    pub fn clear_ledger(&self) -> Result<usize> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM transactions", [])?;
        info!("Cleared ledger ({} transactions)", deleted);
        Ok(deleted)
    }

    /// Credit and debit totals over the whole ledger
    pub fn summary(&self) -> Result<LedgerSummary> {
        let conn = self.conn()?;
        let (credit, debit): (f64, f64) = conn.query_row(
            r#"
            SELECT
                COALESCE(SUM(CASE WHEN type = 'credit' THEN amount END), 0.0),
                COALESCE(SUM(CASE WHEN type = 'debit' THEN amount END), 0.0)
            FROM transactions
            "#,
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        Ok(LedgerSummary {
            total_credit: round2(credit),
            total_debit: round2(debit),
        })
    }

    /// Helper to convert a row to Transaction
    /// Column order: see `TRANSACTION_COLUMNS`
    pub(crate) fn row_to_transaction(row: &rusqlite::Row) -> rusqlite::Result<Transaction> {
        let date_str: String = row.get(1)?;
        let type_str: String = row.get(3)?;
        let source_str: String = row.get(8)?;
        let created_at_str: String = row.get(9)?;
        Ok(Transaction {
            id: row.get(0)?,
            date: chrono::NaiveDate::parse_from_str(&date_str, "%Y-%m-%d").unwrap_or_default(),
            amount: row.get(2)?,
            transaction_type: type_str.parse().map_err(|e: String| {
                rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, e.into())
            })?,
            description: row.get(4)?,
            bank: row.get(5)?,
            category: row.get(6)?,
            fingerprint: row.get(7)?,
            source: source_str.parse().unwrap_or_default(),
            created_at: parse_datetime(&created_at_str),
        })
    }
}
