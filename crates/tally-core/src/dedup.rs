//! Deduplication
//!
//! A fingerprint is a SHA-256 over (date, amount, type, normalized
//! description, bank). The ledger keeps fingerprints unique; admission is a
//! single conditional insert, so two callers can never both admit the same
//! event.

use chrono::NaiveDate;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::db::{Database, TransactionInsertResult};
use crate::error::Result;
use crate::models::{NewTransaction, Transaction, TransactionType};

/// Why a transaction was not admitted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Same fingerprint as an existing ledger entry
    Duplicate { existing_id: i64 },
}

/// Outcome of [`admit`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Inserted with this id
    Admitted(i64),
    Rejected(RejectReason),
}

/// Lower-cased, whitespace-collapsed description
pub fn normalize_description_key(description: &str) -> String {
    description
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Fingerprint of the identifying fields of a transaction
pub fn fingerprint_of(
    date: NaiveDate,
    amount: f64,
    transaction_type: TransactionType,
    description: &str,
    bank: &str,
) -> String {
    let mut hasher = Sha256::new();
    hasher.update(date.format("%Y-%m-%d").to_string().as_bytes());
    hasher.update(b"|");
    hasher.update(format!("{:.2}", amount).as_bytes());
    hasher.update(b"|");
    hasher.update(transaction_type.as_str().as_bytes());
    hasher.update(b"|");
    hasher.update(normalize_description_key(description).as_bytes());
    hasher.update(b"|");
    hasher.update(bank.trim().as_bytes());
    hex::encode(hasher.finalize())
}

pub fn fingerprint(tx: &NewTransaction) -> String {
    fingerprint_of(tx.date, tx.amount, tx.transaction_type, &tx.description, &tx.bank)
}

/// Recompute a stored transaction's fingerprint from its fields
pub fn fingerprint_stored(tx: &Transaction) -> String {
    fingerprint_of(tx.date, tx.amount, tx.transaction_type, &tx.description, &tx.bank)
}

/// Admit a transaction into the ledger unless its fingerprint is present
pub fn admit(tx: &NewTransaction, db: &Database) -> Result<Admission> {
    let fp = fingerprint(tx);
    match db.insert_transaction(tx, &fp)? {
        TransactionInsertResult::Inserted(id) => Ok(Admission::Admitted(id)),
        TransactionInsertResult::Duplicate(existing_id) => {
            debug!(
                "Duplicate of transaction {}: {} {} {}",
                existing_id, tx.date, tx.amount, tx.description
            );
            Ok(Admission::Rejected(RejectReason::Duplicate { existing_id }))
        }
    }
}
