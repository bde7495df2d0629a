//! Tally Core Library
//!
//! Turns bank statements and payment-app screenshots into a deduplicated
//! transaction ledger:
//! - Text extraction from CSV exports, PDF statements and screenshots (OCR)
//! - Format detection across bank statement layouts
//! - Statement and OCR transaction parsers
//! - Normalization of dates, amounts, direction and categories
//! - Fingerprint-based deduplication
//! - SQLite ledger store with snapshot export/restore

pub mod categorize;
pub mod columns;
pub mod config;
pub mod db;
pub mod dedup;
pub mod detect;
pub mod error;
pub mod extract;
pub mod import;
pub mod models;
pub mod normalize;
pub mod pipeline;

/// Test utilities including a scripted OCR engine
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use categorize::Categorizer;
pub use config::TallyConfig;
pub use db::{Database, TransactionInsertResult};
pub use dedup::{admit, fingerprint, Admission, RejectReason};
pub use detect::{detect, ParserSelection};
pub use error::{Error, Result};
pub use extract::{default_engine, extract, Extracted, ExtractedTable, ExtractedText, OcrEngine};
pub use import::{parse, StatementLayout};
pub use models::{
    Bank, CandidateTransaction, CategoryVocabulary, DocumentKind, IngestError, IngestErrorKind,
    IngestResult, LedgerSnapshot, LedgerSummary, NewTransaction, RawDocument, Transaction,
    TransactionType,
};
pub use normalize::Normalizer;
pub use pipeline::Ingestor;
