//! Domain models for Tally

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Category every transaction falls back to. Always part of the vocabulary.
pub const DEFAULT_CATEGORY: &str = "Other";

/// Bank label stored on transactions whose bank could not be determined
pub const UNKNOWN_BANK: &str = "N/A";

/// Supported banks with a dedicated statement layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bank {
    Hdfc,
    Sbi,
    Icici,
    Axis,
    Kotak,
}

impl Bank {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hdfc => "hdfc",
            Self::Sbi => "sbi",
            Self::Icici => "icici",
            Self::Axis => "axis",
            Self::Kotak => "kotak",
        }
    }

    /// Human-readable name, stored as the `bank` of ledger entries
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Hdfc => "HDFC Bank",
            Self::Sbi => "State Bank of India",
            Self::Icici => "ICICI Bank",
            Self::Axis => "Axis Bank",
            Self::Kotak => "Kotak Mahindra Bank",
        }
    }

    /// All banks in detection priority order
    pub fn all() -> &'static [Bank] {
        &[Self::Hdfc, Self::Sbi, Self::Icici, Self::Axis, Self::Kotak]
    }

    /// Text fragments that identify a statement or notification from this bank
    pub fn identifiers(&self) -> &'static [&'static str] {
        match self {
            Self::Hdfc => &["HDFC BANK", "HDFCBANK", "HDFC BANK STATEMENT"],
            Self::Sbi => &["STATE BANK OF INDIA", "SBI STATEMENT", "WWW.ONLINESBI.COM"],
            Self::Icici => &["ICICI BANK", "WWW.ICICIBANK.COM"],
            Self::Axis => &["AXIS BANK", "WWW.AXISBANK.COM"],
            Self::Kotak => &["KOTAK MAHINDRA BANK", "KOTAK STATEMENT", "WWW.KOTAK.COM"],
        }
    }

    /// Identify a bank from free text by its identifiers
    pub fn identify(text: &str) -> Option<Bank> {
        let upper = text.to_uppercase();
        Self::all()
            .iter()
            .copied()
            .find(|bank| bank.identifiers().iter().any(|id| upper.contains(id)))
    }
}

impl std::str::FromStr for Bank {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hdfc" | "hdfc bank" | "hdfcbank" => Ok(Self::Hdfc),
            "sbi" | "state bank of india" | "statebankofindia" => Ok(Self::Sbi),
            "icici" | "icici bank" => Ok(Self::Icici),
            "axis" | "axis bank" => Ok(Self::Axis),
            "kotak" | "kotak mahindra bank" | "kotak bank" => Ok(Self::Kotak),
            _ => Err(format!("Unknown bank: {}", s)),
        }
    }
}

impl std::fmt::Display for Bank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Declared kind of an uploaded document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Image,
    Pdf,
    Csv,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Pdf => "pdf",
            Self::Csv => "csv",
        }
    }

    /// Guess the kind from a file extension (case-insensitive)
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "png" | "jpg" | "jpeg" | "gif" | "bmp" | "tif" | "tiff" | "webp" => Some(Self::Image),
            "pdf" => Some(Self::Pdf),
            "csv" | "txt" => Some(Self::Csv),
            _ => None,
        }
    }
}

impl std::str::FromStr for DocumentKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "image" | "img" | "screenshot" => Ok(Self::Image),
            "pdf" => Ok(Self::Pdf),
            "csv" => Ok(Self::Csv),
            _ => Err(format!("Unknown document kind: {}", s)),
        }
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An uploaded document, alive only for one ingestion call
#[derive(Debug, Clone)]
pub struct RawDocument {
    /// Name used in reports (usually the file name)
    pub name: String,
    pub bytes: Vec<u8>,
    pub kind: DocumentKind,
    /// Bank declared by the uploader, if any. May name an unsupported bank.
    pub bank_hint: Option<String>,
}

impl RawDocument {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>, kind: DocumentKind) -> Self {
        Self {
            name: name.into(),
            bytes,
            kind,
            bank_hint: None,
        }
    }

    pub fn with_bank_hint(mut self, hint: impl Into<String>) -> Self {
        self.bank_hint = Some(hint.into());
        self
    }
}

/// Money in (credit) or money out (debit)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Credit,
    Debit,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Credit => "credit",
            Self::Debit => "debit",
        }
    }
}

impl std::str::FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "credit" => Ok(Self::Credit),
            "debit" => Ok(Self::Debit),
            _ => Err(format!("Unknown transaction type: {}", s)),
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Direction as guessed by a parser
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DirectionHint {
    Credit,
    Debit,
    #[default]
    Unknown,
}

impl From<TransactionType> for DirectionHint {
    fn from(t: TransactionType) -> Self {
        match t {
            TransactionType::Credit => Self::Credit,
            TransactionType::Debit => Self::Debit,
        }
    }
}

/// Which parser family produced a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionSource {
    Ocr,
    #[default]
    Statement,
}

impl TransactionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ocr => "ocr",
            Self::Statement => "statement",
        }
    }
}

impl std::str::FromStr for TransactionSource {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ocr" => Ok(Self::Ocr),
            "statement" => Ok(Self::Statement),
            _ => Err(format!("Unknown transaction source: {}", s)),
        }
    }
}

impl std::fmt::Display for TransactionSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How trustworthy an extraction is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Low,
}

/// An unvalidated, parser-local transaction record
///
/// Dates and amounts are kept exactly as the parser found them; turning them
/// into canonical values is the Normalizer's job.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateTransaction {
    pub raw_date: String,
    /// May carry a sign, currency symbols, grouping separators or a CR/DR marker
    pub raw_amount: String,
    pub description: String,
    /// Bank display name, or "unknown"
    pub bank: String,
    pub direction_hint: DirectionHint,
    /// The amount came from a signed-amount column (positive means credit)
    pub signed_amount: bool,
    pub source: TransactionSource,
    pub confidence: Confidence,
}

/// A canonical ledger entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub date: NaiveDate,
    /// Always >= 0; direction lives in `transaction_type`
    pub amount: f64,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub description: String,
    pub bank: String,
    pub category: String,
    /// Derived from (date, amount, type, description, bank)
    pub fingerprint: String,
    pub source: TransactionSource,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// Amount with the direction applied: credit positive, debit negative
    pub fn signed_amount(&self) -> f64 {
        match self.transaction_type {
            TransactionType::Credit => self.amount,
            TransactionType::Debit => -self.amount,
        }
    }
}

/// A normalized transaction before ledger admission
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub date: NaiveDate,
    pub amount: f64,
    pub transaction_type: TransactionType,
    pub description: String,
    pub bank: String,
    pub category: String,
    pub source: TransactionSource,
}

/// Ordered set of category names. "Other" is always present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryVocabulary {
    names: Vec<String>,
}

impl CategoryVocabulary {
    /// Build a vocabulary, dropping blanks and repeats and adding "Other" if missing
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut vocab = Self { names: Vec::new() };
        for name in names {
            vocab.insert(name.as_ref());
        }
        vocab.insert(DEFAULT_CATEGORY);
        vocab
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Add a category; returns false when it was already present or blank
    pub fn insert(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() || self.contains(name) {
            return false;
        }
        self.names.push(name.to_string());
        true
    }

    /// Names in insertion order (storage order)
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Names in user-facing order: insertion order with "Other" last
    pub fn ordered(&self) -> Vec<&str> {
        let mut ordered: Vec<&str> = self
            .names
            .iter()
            .map(String::as_str)
            .filter(|n| *n != DEFAULT_CATEGORY)
            .collect();
        ordered.push(DEFAULT_CATEGORY);
        ordered
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for CategoryVocabulary {
    fn default() -> Self {
        Self::new(std::iter::empty::<&str>())
    }
}

/// Kind of a per-file fatal failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IngestErrorKind {
    Extraction,
    UnsupportedLayout,
    Storage,
}

/// A per-file failure reported in an ingestion result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestError {
    pub kind: IngestErrorKind,
    pub message: String,
}

/// Outcome of ingesting one document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IngestResult {
    pub document: String,
    pub admitted: usize,
    pub duplicates: usize,
    pub unparsed: usize,
    pub errors: Vec<IngestError>,
}

impl IngestResult {
    pub fn new(document: impl Into<String>) -> Self {
        Self {
            document: document.into(),
            ..Default::default()
        }
    }

    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Credit and debit totals over the whole ledger
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LedgerSummary {
    pub total_credit: f64,
    pub total_debit: f64,
}

impl LedgerSummary {
    pub fn net(&self) -> f64 {
        self.total_credit - self.total_debit
    }
}

/// Whole ledger state, saved and loaded as one unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub version: u32,
    pub exported_at: DateTime<Utc>,
    pub categories: Vec<String>,
    pub transactions: Vec<Transaction>,
}
