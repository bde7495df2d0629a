//! Text extraction from raw documents
//!
//! Turns uploaded bytes into either free text lines (screenshots, PDFs
//! without a recognizable table) or a table of text cells (CSV exports,
//! tabular PDFs). Nothing here knows what a transaction is; unreadable
//! *content* yields an empty or low-confidence result, and only bytes that
//! cannot be decoded as the declared kind produce `Error::Extraction`.

mod delimited;
mod ocr;
mod pdf;

pub(crate) use ocr::canonicalize_currency;
pub use ocr::{default_engine, OcrEngine, RecognizedText, UnavailableOcr};
#[cfg(feature = "ocr")]
pub use ocr::TesseractOcr;

use tracing::debug;

use crate::error::Result;
use crate::models::{Confidence, DocumentKind, RawDocument};

/// Free text, one entry per line, in reading order
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedText {
    pub lines: Vec<String>,
    pub confidence: Confidence,
}

impl ExtractedText {
    pub fn is_empty(&self) -> bool {
        self.lines.iter().all(|l| l.trim().is_empty())
    }

    pub fn joined(&self) -> String {
        self.lines.join("\n")
    }
}

/// Rows of text cells
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedTable {
    /// Header cells, when the document had a recognizable header row
    pub headers: Option<Vec<String>>,
    pub rows: Vec<Vec<String>>,
    /// Text that preceded the table (account details, bank letterhead)
    pub preamble: Vec<String>,
}

impl ExtractedTable {
    /// All text of the table, for bank identification
    pub fn text(&self) -> String {
        let mut parts: Vec<String> = self.preamble.clone();
        if let Some(headers) = &self.headers {
            parts.push(headers.join(" "));
        }
        parts.extend(self.rows.iter().map(|r| r.join(" ")));
        parts.join("\n")
    }
}

/// Result of extraction: either shape
#[derive(Debug, Clone, PartialEq)]
pub enum Extracted {
    Text(ExtractedText),
    Table(ExtractedTable),
}

impl Extracted {
    /// Everything readable, for bank identification
    pub fn text(&self) -> String {
        match self {
            Self::Text(t) => t.joined(),
            Self::Table(t) => t.text(),
        }
    }
}

/// Extract text or a table from a document according to its declared kind
pub fn extract(document: &RawDocument, ocr: &dyn OcrEngine) -> Result<Extracted> {
    let extracted = match document.kind {
        DocumentKind::Csv => Extracted::Table(delimited::extract_csv(&document.bytes)?),
        DocumentKind::Pdf => pdf::extract_pdf(&document.bytes)?,
        DocumentKind::Image => Extracted::Text(ocr::extract_image(&document.bytes, ocr)?),
    };

    match &extracted {
        Extracted::Text(t) => debug!(
            "Extracted {} text lines from {} ({:?} confidence)",
            t.lines.len(),
            document.name,
            t.confidence
        ),
        Extracted::Table(t) => debug!(
            "Extracted table with {} rows from {} (header: {})",
            t.rows.len(),
            document.name,
            t.headers.is_some()
        ),
    }

    Ok(extracted)
}
