//! Document ingestion
//!
//! One document at a time: extract, detect, parse, normalize, admit. Each
//! stage's failure is confined to the document being ingested; a batch
//! keeps going after a bad file.

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::categorize::Categorizer;
use crate::config::TallyConfig;
use crate::db::Database;
use crate::dedup::{admit, Admission};
use crate::detect::detect;
use crate::error::{Error, Result};
use crate::extract::{extract, OcrEngine};
use crate::import::parse;
use crate::models::{CategoryVocabulary, IngestError, IngestErrorKind, IngestResult, RawDocument};
use crate::normalize::Normalizer;

/// Which per-file failure kind an error counts as
pub fn error_kind(error: &Error) -> IngestErrorKind {
    match error {
        Error::Extraction(_) | Error::Csv(_) | Error::Io(_) => IngestErrorKind::Extraction,
        Error::UnsupportedLayout(_) => IngestErrorKind::UnsupportedLayout,
        _ => IngestErrorKind::Storage,
    }
}

impl From<&Error> for IngestError {
    fn from(error: &Error) -> Self {
        Self {
            kind: error_kind(error),
            message: error.to_string(),
        }
    }
}

/// Ingests documents into a ledger
pub struct Ingestor<'a> {
    db: &'a Database,
    ocr: &'a dyn OcrEngine,
    normalizer: Normalizer,
    min_signature_fraction: f64,
}

impl<'a> Ingestor<'a> {
    /// `vocab` is the category vocabulary in force for this run;
    /// `reference_date` resolves dates printed without a year.
    pub fn new(
        db: &'a Database,
        config: &TallyConfig,
        vocab: &CategoryVocabulary,
        ocr: &'a dyn OcrEngine,
        reference_date: NaiveDate,
    ) -> Result<Self> {
        let categorizer = Categorizer::new(&config.categories.rules, vocab)?;
        Ok(Self {
            db,
            ocr,
            normalizer: Normalizer::new(categorizer, reference_date),
            min_signature_fraction: config.detection.min_signature_fraction,
        })
    }

    /// Ingest one document
    ///
    /// Never fails: extraction, layout and storage failures are recorded in
    /// the result's `errors`.
    pub fn ingest(&self, document: &RawDocument) -> IngestResult {
        let mut result = IngestResult::new(&document.name);
        if let Err(e) = self.ingest_into(document, &mut result) {
            warn!("Failed to ingest {}: {}", document.name, e);
            result.errors.push(IngestError::from(&e));
        }

        info!(
            "Ingested {}: {} admitted, {} duplicates, {} unparsed",
            document.name, result.admitted, result.duplicates, result.unparsed
        );
        result
    }

    /// Ingest documents sequentially, one result per document
    pub fn ingest_batch(&self, documents: &[RawDocument]) -> Vec<IngestResult> {
        documents.iter().map(|d| self.ingest(d)).collect()
    }

    fn ingest_into(&self, document: &RawDocument, result: &mut IngestResult) -> Result<()> {
        let extracted = extract(document, self.ocr)?;
        let selection = detect(
            &extracted,
            document.bank_hint.as_deref(),
            self.min_signature_fraction,
        );
        let outcome = parse(&selection, &extracted)?;
        result.unparsed += outcome.rejected;

        for candidate in &outcome.candidates {
            let Some(tx) = self.normalizer.normalize(candidate) else {
                result.unparsed += 1;
                continue;
            };
            match admit(&tx, self.db)? {
                Admission::Admitted(_) => result.admitted += 1,
                Admission::Rejected(_) => result.duplicates += 1,
            }
        }

        Ok(())
    }
}
