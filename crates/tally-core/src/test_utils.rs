//! Test utilities for tally-core
//!
//! Provides a scripted OCR engine so screenshot ingestion can be exercised
//! without Tesseract installed, plus small fixture helpers.

use crate::error::{Error, Result};
use crate::extract::{OcrEngine, RecognizedText};
use crate::models::{DocumentKind, RawDocument};

/// Smallest byte prefix that passes image sniffing (PNG signature)
pub const PNG_HEADER: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// OCR engine that returns fixed text for any image
#[derive(Debug, Clone)]
pub struct MockOcrEngine {
    text: String,
    confidence: Option<f32>,
    fail: bool,
}

impl MockOcrEngine {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            confidence: None,
            fail: false,
        }
    }

    /// Report this mean confidence (0-100) with the text
    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = Some(confidence);
        self
    }

    /// An engine whose every recognition fails
    pub fn failing() -> Self {
        Self {
            text: String::new(),
            confidence: None,
            fail: true,
        }
    }
}

impl OcrEngine for MockOcrEngine {
    fn name(&self) -> &str {
        "mock"
    }

    fn recognize(&self, _image: &[u8]) -> Result<RecognizedText> {
        if self.fail {
            return Err(Error::Extraction("mock OCR failure".into()));
        }
        Ok(RecognizedText {
            text: self.text.clone(),
            mean_confidence: self.confidence,
        })
    }
}

/// A CSV document built from text
pub fn csv_document(name: &str, content: &str) -> RawDocument {
    RawDocument::new(name, content.as_bytes().to_vec(), DocumentKind::Csv)
}

/// A screenshot document whose bytes pass image sniffing
pub fn screenshot_document(name: &str) -> RawDocument {
    let mut bytes = PNG_HEADER.to_vec();
    bytes.extend_from_slice(name.as_bytes());
    RawDocument::new(name, bytes, DocumentKind::Image)
}
