//! Image OCR
//!
//! Recognition sits behind the [`OcrEngine`] trait. With the `ocr` feature,
//! [`TesseractOcr`] runs Tesseract through `leptess`; without it the default
//! engine reports that OCR is unavailable.

use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use super::ExtractedText;
use crate::error::{Error, Result};
use crate::models::Confidence;

/// Mean word confidence (0-100) below which OCR output counts as low confidence
const LOW_CONFIDENCE_THRESHOLD: f32 = 60.0;

/// Raw recognizer output
#[derive(Debug, Clone, PartialEq)]
pub struct RecognizedText {
    pub text: String,
    /// Mean word confidence reported by the engine (0-100), if it has one
    pub mean_confidence: Option<f32>,
}

/// A text recognizer for screenshots
pub trait OcrEngine: Send + Sync {
    /// Name for logs
    fn name(&self) -> &str;

    /// Recognize text in encoded image bytes (PNG, JPEG, ...)
    fn recognize(&self, image: &[u8]) -> Result<RecognizedText>;
}

/// Engine used when the crate is built without OCR support
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableOcr;

impl OcrEngine for UnavailableOcr {
    fn name(&self) -> &str {
        "unavailable"
    }

    fn recognize(&self, _image: &[u8]) -> Result<RecognizedText> {
        Err(Error::Extraction(
            "OCR support not enabled; build tally-core with --features ocr and install Tesseract"
                .into(),
        ))
    }
}

#[cfg(feature = "ocr")]
mod tesseract {
    use leptess::LepTess;

    use super::{OcrEngine, RecognizedText};
    use crate::error::{Error, Result};

    /// Tesseract OCR via leptess
    #[derive(Debug, Clone)]
    pub struct TesseractOcr {
        /// Tesseract language code, e.g. "eng"
        pub language: String,
        /// Directory containing traineddata files (system default if None)
        pub data_path: Option<String>,
    }

    impl Default for TesseractOcr {
        fn default() -> Self {
            Self {
                language: "eng".to_string(),
                data_path: None,
            }
        }
    }

    impl OcrEngine for TesseractOcr {
        fn name(&self) -> &str {
            "tesseract"
        }

        fn recognize(&self, image: &[u8]) -> Result<RecognizedText> {
            let mut lt = LepTess::new(self.data_path.as_deref(), &self.language)
                .map_err(|e| Error::Extraction(format!("Tesseract init failed: {:?}", e)))?;
            lt.set_image_from_mem(image)
                .map_err(|e| Error::Extraction(format!("Unreadable image: {:?}", e)))?;
            let text = lt
                .get_utf8_text()
                .map_err(|e| Error::Extraction(format!("Tesseract output not UTF-8: {}", e)))?;
            let confidence = lt.mean_text_conf();

            Ok(RecognizedText {
                text,
                mean_confidence: Some(confidence as f32),
            })
        }
    }
}

#[cfg(feature = "ocr")]
pub use tesseract::TesseractOcr;

/// The best engine this build supports
pub fn default_engine() -> Box<dyn OcrEngine> {
    #[cfg(feature = "ocr")]
    {
        Box::new(TesseractOcr::default())
    }
    #[cfg(not(feature = "ocr"))]
    {
        Box::new(UnavailableOcr)
    }
}

/// Whether the bytes start with a known image signature
fn is_image(bytes: &[u8]) -> bool {
    const SIGNATURES: &[&[u8]] = &[
        b"\x89PNG\r\n\x1a\n",
        b"\xFF\xD8\xFF",
        b"GIF87a",
        b"GIF89a",
        b"BM",
        b"II*\x00",
        b"MM\x00*",
    ];
    let is_webp = bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP";
    is_webp || SIGNATURES.iter().any(|sig| bytes.starts_with(sig))
}

fn currency_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\b(?:rs\.?|inr)\s*(\d)").expect("valid regex"))
}

fn doubled_rupee_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"₹\s*₹").expect("valid regex"))
}

/// Canonicalize currency prefixes ("Rs.", "INR") to "₹"
pub(crate) fn canonicalize_currency(text: &str) -> String {
    let text = currency_re().replace_all(text, "₹$1");
    doubled_rupee_re().replace_all(&text, "₹").into_owned()
}

/// Run OCR on an image and split the result into cleaned lines
pub(super) fn extract_image(bytes: &[u8], engine: &dyn OcrEngine) -> Result<ExtractedText> {
    if !is_image(bytes) {
        return Err(Error::Extraction(
            "Unrecognized image format (expected PNG, JPEG, GIF, BMP, TIFF or WebP)".into(),
        ));
    }

    let recognized = engine.recognize(bytes)?;
    debug!(
        "OCR engine '{}' returned {} chars (confidence {:?})",
        engine.name(),
        recognized.text.len(),
        recognized.mean_confidence
    );

    let lines: Vec<String> = canonicalize_currency(&recognized.text)
        .lines()
        .map(|l| l.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|l| !l.is_empty())
        .collect();

    let confidence = match recognized.mean_confidence {
        _ if lines.is_empty() => Confidence::Low,
        Some(c) if c < LOW_CONFIDENCE_THRESHOLD => Confidence::Low,
        _ => Confidence::High,
    };

    Ok(ExtractedText { lines, confidence })
}
