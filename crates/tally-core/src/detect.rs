//! Format detection
//!
//! Chooses the parser for a document from the shape of its extracted
//! content and an optional caller hint. Detection is pure: the same input
//! always selects the same parser.
//!
//! Order:
//! 1. Tables with a supported bank hint use that bank's layout
//! 2. Tables whose header matches a bank layout signature use that layout
//!    (banks probed in a fixed priority order)
//! 3. Other tables use the generic layout
//! 4. Free text goes to the OCR parser, labeled with the hinted bank or a
//!    bank identified from the text

use tracing::debug;

use crate::extract::Extracted;
use crate::import::StatementLayout;
use crate::models::Bank;

/// Which parser to run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserSelection {
    Statement(StatementLayout),
    Ocr { bank: Option<Bank> },
}

impl std::fmt::Display for ParserSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Statement(layout) => write!(f, "statement:{}", layout),
            Self::Ocr { bank: Some(bank) } => write!(f, "ocr:{}", bank),
            Self::Ocr { bank: None } => write!(f, "ocr"),
        }
    }
}

/// Select a parser for extracted content
///
/// `min_signature_fraction` is the share of a layout's expected columns a
/// header must contain for that layout to be chosen. An unrecognized hint
/// is ignored.
pub fn detect(extracted: &Extracted, bank_hint: Option<&str>, min_signature_fraction: f64) -> ParserSelection {
    let hinted = bank_hint.and_then(|h| match h.parse::<Bank>() {
        Ok(bank) => Some(bank),
        Err(_) => {
            debug!("Ignoring unsupported bank hint '{}'", h);
            None
        }
    });

    let selection = match extracted {
        Extracted::Table(table) => {
            if let Some(bank) = hinted {
                ParserSelection::Statement(StatementLayout::for_bank(bank))
            } else {
                let by_signature = table.headers.as_ref().and_then(|headers| {
                    StatementLayout::bank_layouts()
                        .iter()
                        .copied()
                        .find(|layout| layout.signature_fraction(headers) >= min_signature_fraction)
                });
                ParserSelection::Statement(by_signature.unwrap_or(StatementLayout::GenericCsv))
            }
        }
        Extracted::Text(text) => ParserSelection::Ocr {
            bank: hinted.or_else(|| Bank::identify(&text.joined())),
        },
    };

    debug!("Selected parser {}", selection);
    selection
}
