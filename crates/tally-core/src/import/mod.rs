//! Parsers turning extracted text into candidate transactions
//!
//! Two families: the OCR parser for free text, and the statement layouts
//! for tables. [`parse`] runs whichever one detection selected.

mod layouts;
mod ocr;
mod statement;
pub mod tokens;

pub use layouts::{ColumnMap, StatementLayout};
pub use ocr::parse_ocr_text;
pub use statement::{parse_statement, StatementParse, UNKNOWN_BANK_LABEL};

use crate::detect::ParserSelection;
use crate::error::{Error, Result};
use crate::extract::{Extracted, ExtractedTable, ExtractedText};
use crate::models::CandidateTransaction;

/// Output of a parser run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseOutcome {
    pub candidates: Vec<CandidateTransaction>,
    /// Records the parser saw but could not read consistently
    pub rejected: usize,
}

/// Run the selected parser over extracted content
pub fn parse(selection: &ParserSelection, extracted: &Extracted) -> Result<ParseOutcome> {
    match (selection, extracted) {
        (ParserSelection::Statement(layout), Extracted::Table(table)) => {
            let parse = parse_statement(*layout, table)?;
            Ok(ParseOutcome {
                candidates: parse.candidates,
                rejected: parse.rejected,
            })
        }
        (ParserSelection::Ocr { bank }, Extracted::Text(text)) => Ok(ParseOutcome {
            candidates: parse_ocr_text(text, *bank),
            rejected: 0,
        }),
        (ParserSelection::Ocr { bank }, Extracted::Table(table)) => Ok(ParseOutcome {
            candidates: parse_ocr_text(&table_as_text(table), *bank),
            rejected: 0,
        }),
        (ParserSelection::Statement(layout), Extracted::Text(_)) => Err(Error::UnsupportedLayout(
            format!("{} layout needs a table, got free text", layout),
        )),
    }
}

fn table_as_text(table: &ExtractedTable) -> ExtractedText {
    ExtractedText {
        lines: table.text().lines().map(str::to_string).collect(),
        confidence: crate::models::Confidence::Low,
    }
}
