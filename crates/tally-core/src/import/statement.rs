//! Statement table parsing
//!
//! Each layout maps its columns onto a [`ColumnMap`]; the row walk is shared.
//! Rows keep their raw date and amount text; nothing here parses numbers.

use tracing::{debug, warn};

use super::layouts::{ColumnMap, StatementLayout};
use super::tokens::{cell_is_amount, cell_is_date, cell_is_zero};
use crate::error::{Error, Result};
use crate::extract::ExtractedTable;
use crate::models::{Bank, CandidateTransaction, Confidence, DirectionHint, TransactionSource};

/// Bank label for rows whose bank cannot be determined
pub const UNKNOWN_BANK_LABEL: &str = "unknown";

/// Minimum share of non-empty cells that must look like a date / amount
/// for a column of a headerless table to take that role
const INFERENCE_MAJORITY: f64 = 0.6;

/// Candidates read from a statement table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatementParse {
    pub candidates: Vec<CandidateTransaction>,
    /// Rows carrying a transaction that could not be read consistently
    /// (both debit and credit populated)
    pub rejected: usize,
    /// Rows without a date or amount (section headers, totals, blank lines)
    pub skipped: usize,
}

/// Parse a table with the given layout
///
/// Fails with `UnsupportedLayout` when no date column and value column can
/// be located.
pub fn parse_statement(layout: StatementLayout, table: &ExtractedTable) -> Result<StatementParse> {
    let columns = match &table.headers {
        Some(headers) => layout.resolve_columns(headers),
        None => infer_columns(&table.rows),
    };

    if !columns.is_usable() {
        return Err(Error::UnsupportedLayout(format!(
            "{} layout: no date and amount columns found",
            layout
        )));
    }

    let bank = bank_label(layout, table);
    debug!("Parsing statement as {} ({:?}), bank '{}'", layout, columns, bank);

    let mut parse = StatementParse::default();
    for (row_idx, row) in table.rows.iter().enumerate() {
        match read_row(row, &columns) {
            RowRead::Candidate { raw_date, raw_amount, direction_hint, signed_amount, description } => {
                parse.candidates.push(CandidateTransaction {
                    raw_date,
                    raw_amount,
                    description,
                    bank: bank.clone(),
                    direction_hint,
                    signed_amount,
                    source: TransactionSource::Statement,
                    confidence: Confidence::High,
                });
            }
            RowRead::Conflicting => {
                warn!("Row {} has both debit and credit amounts, skipping", row_idx + 1);
                parse.rejected += 1;
            }
            RowRead::Skip => parse.skipped += 1,
        }
    }

    debug!(
        "{} layout produced {} candidates ({} rejected, {} skipped)",
        layout,
        parse.candidates.len(),
        parse.rejected,
        parse.skipped
    );
    Ok(parse)
}

enum RowRead {
    Candidate {
        raw_date: String,
        raw_amount: String,
        direction_hint: DirectionHint,
        signed_amount: bool,
        description: String,
    },
    Conflicting,
    Skip,
}

fn cell(row: &[String], idx: Option<usize>) -> &str {
    idx.and_then(|i| row.get(i)).map(|s| s.trim()).unwrap_or("")
}

/// A value cell counts only if it holds a non-zero number
fn value(row: &[String], idx: Option<usize>) -> Option<&str> {
    let v = cell(row, idx);
    let has_digit = v.chars().any(|c| c.is_ascii_digit());
    (has_digit && !cell_is_zero(v)).then_some(v)
}

fn read_row(row: &[String], columns: &ColumnMap) -> RowRead {
    let raw_date = cell(row, columns.date);
    if raw_date.is_empty() {
        return RowRead::Skip;
    }

    let (raw_amount, direction_hint, signed_amount) =
        match (value(row, columns.debit), value(row, columns.credit)) {
            (Some(_), Some(_)) => return RowRead::Conflicting,
            (Some(debit), None) => (debit, DirectionHint::Debit, false),
            (None, Some(credit)) => (credit, DirectionHint::Credit, false),
            (None, None) => match value(row, columns.amount) {
                Some(amount) => match columns.dr_cr {
                    Some(_) => (amount, dr_cr_hint(cell(row, columns.dr_cr)), false),
                    None => (amount, DirectionHint::Unknown, true),
                },
                None => return RowRead::Skip,
            },
        };

    RowRead::Candidate {
        raw_date: raw_date.to_string(),
        raw_amount: raw_amount.to_string(),
        direction_hint,
        signed_amount,
        description: collapse_whitespace(cell(row, columns.description)),
    }
}

fn dr_cr_hint(marker: &str) -> DirectionHint {
    match marker.trim().trim_end_matches('.').to_lowercase().as_str() {
        "cr" | "c" | "credit" | "deposit" => DirectionHint::Credit,
        "dr" | "d" | "debit" | "withdrawal" => DirectionHint::Debit,
        _ => DirectionHint::Unknown,
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Bank label for candidates from this layout
///
/// Generic tables are labeled from bank identifiers in their preamble only;
/// row text is ignored because narrations name counterparty banks.
fn bank_label(layout: StatementLayout, table: &ExtractedTable) -> String {
    layout
        .bank()
        .or_else(|| Bank::identify(&table.preamble.join("\n")))
        .map(|b| b.display_name().to_string())
        .unwrap_or_else(|| UNKNOWN_BANK_LABEL.to_string())
}

/// Locate columns of a headerless table from cell contents
///
/// The first column where most non-empty cells look like dates becomes the
/// date column. Amount-looking columns follow: two columns that are never
/// populated on the same row are a debit/credit pair, otherwise the first
/// one is a signed amount and later ones (balances) are ignored. The
/// description is the remaining column with the longest text.
fn infer_columns(rows: &[Vec<String>]) -> ColumnMap {
    let mut map = ColumnMap::default();
    let width = rows.iter().map(Vec::len).max().unwrap_or(0);

    let share = |col: usize, test: fn(&str) -> bool| -> f64 {
        let filled: Vec<&str> = rows
            .iter()
            .filter_map(|r| r.get(col).map(|c| c.trim()))
            .filter(|c| !c.is_empty())
            .collect();
        if filled.is_empty() {
            return 0.0;
        }
        filled.iter().filter(|c| test(c)).count() as f64 / filled.len() as f64
    };

    map.date = (0..width).find(|&c| share(c, cell_is_date) >= INFERENCE_MAJORITY);
    let amount_cols: Vec<usize> = (0..width)
        .filter(|&c| Some(c) != map.date && share(c, cell_is_amount) >= INFERENCE_MAJORITY)
        .collect();

    match amount_cols.as_slice() {
        [] => {}
        [first, second, ..] if complementary(rows, *first, *second) => {
            map.debit = Some(*first);
            map.credit = Some(*second);
        }
        [first, ..] => map.amount = Some(*first),
    }

    map.description = (0..width)
        .filter(|&c| Some(c) != map.date && !amount_cols.contains(&c))
        .max_by_key(|&c| {
            rows.iter()
                .filter_map(|r| r.get(c))
                .map(|s| s.trim().len())
                .sum::<usize>()
        });

    map
}

/// Whether two columns are never both populated on a row, and each is used
fn complementary(rows: &[Vec<String>], a: usize, b: usize) -> bool {
    let filled = |r: &Vec<String>, c: usize| {
        r.get(c)
            .map(|v| !v.trim().is_empty() && !cell_is_zero(v))
            .unwrap_or(false)
    };
    let mut seen_a = false;
    let mut seen_b = false;
    for row in rows {
        match (filled(row, a), filled(row, b)) {
            (true, true) => return false,
            (true, false) => seen_a = true,
            (false, true) => seen_b = true,
            (false, false) => {}
        }
    }
    seen_a && seen_b
}
