//! PDF statement extraction
//!
//! Text comes out of `pdf-extract` with column spacing roughly preserved.
//! When a line reads as a statement header, the lines below it are cut into
//! cells and each cell is placed under the header column it lines up with.
//! Otherwise the PDF is returned as free text.

use super::{canonicalize_currency, Extracted, ExtractedTable, ExtractedText};
use crate::columns::is_recognized_header;
use crate::error::{Error, Result};
use crate::models::Confidence;

/// A header needs at least this many cells to start a table
const MIN_TABLE_COLUMNS: usize = 3;

pub(super) fn extract_pdf(bytes: &[u8]) -> Result<Extracted> {
    if !bytes.starts_with(b"%PDF") {
        return Err(Error::Extraction("Missing %PDF header; not a PDF file".into()));
    }

    let text = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes))
        .map_err(|_| Error::Extraction("PDF parser aborted on a malformed document".into()))?
        .map_err(|e| Error::Extraction(format!("Unreadable PDF: {}", e)))?;

    Ok(layout_text(&text))
}

/// A cell and the character columns it occupies on its line
#[derive(Debug, Clone, PartialEq)]
struct Cell {
    start: usize,
    end: usize,
    text: String,
}

/// Split a line on runs of two or more spaces
fn split_cells(line: &str) -> Vec<Cell> {
    let chars: Vec<char> = line.replace('\t', "    ").chars().collect();
    let mut cells = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        if chars[i].is_whitespace() {
            i += 1;
            continue;
        }
        let start = i;
        let mut end = i;
        while i < chars.len() {
            if chars[i].is_whitespace() {
                let gap = chars[i..].iter().take_while(|c| c.is_whitespace()).count();
                if gap >= 2 || i + gap >= chars.len() {
                    break;
                }
                i += gap;
                continue;
            }
            i += 1;
            end = i;
        }
        cells.push(Cell {
            start,
            end,
            text: chars[start..end].iter().collect(),
        });
    }

    cells
}

/// Index of the header column closest to a cell
fn nearest_column(headers: &[Cell], cell: &Cell) -> usize {
    let distance = |h: &Cell| {
        if cell.end <= h.start {
            h.start - cell.end
        } else if h.end <= cell.start {
            cell.start - h.end
        } else {
            0
        }
    };

    headers
        .iter()
        .enumerate()
        .min_by_key(|(_, h)| distance(h))
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// Arrange extracted PDF text as a table when a header line is present
pub(super) fn layout_text(text: &str) -> Extracted {
    let lines: Vec<&str> = text.lines().collect();

    let header_idx = lines.iter().position(|line| {
        let cells = split_cells(line);
        let texts: Vec<&str> = cells.iter().map(|c| c.text.as_str()).collect();
        cells.len() >= MIN_TABLE_COLUMNS && is_recognized_header(&texts)
    });

    let Some(header_idx) = header_idx else {
        return Extracted::Text(ExtractedText {
            lines: lines
                .iter()
                .map(|l| canonicalize_currency(l.trim()))
                .filter(|l| !l.is_empty())
                .collect(),
            confidence: Confidence::High,
        });
    };

    let header_cells = split_cells(lines[header_idx]);
    let mut rows: Vec<Vec<String>> = Vec::new();

    for line in &lines[header_idx + 1..] {
        let cells = split_cells(line);
        if cells.is_empty() {
            continue;
        }

        let mut row = vec![String::new(); header_cells.len()];
        for cell in &cells {
            let slot = &mut row[nearest_column(&header_cells, cell)];
            if !slot.is_empty() {
                slot.push(' ');
            }
            slot.push_str(&cell.text);
        }

        // A line with nothing in the leading column continues the row above
        // (wrapped narration text)
        match rows.last_mut() {
            Some(prev) if row[0].is_empty() => {
                for (prev_cell, cell) in prev.iter_mut().zip(row) {
                    if cell.is_empty() {
                        continue;
                    }
                    if !prev_cell.is_empty() {
                        prev_cell.push(' ');
                    }
                    prev_cell.push_str(&cell);
                }
            }
            _ => rows.push(row),
        }
    }

    Extracted::Table(ExtractedTable {
        headers: Some(header_cells.into_iter().map(|c| c.text).collect()),
        rows,
        preamble: lines[..header_idx]
            .iter()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_cells_keeps_single_spaces() {
        let cells = split_cells("01/02/24   UPI-COFFEE SHOP   250.00");
        let texts: Vec<&str> = cells.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["01/02/24", "UPI-COFFEE SHOP", "250.00"]);
        assert_eq!(cells[0].start, 0);
    }

    #[test]
    fn test_layout_text_builds_table() {
        let text = "\
HDFC BANK Ltd.
Statement of account
Date        Narration              Withdrawal Amt.   Deposit Amt.   Closing Balance
01/02/24    UPI-XYZ-STORE                 250.00                         9750.00
02/02/24    SALARY FEB                                  50000.00        59750.00
";
        let Extracted::Table(table) = layout_text(text) else {
            panic!("expected a table");
        };
        assert_eq!(table.headers.as_ref().map(|h| h.len()), Some(5));
        assert_eq!(table.preamble, vec!["HDFC BANK Ltd.", "Statement of account"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0][2], "250.00");
        assert_eq!(table.rows[0][3], "");
        assert_eq!(table.rows[1][2], "");
        assert_eq!(table.rows[1][3], "50000.00");
    }

    #[test]
    fn test_wrapped_narration_merged() {
        let text = "\
Date        Narration              Debit       Credit
01/02/24    UPI-SWIGGY ORDER       250.00
            BANGALORE
";
        let Extracted::Table(table) = layout_text(text) else {
            panic!("expected a table");
        };
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0][1], "UPI-SWIGGY ORDER BANGALORE");
    }

    #[test]
    fn test_layout_text_falls_back_to_text() {
        let Extracted::Text(text) = layout_text("Paid ₹499 to Coffee Shop\n\non 03 Mar 2024\n")
        else {
            panic!("expected free text");
        };
        assert_eq!(text.lines, vec!["Paid ₹499 to Coffee Shop", "on 03 Mar 2024"]);
        assert_eq!(text.confidence, Confidence::High);
    }

    #[test]
    fn test_free_text_currency_canonicalized() {
        let Extracted::Text(text) = layout_text("Paid Rs 499 to Coffee Shop on 03 Mar 2024\nINR 1,200.50 debited\n")
        else {
            panic!("expected free text");
        };
        assert_eq!(
            text.lines,
            vec!["Paid ₹499 to Coffee Shop on 03 Mar 2024", "₹1,200.50 debited"]
        );
    }

    #[test]
    fn test_non_pdf_bytes_rejected() {
        let err = extract_pdf(b"Date,Narration\n").unwrap_err();
        assert!(matches!(err, Error::Extraction(_)));
    }
}
