//! Delimited (CSV) statement extraction

use std::borrow::Cow;

use csv::{ReaderBuilder, Trim};

use super::ExtractedTable;
use crate::columns::is_recognized_header;
use crate::error::{Error, Result};

/// How many leading rows may be account details before the header row
const HEADER_SEARCH_ROWS: usize = 30;

/// Parse CSV bytes into a table
///
/// The first row that reads as a statement header becomes the header and
/// anything above it becomes preamble. Without such a row every row is data
/// with positional columns.
pub(super) fn extract_csv(bytes: &[u8]) -> Result<ExtractedTable> {
    let text = decode(bytes)?;
    let delimiter = sniff_delimiter(&text);

    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .delimiter(delimiter)
        .from_reader(text.as_bytes());

    let mut rows: Vec<Vec<String>> = Vec::new();
    for result in rdr.records() {
        let record = result.map_err(|e| Error::Extraction(format!("Malformed CSV: {}", e)))?;
        let cells: Vec<String> = record.iter().map(|c| c.to_string()).collect();
        if cells.iter().all(|c| c.is_empty()) {
            continue;
        }
        rows.push(cells);
    }

    let header_idx = rows
        .iter()
        .take(HEADER_SEARCH_ROWS)
        .position(|r| is_recognized_header(r.as_slice()));

    let Some(idx) = header_idx else {
        return Ok(ExtractedTable {
            headers: None,
            rows,
            preamble: Vec::new(),
        });
    };

    let mut data = rows.split_off(idx);
    let headers = data.remove(0);
    let preamble = rows
        .into_iter()
        .map(|r| r.join(" ").trim().to_string())
        .filter(|l| !l.is_empty())
        .collect();

    Ok(ExtractedTable {
        headers: Some(headers),
        rows: data,
        preamble,
    })
}

/// Decode bytes as text, rejecting obviously binary input
fn decode(bytes: &[u8]) -> Result<Cow<'_, str>> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    if bytes.contains(&0) {
        return Err(Error::Extraction(
            "File contains binary data and is not a CSV".into(),
        ));
    }
    Ok(String::from_utf8_lossy(bytes))
}

/// Pick comma, semicolon or tab by frequency in the first non-blank line
fn sniff_delimiter(text: &str) -> u8 {
    let first = text.lines().find(|l| !l.trim().is_empty()).unwrap_or("");
    let count = |c: char| first.matches(c).count();
    let (commas, semicolons, tabs) = (count(','), count(';'), count('\t'));
    if tabs > commas && tabs >= semicolons {
        b'\t'
    } else if semicolons > commas {
        b';'
    } else {
        b','
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_row_detected() {
        let csv = "Date,Narration,Debit,Credit\n01/02/2024,UPI-XYZ-STORE,250.00,\n";
        let table = extract_csv(csv.as_bytes()).unwrap();
        assert_eq!(
            table.headers,
            Some(vec![
                "Date".to_string(),
                "Narration".to_string(),
                "Debit".to_string(),
                "Credit".to_string()
            ])
        );
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0][2], "250.00");
        assert_eq!(table.rows[0][3], "");
    }

    #[test]
    fn test_preamble_before_header() {
        let csv = "HDFC BANK Ltd.,,\nAccount No,50100012345678,\n\nDate,Narration,Withdrawal Amt.,Deposit Amt.,Closing Balance\n01/02/24,SALARY,,50000.00,51000.00\n";
        let table = extract_csv(csv.as_bytes()).unwrap();
        assert!(table.headers.is_some());
        assert_eq!(table.preamble.len(), 2);
        assert!(table.preamble[0].contains("HDFC BANK"));
        assert_eq!(table.rows.len(), 1);
    }

    #[test]
    fn test_headerless_rows_kept_positional() {
        let csv = "01/02/2024,COFFEE,120.00\n02/02/2024,BOOKS,300.00\n";
        let table = extract_csv(csv.as_bytes()).unwrap();
        assert!(table.headers.is_none());
        assert_eq!(table.rows.len(), 2);
    }

    #[test]
    fn test_semicolon_delimiter() {
        let csv = "Date;Description;Amount\n01/02/2024;COFFEE;-120,00\n";
        let table = extract_csv(csv.as_bytes()).unwrap();
        assert_eq!(table.headers.as_ref().map(|h| h.len()), Some(3));
        assert_eq!(table.rows[0][2], "-120,00");
    }

    #[test]
    fn test_binary_input_rejected() {
        let bytes = b"\x89PNG\r\n\x1a\n\x00\x00\x00\rIHDR";
        let err = extract_csv(bytes).unwrap_err();
        assert!(matches!(err, Error::Extraction(_)));
    }

    #[test]
    fn test_empty_input_is_empty_table() {
        let table = extract_csv(b"").unwrap();
        assert!(table.headers.is_none());
        assert!(table.rows.is_empty());
    }
}
