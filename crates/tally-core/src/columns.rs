//! Column-name vocabulary shared by extraction and the statement parsers
//!
//! Header cells are compared after normalization: lower-cased, every
//! non-alphanumeric run replaced by a single space, trimmed. So
//! "Withdrawal Amt." becomes "withdrawal amt" and "Dr / Cr" becomes "dr cr".

/// What a statement column holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnRole {
    Date,
    Description,
    Debit,
    Credit,
    /// Single amount column, possibly signed
    Amount,
    /// Separate "Dr"/"Cr" marker column next to an unsigned amount
    DrCr,
    Balance,
    Reference,
}

/// Alias table used by the generic layout and by header recognition
pub const GENERIC_ALIASES: &[(ColumnRole, &[&str])] = &[
    (
        ColumnRole::Date,
        &[
            "date",
            "txn date",
            "transaction date",
            "tran date",
            "trans date",
            "value date",
            "value dt",
            "posting date",
            "post date",
        ],
    ),
    (
        ColumnRole::Description,
        &[
            "narration",
            "description",
            "particulars",
            "details",
            "transaction details",
            "transaction remarks",
            "remarks",
            "transaction particulars",
        ],
    ),
    (
        ColumnRole::Debit,
        &[
            "debit",
            "debit amount",
            "debit inr",
            "debits",
            "dr",
            "withdrawal",
            "withdrawals",
            "withdrawal amt",
            "withdrawal amount",
            "withdrawal amount inr",
        ],
    ),
    (
        ColumnRole::Credit,
        &[
            "credit",
            "credit amount",
            "credit inr",
            "credits",
            "cr",
            "deposit",
            "deposits",
            "deposit amt",
            "deposit amount",
            "deposit amount inr",
        ],
    ),
    (
        ColumnRole::Amount,
        &[
            "amount",
            "amount inr",
            "amt",
            "txn amount",
            "transaction amount",
        ],
    ),
    (ColumnRole::DrCr, &["dr cr", "cr dr", "type", "txn type"]),
    (
        ColumnRole::Balance,
        &[
            "balance",
            "bal",
            "balance inr",
            "closing balance",
            "running balance",
            "available balance",
        ],
    ),
    (
        ColumnRole::Reference,
        &[
            "chq ref no",
            "ref no",
            "ref no cheque no",
            "cheque no",
            "chq no",
            "chqno",
            "reference",
            "reference no",
        ],
    ),
];

/// Normalize a header cell for alias comparison
pub fn normalize_header(cell: &str) -> String {
    let mut out = String::with_capacity(cell.len());
    let mut pending_space = false;
    for c in cell.chars() {
        if c.is_alphanumeric() {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.extend(c.to_lowercase());
        } else {
            pending_space = true;
        }
    }
    out
}

/// Role of a header cell according to the generic alias table
pub fn generic_role(cell: &str) -> Option<ColumnRole> {
    let normalized = normalize_header(cell);
    GENERIC_ALIASES
        .iter()
        .find(|(_, aliases)| aliases.contains(&normalized.as_str()))
        .map(|(role, _)| *role)
}

/// Whether a row of cells reads as a statement header
///
/// Requires a date column plus at least one more recognized column.
pub fn is_recognized_header<S: AsRef<str>>(cells: &[S]) -> bool {
    let roles: Vec<ColumnRole> = cells
        .iter()
        .filter_map(|c| generic_role(c.as_ref()))
        .collect();
    roles.contains(&ColumnRole::Date) && roles.len() >= 2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_header() {
        assert_eq!(normalize_header("Withdrawal Amt."), "withdrawal amt");
        assert_eq!(normalize_header("  Dr / Cr "), "dr cr");
        assert_eq!(normalize_header("Chq./Ref.No."), "chq ref no");
        assert_eq!(normalize_header("Balance (INR)"), "balance inr");
    }

    #[test]
    fn test_generic_role() {
        assert_eq!(generic_role("Txn Date"), Some(ColumnRole::Date));
        assert_eq!(generic_role("PARTICULARS"), Some(ColumnRole::Description));
        assert_eq!(generic_role("Deposit Amt."), Some(ColumnRole::Credit));
        assert_eq!(generic_role("Card No."), None);
    }

    #[test]
    fn test_is_recognized_header() {
        assert!(is_recognized_header(&["Date", "Narration", "Debit", "Credit"]));
        assert!(is_recognized_header(&["Value Date", "Amount"]));
        assert!(!is_recognized_header(&["01/02/2024", "UPI-XYZ-STORE", "250.00", ""]));
        assert!(!is_recognized_header(&["Narration", "Amount"]));
    }
}
