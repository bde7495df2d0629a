//! Bank statement layouts and their column signatures

use crate::columns::{generic_role, normalize_header, ColumnRole};
use crate::models::Bank;

type Signature = &'static [(ColumnRole, &'static [&'static str])];

const HDFC: Signature = &[
    (ColumnRole::Date, &["date"]),
    (ColumnRole::Description, &["narration"]),
    (ColumnRole::Debit, &["withdrawal amt", "withdrawal amount", "debit"]),
    (ColumnRole::Credit, &["deposit amt", "deposit amount", "credit"]),
    (ColumnRole::Balance, &["closing balance", "balance"]),
];

const SBI: Signature = &[
    (ColumnRole::Date, &["txn date", "date"]),
    (ColumnRole::Description, &["description"]),
    (ColumnRole::Debit, &["debit"]),
    (ColumnRole::Credit, &["credit"]),
    (ColumnRole::Balance, &["balance"]),
];

const ICICI: Signature = &[
    (ColumnRole::Date, &["transaction date", "value date", "date"]),
    (ColumnRole::Description, &["transaction remarks", "particulars"]),
    (
        ColumnRole::Debit,
        &["withdrawal amount inr", "withdrawal amount", "debit"],
    ),
    (
        ColumnRole::Credit,
        &["deposit amount inr", "deposit amount", "credit"],
    ),
    (ColumnRole::Balance, &["balance inr", "balance"]),
];

const AXIS: Signature = &[
    (ColumnRole::Date, &["tran date", "date"]),
    (ColumnRole::Description, &["particulars"]),
    (ColumnRole::Debit, &["dr", "debit"]),
    (ColumnRole::Credit, &["cr", "credit"]),
    (ColumnRole::Balance, &["bal", "balance"]),
];

const KOTAK: Signature = &[
    (ColumnRole::Date, &["transaction date", "date"]),
    (ColumnRole::Description, &["narration", "description"]),
    (ColumnRole::Debit, &["debit amount", "withdrawal amount"]),
    (ColumnRole::Credit, &["credit amount", "deposit amount"]),
    (ColumnRole::Balance, &["balance"]),
];

/// A statement parsing strategy
///
/// The set is closed: one layout per supported bank plus the generic
/// fallback, probed in the order of [`StatementLayout::bank_layouts`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementLayout {
    Hdfc,
    Sbi,
    Icici,
    Axis,
    Kotak,
    GenericCsv,
}

impl StatementLayout {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hdfc => "hdfc",
            Self::Sbi => "sbi",
            Self::Icici => "icici",
            Self::Axis => "axis",
            Self::Kotak => "kotak",
            Self::GenericCsv => "generic_csv",
        }
    }

    /// Bank-specific layouts in probe order
    pub fn bank_layouts() -> &'static [StatementLayout] {
        &[Self::Hdfc, Self::Sbi, Self::Icici, Self::Axis, Self::Kotak]
    }

    pub fn for_bank(bank: Bank) -> Self {
        match bank {
            Bank::Hdfc => Self::Hdfc,
            Bank::Sbi => Self::Sbi,
            Bank::Icici => Self::Icici,
            Bank::Axis => Self::Axis,
            Bank::Kotak => Self::Kotak,
        }
    }

    pub fn bank(&self) -> Option<Bank> {
        match self {
            Self::Hdfc => Some(Bank::Hdfc),
            Self::Sbi => Some(Bank::Sbi),
            Self::Icici => Some(Bank::Icici),
            Self::Axis => Some(Bank::Axis),
            Self::Kotak => Some(Bank::Kotak),
            Self::GenericCsv => None,
        }
    }

    /// Expected columns; empty for the generic layout
    fn signature(&self) -> Signature {
        match self {
            Self::Hdfc => HDFC,
            Self::Sbi => SBI,
            Self::Icici => ICICI,
            Self::Axis => AXIS,
            Self::Kotak => KOTAK,
            Self::GenericCsv => &[],
        }
    }

    /// Fraction of this layout's expected columns present in `headers`
    pub fn signature_fraction<S: AsRef<str>>(&self, headers: &[S]) -> f64 {
        let signature = self.signature();
        if signature.is_empty() {
            return 0.0;
        }
        let normalized: Vec<String> = headers.iter().map(|h| normalize_header(h.as_ref())).collect();
        let present = signature
            .iter()
            .filter(|(_, aliases)| normalized.iter().any(|h| aliases.contains(&h.as_str())))
            .count();
        present as f64 / signature.len() as f64
    }

    /// Map header cells to column roles
    ///
    /// The layout's own aliases are tried first, in the order listed, so an
    /// earlier alias beats an earlier column (ICICI's "Transaction Date"
    /// over its leading "Value Date"). Anything left unmatched falls back
    /// to the generic alias table, where the first column claiming a role
    /// wins.
    pub fn resolve_columns<S: AsRef<str>>(&self, headers: &[S]) -> ColumnMap {
        let mut map = ColumnMap::default();
        let normalized: Vec<String> = headers.iter().map(|h| normalize_header(h.as_ref())).collect();

        for (role, aliases) in self.signature() {
            let found = aliases.iter().find_map(|alias| {
                normalized
                    .iter()
                    .enumerate()
                    .position(|(idx, header)| header == alias && map.role_of(idx).is_none())
            });
            if let Some(idx) = found {
                map.assign(*role, idx);
            }
        }

        for (idx, header) in headers.iter().enumerate() {
            if map.role_of(idx).is_some() {
                continue;
            }
            if let Some(role) = generic_role(header.as_ref()) {
                map.assign(role, idx);
            }
        }

        map
    }
}

impl std::fmt::Display for StatementLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Column index for each role found in a table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMap {
    pub date: Option<usize>,
    pub description: Option<usize>,
    pub debit: Option<usize>,
    pub credit: Option<usize>,
    pub amount: Option<usize>,
    pub dr_cr: Option<usize>,
    pub balance: Option<usize>,
    pub reference: Option<usize>,
}

impl ColumnMap {
    fn slot(&mut self, role: ColumnRole) -> &mut Option<usize> {
        match role {
            ColumnRole::Date => &mut self.date,
            ColumnRole::Description => &mut self.description,
            ColumnRole::Debit => &mut self.debit,
            ColumnRole::Credit => &mut self.credit,
            ColumnRole::Amount => &mut self.amount,
            ColumnRole::DrCr => &mut self.dr_cr,
            ColumnRole::Balance => &mut self.balance,
            ColumnRole::Reference => &mut self.reference,
        }
    }

    /// Assign a role unless it is already taken
    pub fn assign(&mut self, role: ColumnRole, idx: usize) {
        let slot = self.slot(role);
        if slot.is_none() {
            *slot = Some(idx);
        }
    }

    pub fn role_of(&self, idx: usize) -> Option<ColumnRole> {
        [
            (ColumnRole::Date, self.date),
            (ColumnRole::Description, self.description),
            (ColumnRole::Debit, self.debit),
            (ColumnRole::Credit, self.credit),
            (ColumnRole::Amount, self.amount),
            (ColumnRole::DrCr, self.dr_cr),
            (ColumnRole::Balance, self.balance),
            (ColumnRole::Reference, self.reference),
        ]
        .into_iter()
        .find(|(_, col)| *col == Some(idx))
        .map(|(role, _)| role)
    }

    /// A date column and at least one value column
    pub fn is_usable(&self) -> bool {
        self.date.is_some() && (self.amount.is_some() || self.debit.is_some() || self.credit.is_some())
    }
}
