//! Normalization of candidate transactions
//!
//! The one place where parser output becomes canonical: dates are parsed,
//! amounts become non-negative numbers with the direction split out, and a
//! category is assigned. A candidate that cannot be normalized is dropped
//! and counted by the caller.

use std::sync::OnceLock;

use chrono::{Datelike, NaiveDate};
use regex::Regex;

use crate::categorize::Categorizer;
use crate::models::{
    CandidateTransaction, DirectionHint, NewTransaction, TransactionType, UNKNOWN_BANK,
};

/// Description stored when a record has no readable text
pub const UNKNOWN_DESCRIPTION: &str = "Unknown Transaction";

/// Formats for dates with a four-digit year, day-month variants first
const FULL_YEAR_FORMATS: &[&str] = &[
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%d %b %Y",
    "%d-%b-%Y",
    "%d/%b/%Y",
    "%b %d %Y",
    "%m/%d/%Y",
    "%m-%d-%Y",
];

/// Formats for dates with a two-digit year
const SHORT_YEAR_FORMATS: &[&str] = &[
    "%d/%m/%y",
    "%d-%m-%y",
    "%d.%m.%y",
    "%d %b %y",
    "%d-%b-%y",
    "%d/%b/%y",
    "%m/%d/%y",
    "%m-%d-%y",
];

/// Formats for dates without a year, completed with a candidate year
const NO_YEAR_FORMATS: &[&str] = &["%d %b %Y", "%b %d %Y"];

fn time_suffix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)[\sT,]+\d{1,2}:\d{2}(?::\d{2})?(?:\.\d+)?\s*(?:am|pm)?(?:\s*(?:z|[+-]\d{2}:?\d{2}))?\s*$")
            .expect("valid regex")
    })
}

fn ordinal_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)(\d)(?:st|nd|rd|th)\b").expect("valid regex"))
}

fn full_year_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?:^|\D)\d{4}(?:\D|$)").expect("valid regex"))
}

fn short_year_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[/\-. ]\d{2}$").expect("valid regex"))
}

fn currency_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)₹|\brs\.?|\binr\b").expect("valid regex"))
}

fn marker_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\s*(cr|dr)\.?\s*$").expect("valid regex"))
}

fn number_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+(?:\.\d+)?$").expect("valid regex"))
}

fn decimal_comma_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+,\d{2}$").expect("valid regex"))
}

fn dot_grouped_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[1-9]\d{0,2}(?:\.\d{3})+(?:,\d{1,2})?$").expect("valid regex"))
}

/// Round to paise
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Parse a date string against the accepted formats
///
/// Dates without a year resolve to the latest such date not after
/// `reference`.
pub fn parse_date(raw: &str, reference: NaiveDate) -> Option<NaiveDate> {
    let cleaned = clean_date(raw);
    if cleaned.is_empty() {
        return None;
    }

    if full_year_re().is_match(&cleaned) {
        return FULL_YEAR_FORMATS
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(&cleaned, fmt).ok())
            .filter(|d| d.year() >= 1900);
    }

    if short_year_re().is_match(&cleaned) {
        if let Some(date) = SHORT_YEAR_FORMATS
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(&cleaned, fmt).ok())
        {
            return Some(date);
        }
    }

    let year = reference.year();
    NO_YEAR_FORMATS.iter().find_map(|fmt| {
        let this_year = NaiveDate::parse_from_str(&format!("{} {}", cleaned, year), fmt).ok();
        match this_year {
            Some(date) if date <= reference => Some(date),
            Some(_) => NaiveDate::parse_from_str(&format!("{} {}", cleaned, year - 1), fmt).ok(),
            // 29 Feb in a non-leap reference year
            None => NaiveDate::parse_from_str(&format!("{} {}", cleaned, year - 1), fmt)
                .ok()
                .or_else(|| {
                    NaiveDate::parse_from_str(&format!("{} {}", cleaned, year - 4), fmt).ok()
                }),
        }
    })
}

fn clean_date(raw: &str) -> String {
    let without_time = time_suffix_re().replace(raw.trim(), "");
    let without_ordinals = ordinal_re().replace_all(&without_time, "$1");
    without_ordinals
        .replace(',', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// A parsed amount and the direction its text encoded, if any
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParsedAmount {
    pub value: f64,
    pub marker: Option<TransactionType>,
}

/// Parse an amount string
///
/// Accepts currency prefixes (₹, Rs, INR), Indian and western digit
/// grouping, a leading sign, accounting parentheses and trailing CR/DR.
/// Zero and non-numeric values yield `None`.
pub fn parse_amount(raw: &str) -> Option<ParsedAmount> {
    let mut text = raw.trim().to_string();
    let mut marker = None;

    if let Some(caps) = marker_re().captures(&text) {
        marker = Some(if caps[1].eq_ignore_ascii_case("cr") {
            TransactionType::Credit
        } else {
            TransactionType::Debit
        });
        let end = caps.get(0).map(|m| m.start()).unwrap_or(text.len());
        text.truncate(end);
    }

    let mut text: String = currency_re()
        .replace_all(&text, "")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    if text.starts_with('(') && text.ends_with(')') && text.len() > 2 {
        text = text[1..text.len() - 1].to_string();
        marker = marker.or(Some(TransactionType::Debit));
    }

    if let Some(rest) = text.strip_prefix('-') {
        text = rest.to_string();
        marker = marker.or(Some(TransactionType::Debit));
    } else if let Some(rest) = text.strip_prefix('+') {
        text = rest.to_string();
        marker = marker.or(Some(TransactionType::Credit));
    }

    // The last separator is the decimal mark when both are present
    let text = if dot_grouped_re().is_match(&text) {
        text.replace('.', "").replace(',', ".")
    } else if decimal_comma_re().is_match(&text) {
        text.replace(',', ".")
    } else if text.rfind(',') > text.rfind('.') && text.contains('.') {
        return None;
    } else {
        text.replace(',', "")
    };

    if !number_re().is_match(&text) {
        return None;
    }
    let value = round2(text.parse::<f64>().ok()?);
    if !value.is_finite() || value <= 0.0 {
        return None;
    }

    Some(ParsedAmount { value, marker })
}

/// Collapse whitespace; empty text becomes the unknown-description marker
pub fn normalize_description(description: &str) -> String {
    let collapsed = description.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        UNKNOWN_DESCRIPTION.to_string()
    } else {
        collapsed
    }
}

/// Converts candidates into canonical transactions
#[derive(Debug, Clone)]
pub struct Normalizer {
    categorizer: Categorizer,
    reference_date: NaiveDate,
}

impl Normalizer {
    /// `reference_date` anchors dates printed without a year
    pub fn new(categorizer: Categorizer, reference_date: NaiveDate) -> Self {
        Self {
            categorizer,
            reference_date,
        }
    }

    /// Normalize a candidate; `None` when its date or amount is unreadable
    ///
    /// Direction precedence: a sign or CR/DR marker in the amount text, then
    /// a signed-amount column (unsigned positive means credit), then the
    /// parser's hint, then debit.
    pub fn normalize(&self, candidate: &CandidateTransaction) -> Option<NewTransaction> {
        let date = parse_date(&candidate.raw_date, self.reference_date)?;
        let amount = parse_amount(&candidate.raw_amount)?;

        let transaction_type = match (amount.marker, candidate.signed_amount, candidate.direction_hint) {
            (Some(marker), _, _) => marker,
            (None, true, _) => TransactionType::Credit,
            (None, false, DirectionHint::Credit) => TransactionType::Credit,
            (None, false, DirectionHint::Debit | DirectionHint::Unknown) => TransactionType::Debit,
        };

        let description = normalize_description(&candidate.description);
        let bank = match candidate.bank.trim() {
            "" => UNKNOWN_BANK.to_string(),
            b if b.eq_ignore_ascii_case("unknown") => UNKNOWN_BANK.to_string(),
            b => b.to_string(),
        };
        let category = self
            .categorizer
            .categorize(&description, transaction_type)
            .to_string();

        Some(NewTransaction {
            date,
            amount: amount.value,
            transaction_type,
            description,
            bank,
            category,
            source: candidate.source,
        })
    }
}
