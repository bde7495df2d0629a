//! Token shapes shared by the parsers
//!
//! These only *find* date-looking and amount-looking text. Turning the text
//! into a date or a number is left to the normalizer.

use std::sync::OnceLock;

use regex::Regex;

const MONTH: &str = r"(?:jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)";

/// How a token was found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strictness {
    /// Full date with year / amount with a currency symbol
    Strict,
    /// Date without year / bare decimal number
    Loose,
}

/// A located token
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub text: String,
    pub start: usize,
    pub end: usize,
    pub strictness: Strictness,
}

fn strict_date_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        let pattern = format!(
            r"(?i)\b\d{{4}}-\d{{1,2}}-\d{{1,2}}\b|\b\d{{1,2}}[-/.]\d{{1,2}}[-/.](?:\d{{4}}|\d{{2}})\b|\b\d{{1,2}}(?:st|nd|rd|th)?[\s-]*{m}\b[\s,.-]*(?:\d{{4}}|\d{{2}})\b|\b{m}\s+\d{{1,2}}(?:st|nd|rd|th)?,?\s+\d{{4}}\b",
            m = MONTH
        );
        Regex::new(&pattern).expect("valid regex")
    })
}

fn loose_date_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        let pattern = format!(
            r"(?i)\b\d{{1,2}}(?:st|nd|rd|th)?\s*{m}\b|\b{m}\s+\d{{1,2}}(?:st|nd|rd|th)?\b",
            m = MONTH
        );
        Regex::new(&pattern).expect("valid regex")
    })
}

fn strict_amount_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)[+-]?\s*₹\s*[+-]?\d[\d,]*(?:\.\d{1,2})?(?:\s*\b(?:cr|dr)\b)?")
            .expect("valid regex")
    })
}

fn loose_amount_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)[+-]?\b(?:\d{1,3}(?:,\d{2,3})+(?:\.\d{1,2})?|\d+\.\d{2})\b(?:\s*\b(?:cr|dr)\b)?",
        )
        .expect("valid regex")
    })
}

fn time_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b\d{1,2}:\d{2}(?::\d{2})?\s*(?:am|pm)?\b").expect("valid regex")
    })
}

fn cell_amount_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^[+-]?\(?\s*(?:₹|rs\.?|inr)?\s*[+-]?\d[\d,]*(?:\.\d+)?\s*\)?\s*(?:cr|dr)?\.?$")
            .expect("valid regex")
    })
}

fn first_match(re: &Regex, text: &str, strictness: Strictness) -> Option<Token> {
    re.find(text).map(|m| Token {
        text: m.as_str().trim().to_string(),
        start: m.start(),
        end: m.end(),
        strictness,
    })
}

/// First date-shaped token, preferring full dates over year-less ones
///
/// Times are masked first so "3 Mar, 10:15" never reads as a two-digit year.
pub fn find_date(text: &str) -> Option<Token> {
    let masked = mask(text, &[time_re()]);
    first_match(strict_date_re(), &masked, Strictness::Strict)
        .or_else(|| first_match(loose_date_re(), &masked, Strictness::Loose))
        .map(|mut token| {
            token.text = text[token.start..token.end].trim().to_string();
            token
        })
}

/// First amount-shaped token, preferring currency-marked amounts
///
/// Date and time tokens are masked first so "12.05.2024" or "10:15" never
/// read as amounts.
pub fn find_amount(text: &str) -> Option<Token> {
    let masked = mask_dates_and_times(text);
    first_match(strict_amount_re(), &masked, Strictness::Strict)
        .or_else(|| first_match(loose_amount_re(), &masked, Strictness::Loose))
        .map(|mut token| {
            token.text = text[token.start..token.end].trim().to_string();
            token
        })
}

/// Replace date and time tokens with spaces, keeping byte offsets intact
pub fn mask_dates_and_times(text: &str) -> String {
    mask(text, &[time_re(), strict_date_re(), loose_date_re()])
}

fn mask(text: &str, patterns: &[&Regex]) -> String {
    let mut masked = text.to_string();
    for re in patterns {
        let ranges: Vec<(usize, usize)> = re
            .find_iter(&masked)
            .map(|m| (m.start(), m.end()))
            .collect();
        for (start, end) in ranges {
            masked.replace_range(start..end, &" ".repeat(end - start));
        }
    }
    masked
}

/// Remove every date, time and amount token from text
pub fn strip_anchors(text: &str) -> String {
    let masked = mask_dates_and_times(text);
    let without_amounts = strict_amount_re().replace_all(&masked, " ");
    let without_amounts = loose_amount_re().replace_all(&without_amounts, " ");
    without_amounts.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Whether a table cell is entirely a date
pub fn cell_is_date(cell: &str) -> bool {
    let cell = cell.trim();
    match strict_date_re().find(cell) {
        Some(m) if m.start() == 0 => time_re().replace_all(&cell[m.end()..], "").trim().is_empty(),
        _ => false,
    }
}

/// Whether a table cell is entirely an amount
pub fn cell_is_amount(cell: &str) -> bool {
    let cell = cell.trim();
    cell.chars().any(|c| c.is_ascii_digit()) && cell_amount_re().is_match(cell)
}

/// Whether a cell holds a number that is zero ("0", "0.00", "₹ 0")
pub fn cell_is_zero(cell: &str) -> bool {
    let digits: Vec<char> = cell.chars().filter(|c| c.is_ascii_digit()).collect();
    !digits.is_empty() && digits.iter().all(|c| *c == '0')
}
