//! Transaction parsing for OCR'd payment-app screenshots
//!
//! Lines are grouped into blocks, each describing at most one transaction.
//! A block holds at most one amount, one date and one direction keyword;
//! a line that would add a second of any, or any anchor after the block is
//! complete, opens a new block. A date alone on the line that opens a block
//! is a date header ("03 Mar 2024" above a group of entries); blocks without
//! a date of their own inherit the most recent one.

use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use super::tokens::{find_amount, find_date, strip_anchors, Strictness, Token};
use crate::extract::{canonicalize_currency, ExtractedText};
use crate::models::{Bank, CandidateTransaction, Confidence, DirectionHint, TransactionSource};

use super::statement::UNKNOWN_BANK_LABEL;

const CREDIT_WORDS: &[&str] = &[
    "received", "credited", "credit", "refund", "refunded", "cashback", "deposited", "cr",
];
const DEBIT_WORDS: &[&str] = &[
    "paid", "debited", "debit", "sent", "spent", "withdrawn", "purchase", "dr",
];
const TRANSFER_WORDS: &[&str] = &["upi", "neft", "imps", "rtgs"];
const FAILURE_WORDS: &[&str] = &[
    "failed",
    "failure",
    "declined",
    "unsuccessful",
    "not successful",
    "rejected",
    "could not be processed",
];
/// App chrome labels; a line is chrome only when it is one of these,
/// optionally followed by `: value`
const CHROME_LABELS: &[&str] = &["search transactions", "search transaction", "payment method", "status"];

#[derive(Debug, Default)]
struct Block {
    lines: Vec<String>,
    date: Option<Token>,
    amount: Option<Token>,
    direction: Option<DirectionHint>,
    keyword: bool,
    inherited_date: Option<Token>,
}

impl Block {
    fn is_complete(&self) -> bool {
        self.date.is_some() && self.amount.is_some()
    }

    fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

struct LineAnchors {
    date: Option<Token>,
    amount: Option<Token>,
    /// From a keyword or a sign in front of the amount
    direction: Option<DirectionHint>,
    /// From a keyword only
    keyword: bool,
    transfer: bool,
}

impl LineAnchors {
    fn read(line: &str) -> Self {
        let lower = line.to_lowercase();
        Self {
            date: find_date(line),
            amount: find_amount(line),
            direction: direction_of(line),
            keyword: contains_word(&lower, CREDIT_WORDS) || contains_word(&lower, DEBIT_WORDS),
            transfer: contains_word(&lower, TRANSFER_WORDS),
        }
    }

    fn any(&self) -> bool {
        self.date.is_some() || self.amount.is_some() || self.direction.is_some() || self.transfer
    }

    fn is_date_header(&self) -> bool {
        self.date.is_some() && self.amount.is_none() && self.direction.is_none()
    }
}

/// Parse OCR'd lines into candidate transactions
///
/// `bank` labels every candidate; without one the text itself is searched
/// for bank identifiers.
pub fn parse_ocr_text(text: &ExtractedText, bank: Option<Bank>) -> Vec<CandidateTransaction> {
    let bank_label = bank
        .or_else(|| Bank::identify(&text.joined()))
        .map(|b| b.display_name().to_string())
        .unwrap_or_else(|| UNKNOWN_BANK_LABEL.to_string());

    let lines: Vec<String> = text.lines.iter().map(|l| canonicalize_currency(l)).collect();
    let blocks = segment(&lines);
    let total = blocks.len();
    let candidates: Vec<CandidateTransaction> = blocks
        .into_iter()
        .filter_map(|block| candidate_from_block(block, &bank_label, text.confidence))
        .collect();

    debug!(
        "OCR parser kept {} of {} blocks (bank '{}')",
        candidates.len(),
        total,
        bank_label
    );
    candidates
}

fn segment(lines: &[String]) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut current = Block::default();
    let mut header_date: Option<Token> = None;

    for line in lines {
        let line = line.trim();
        if line.is_empty() || is_chrome(line) {
            continue;
        }
        let anchors = LineAnchors::read(line);

        let opens_new = (anchors.amount.is_some() && current.amount.is_some())
            || (anchors.date.is_some() && current.date.is_some())
            || (anchors.keyword && current.keyword)
            || (current.is_complete() && anchors.any())
            || (anchors.is_date_header() && header_date.is_some() && current.amount.is_some());

        if opens_new && !current.is_empty() {
            blocks.push(std::mem::take(&mut current));
        }
        if current.is_empty() {
            current.inherited_date = header_date.clone();
            if anchors.is_date_header() {
                header_date = anchors.date.clone();
            }
        }
        if current.date.is_none() {
            current.date = anchors.date;
        }
        if current.amount.is_none() {
            current.amount = anchors.amount;
        }
        if current.direction.is_none() {
            current.direction = anchors.direction;
        }
        current.keyword |= anchors.keyword;
        current.lines.push(line.to_string());
    }

    if !current.is_empty() {
        blocks.push(current);
    }
    blocks
}

fn candidate_from_block(
    block: Block,
    bank: &str,
    extraction_confidence: Confidence,
) -> Option<CandidateTransaction> {
    let text = block.lines.join(" ");
    let lower = text.to_lowercase();

    if FAILURE_WORDS.iter().any(|w| lower.contains(w)) {
        debug!("Discarding failed transaction block: {}", text);
        return None;
    }
    if block.amount.is_none() && block.date.is_none() {
        return None;
    }

    let (date, date_inherited) = match (block.date, block.inherited_date) {
        (Some(d), _) => (Some(d), false),
        (None, Some(d)) => (Some(d), true),
        (None, None) => (None, false),
    };
    let amount = block.amount;

    let is_loose = |t: &Option<Token>| t.as_ref().map(|t| t.strictness == Strictness::Loose).unwrap_or(true);
    let loose = date_inherited || is_loose(&amount) || is_loose(&date);
    let confidence = if loose || extraction_confidence == Confidence::Low {
        Confidence::Low
    } else {
        Confidence::High
    };

    Some(CandidateTransaction {
        raw_date: date.map(|d| d.text).unwrap_or_default(),
        raw_amount: amount.map(|a| a.text).unwrap_or_default(),
        description: describe(&text),
        bank: bank.to_string(),
        direction_hint: block.direction.unwrap_or(DirectionHint::Unknown),
        signed_amount: false,
        source: TransactionSource::Ocr,
        confidence,
    })
}

fn is_chrome(line: &str) -> bool {
    let lower = line.trim().to_lowercase();
    CHROME_LABELS.iter().any(|label| {
        lower
            .strip_prefix(label)
            .map(|rest| {
                let rest = rest.trim_start();
                rest.is_empty() || rest.starts_with(':')
            })
            .unwrap_or(false)
    })
}

fn contains_word(lower: &str, words: &[&str]) -> bool {
    lower
        .split(|c: char| !c.is_alphanumeric())
        .any(|token| words.contains(&token))
}

/// Direction from the first direction keyword or sign in a line
fn direction_of(line: &str) -> Option<DirectionHint> {
    let lower = line.to_lowercase();
    let mut earliest: Option<(usize, DirectionHint)> = None;
    let mut offset = 0;
    for token in lower.split(|c: char| !c.is_alphanumeric()) {
        let hint = if CREDIT_WORDS.contains(&token) {
            Some(DirectionHint::Credit)
        } else if DEBIT_WORDS.contains(&token) {
            Some(DirectionHint::Debit)
        } else {
            None
        };
        if let Some(hint) = hint {
            earliest = Some((offset, hint));
            break;
        }
        offset += token.len() + 1;
    }

    if let Some(sign) = sign_re().find(line) {
        let hint = if sign.as_str().starts_with('+') {
            DirectionHint::Credit
        } else {
            DirectionHint::Debit
        };
        if earliest.map(|(pos, _)| sign.start() < pos).unwrap_or(true) {
            earliest = Some((sign.start(), hint));
        }
    }

    earliest.map(|(_, hint)| hint)
}

/// A sign directly in front of a currency amount
fn sign_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[+-]\s*₹").expect("valid regex"))
}

fn counterparty_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)\b(?:paid to|sent to|transferred to|payment to|received from|payment from|to|from)\s+(.+?)\s*(?:\b(?:on|at|via|using|for|upi|imps|neft|rtgs|ref|txn|id)\b|[,|:]|$)",
        )
        .expect("valid regex")
    })
}

fn trailing_reference_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)[\s/-]+(?:upi|imps|neft|rtgs|ref|id|txn|utr)(?:[\s:#./-]*[a-z0-9]*\d[a-z0-9]*)?\s*$")
            .expect("valid regex")
    })
}

/// Human-readable description of a block
///
/// Prefers the counterparty of a "to X" / "from X" phrase; otherwise the
/// block text without anchors, direction words and reference numbers.
fn describe(text: &str) -> String {
    let stripped = strip_anchors(text);

    let description = match counterparty_re().captures(&stripped) {
        Some(caps) => caps[1].to_string(),
        None => stripped
            .split_whitespace()
            .filter(|w| {
                let lower = w.to_lowercase();
                !CREDIT_WORDS.contains(&lower.as_str())
                    && !DEBIT_WORDS.contains(&lower.as_str())
                    && !matches!(lower.as_str(), "on" | "to" | "from" | "by" | "via")
            })
            .collect::<Vec<_>>()
            .join(" "),
    };

    let mut description = description;
    loop {
        let trimmed = trailing_reference_re().replace(&description, "").into_owned();
        if trimmed == description {
            break;
        }
        description = trimmed;
    }

    description
        .trim_matches(|c: char| c.is_whitespace() || matches!(c, ',' | '-' | ':' | '|' | '.'))
        .to_string()
}
