//! Keyword-based category assignment
//!
//! Rules come from configuration and are checked in order; the first rule
//! whose keyword appears in the description wins. Categories are only ever
//! picked from the vocabulary, falling back to "Other".

use regex::Regex;
use tracing::debug;

use crate::config::CategoryRule;
use crate::error::Result;
use crate::models::{CategoryVocabulary, TransactionType, DEFAULT_CATEGORY};

#[derive(Debug, Clone)]
struct CompiledRule {
    category: String,
    pattern: Regex,
    credit_only: bool,
}

/// Assigns categories to descriptions
#[derive(Debug, Clone, Default)]
pub struct Categorizer {
    rules: Vec<CompiledRule>,
}

impl Categorizer {
    /// Compile rules, dropping any that target a category outside `vocab`
    pub fn new(rules: &[CategoryRule], vocab: &CategoryVocabulary) -> Result<Self> {
        let mut compiled = Vec::with_capacity(rules.len());
        for rule in rules {
            if !vocab.contains(&rule.category) {
                debug!("Skipping rule for '{}': not in vocabulary", rule.category);
                continue;
            }
            let keywords: Vec<String> = rule
                .keywords
                .iter()
                .map(|k| k.trim())
                .filter(|k| !k.is_empty())
                .map(|k| {
                    k.split_whitespace()
                        .map(regex::escape)
                        .collect::<Vec<_>>()
                        .join(r"\s+")
                })
                .collect();
            if keywords.is_empty() {
                continue;
            }
            let pattern = Regex::new(&format!(r"(?i)\b(?:{})\b", keywords.join("|")))?;
            compiled.push(CompiledRule {
                category: rule.category.clone(),
                pattern,
                credit_only: rule.credit_only,
            });
        }
        Ok(Self { rules: compiled })
    }

    /// Category for a description, or "Other"
    pub fn categorize(&self, description: &str, transaction_type: TransactionType) -> &str {
        self.rules
            .iter()
            .filter(|rule| !rule.credit_only || transaction_type == TransactionType::Credit)
            .find(|rule| rule.pattern.is_match(description))
            .map(|rule| rule.category.as_str())
            .unwrap_or(DEFAULT_CATEGORY)
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }
}
