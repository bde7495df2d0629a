//! Error types for Tally

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Database pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// The bytes could not be decoded as the declared document kind at all
    #[error("Extraction error: {0}")]
    Extraction(String),

    /// No statement strategy (including the generic fallback) could locate
    /// a date column and an amount column
    #[error("Unsupported layout: {0}")]
    UnsupportedLayout(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid category: {0}")]
    InvalidCategory(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
