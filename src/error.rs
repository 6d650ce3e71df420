//! Error types for MindMate

use thiserror::Error;

/// Errors surfaced at the outer string boundary of the engine.
///
/// Record-level problems never show up here: the engine skips bad records
/// and degrades to an empty entry list instead of failing.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Date parse error: {0}")]
    DateParseError(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Entry store error: {0}")]
    Store(#[from] StoreError),
}

/// Errors raised by an entry store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("Stored payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Stored payload is not a list of entries")]
    Malformed,

    #[error("Entry store unavailable: {0}")]
    Unavailable(String),
}

/// Errors raised by a sentiment scorer
#[derive(Debug, Error)]
pub enum SentimentError {
    #[error("Sentiment scorer unavailable: {0}")]
    Unavailable(String),
}

/// Errors raised while loading or validating engine configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}
