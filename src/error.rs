//! Error types for Spendwise

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Database pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    /// The remote classifier could not be reached (network failure or timeout).
    /// Recovered internally by the resolver; never reaches `resolve_category` callers.
    #[error("Classifier unavailable: {0}")]
    ClassifierUnavailable(String),

    /// The remote classifier responded but the response was unusable.
    /// Also absorbed by the resolver's fallback cascade.
    #[error("Classifier error: {0}")]
    ClassifierError(String),

    /// Goal contribution was zero or negative. Surfaced to the caller.
    #[error("Invalid contribution: amount must be positive, got {0} cents")]
    InvalidContribution(i64),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, Error>;
