//! Error types for the payoff core

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Malformed or out-of-range request data. Never retried.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A debt whose payment cannot retire it.
    #[error("Payment cannot retire '{debt}': {reason}")]
    NonConvergentPayment { debt: String, reason: String },

    #[error("Config error: {0}")]
    Config(String),

    #[error("LLM backend error: {0}")]
    Llm(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Name of the debt that could not be amortized, if any
    pub fn offending_debt(&self) -> Option<&str> {
        match self {
            Error::NonConvergentPayment { debt, .. } => Some(debt),
            _ => None,
        }
    }

    /// Whether the caller sent bad data (4xx-equivalent)
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidInput(_) | Error::NonConvergentPayment { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
