//! Loki control error types

use shared::SharedError;
use thiserror::Error;

/// Result type for Loki control operations
pub type LokiResult<T> = Result<T, LokiError>;

/// Loki control error types
///
/// None of these ever reach the experiment engine: the sink logs and drops
/// them at the callback boundary.
#[derive(Error, Debug)]
pub enum LokiError {
    #[error("Log push transport error: {message}")]
    Transport { message: String },

    #[error("Log push rejected by {url}: HTTP {status} {body}")]
    Rejected { url: String, status: u16, body: String },

    #[error("Payload serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Shared component error: {0}")]
    Shared(#[from] SharedError),
}

impl LokiError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport { message: message.into() }
    }
}

impl From<reqwest::Error> for LokiError {
    fn from(e: reqwest::Error) -> Self {
        Self::transport(e.to_string())
    }
}
