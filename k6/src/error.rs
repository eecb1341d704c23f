//! k6 driver error types

use shared::SharedError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for k6 driver operations
pub type K6Result<T> = Result<T, K6Error>;

/// k6 driver error types
#[derive(Error, Debug)]
pub enum K6Error {
    /// The k6 binary is missing or could not be executed. Distinct from a run
    /// that completed and reported failure.
    #[error("k6 driver unavailable: failed to spawn '{binary}': {source}")]
    DriverUnavailable {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid HTTP Response status code expectation: {status}")]
    InvalidStatus { status: u16 },

    #[error("Invalid HTTP Request method: {method}")]
    InvalidMethod { method: String },

    #[error("Endpoint is a required argument")]
    MissingEndpoint,

    #[error("Invalid stage '{value}', expected <duration>:<target>")]
    InvalidStage { value: String },

    #[error("Cannot open log file {}: {source}", .path.display())]
    LogFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot share the console with the k6 process: {0}")]
    Console(#[source] std::io::Error),

    #[error("Failed waiting for k6 process: {0}")]
    Wait(#[source] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Shared component error: {0}")]
    Shared(#[from] SharedError),
}

impl K6Error {
    pub fn driver_unavailable(binary: impl Into<String>, source: std::io::Error) -> Self {
        Self::DriverUnavailable {
            binary: binary.into(),
            source,
        }
    }

    /// Caller-side configuration problem detected before any process spawn
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            K6Error::InvalidStatus { .. }
                | K6Error::InvalidMethod { .. }
                | K6Error::MissingEndpoint
                | K6Error::InvalidStage { .. }
        )
    }
}
