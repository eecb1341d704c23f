//! Shared error types for the controls and drivers

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SharedError {
    #[error("Serialization failed: {message}")]
    SerializationError { message: String },

    #[error("Invalid configuration: {field} = {value}")]
    InvalidConfig { field: String, value: String },
}

impl SharedError {
    pub fn invalid_config(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            value: value.into(),
        }
    }
}

impl From<serde_json::Error> for SharedError {
    fn from(e: serde_json::Error) -> Self {
        Self::SerializationError { message: e.to_string() }
    }
}

pub type SharedResult<T> = Result<T, SharedError>;
