//! Error types for ingestion field generation

use thiserror::Error;

/// Errors raised while reading a finalized schema
#[derive(Error, Debug)]
pub enum MappingError {
    /// Invalid schema structure
    #[error("Invalid schema structure at '{path}': {message}")]
    InvalidSchema { path: String, message: String },

    /// Unknown `type` keyword
    #[error("Unsupported type '{type_name}' at '{path}'")]
    UnsupportedType { path: String, type_name: String },
}

impl MappingError {
    pub(crate) fn invalid(path: impl Into<String>, message: impl Into<String>) -> Self {
        MappingError::InvalidSchema {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Result type for mapping operations
pub type MappingResult<T> = Result<T, MappingError>;
