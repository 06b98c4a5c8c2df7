//! CLI error types

use std::path::PathBuf;

use thiserror::Error;

use dataset_schema_core::inference::{ConfigError, SchemaGenerationError};
use dataset_schema_core::mapping::MappingError;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Failed to read {0}: {1}")]
    FileReadError(PathBuf, String),

    #[error("Failed to write {0}: {1}")]
    FileWriteError(PathBuf, String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid JSON in {0}: {1}")]
    InvalidJson(String, String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Schema generation failed: {0}")]
    Generation(#[from] SchemaGenerationError),

    #[error("Field generation failed: {0}")]
    Mapping(#[from] MappingError),

    #[error("Serialization failed: {0}")]
    Serialization(String),
}
