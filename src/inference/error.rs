//! Error types for schema generation

use thiserror::Error;

/// Result type for inference and pipeline operations
pub type InferenceResult<T> = Result<T, SchemaGenerationError>;

/// Input errors that abort a schema generation request
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaGenerationError {
    /// No samples were supplied
    #[error("At least one sample is required to generate a schema")]
    NoSamples,

    /// Batch mode was requested without an extraction key
    #[error("Batch samples for dataset '{dataset}' require an extraction key")]
    MissingExtractionConfig { dataset: String },

    /// The extraction key path does not exist in a sample
    #[error("Extraction key '{key}' not found in sample {sample}")]
    MissingExtractionKey { key: String, sample: usize },

    /// The value at the extraction key is not an array of objects
    #[error("Value at '{key}' in sample {sample} is not an array of objects, found {found}")]
    NotExtractable {
        key: String,
        sample: usize,
        found: String,
    },

    /// A sample is not a JSON object
    #[error("Invalid sample structure: expected object at root, found {0}")]
    InvalidStructure(String),

    /// A sample nests deeper than the configured maximum
    #[error("Maximum nesting depth exceeded: {depth} > {max}")]
    MaxDepthExceeded { depth: usize, max: usize },

    /// Sample text could not be parsed
    #[error("JSON parsing error: {0}")]
    JsonParse(String),
}

impl SchemaGenerationError {
    /// HTTP-style status hint for transports wrapping the engine
    pub fn status_code(&self) -> u16 {
        400
    }
}

impl From<serde_json::Error> for SchemaGenerationError {
    fn from(e: serde_json::Error) -> Self {
        SchemaGenerationError::JsonParse(e.to_string())
    }
}

/// Errors loading a generator configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Reading the configuration file failed
    #[error("Failed to read config '{path}': {message}")]
    Io { path: String, message: String },

    /// TOML syntax or type error
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of range
    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_code() {
        assert_eq!(SchemaGenerationError::NoSamples.status_code(), 400);
        let err = SchemaGenerationError::MissingExtractionKey {
            key: "payload.events".to_string(),
            sample: 2,
        };
        assert_eq!(err.status_code(), 400);
        assert!(err.to_string().contains("payload.events"));
    }

    #[test]
    fn test_from_serde_json() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: SchemaGenerationError = parse_err.into();
        assert!(matches!(err, SchemaGenerationError::JsonParse(_)));
    }
}
