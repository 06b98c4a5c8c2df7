//! Configuration for schema generation

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::ConfigError;
use super::formats::Format;

/// Engine-wide configuration, immutable once built
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GeneratorConfig {
    /// Majority-repetition percentage (0 - 100) at or above which a
    /// unique-format field is recommended for rollup indexing
    pub rollup_ratio: f64,

    /// Formats whose fields are analysed for cardinality
    pub unique_formats: Vec<Format>,

    /// Maximum nesting depth for sample values
    pub max_depth: usize,

    /// Enable non-temporal format detection (uuid, email, uri, ...)
    pub detect_formats: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            rollup_ratio: 80.0,
            unique_formats: vec![Format::Uuid, Format::Email, Format::Uri],
            max_depth: 32,
            detect_formats: true,
        }
    }
}

impl GeneratorConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder for custom configuration
    pub fn builder() -> GeneratorConfigBuilder {
        GeneratorConfigBuilder::default()
    }

    /// Parse a configuration from TOML text. Missing keys take their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let mut config: GeneratorConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&text)
    }

    /// Whether a format is in the unique-format set
    pub fn is_unique_format(&self, format: Format) -> bool {
        self.unique_formats.contains(&format)
    }

    fn validate(&mut self) -> Result<(), ConfigError> {
        if !self.rollup_ratio.is_finite() {
            return Err(ConfigError::Invalid("rollupRatio must be a finite number".to_string()));
        }
        if self.max_depth == 0 {
            return Err(ConfigError::Invalid("maxDepth must be at least 1".to_string()));
        }
        self.rollup_ratio = self.rollup_ratio.clamp(0.0, 100.0);
        Ok(())
    }
}

/// Builder for GeneratorConfig
#[derive(Debug, Default)]
pub struct GeneratorConfigBuilder {
    config: GeneratorConfig,
}

impl GeneratorConfigBuilder {
    /// Set the rollup threshold percentage
    pub fn rollup_ratio(mut self, ratio: f64) -> Self {
        self.config.rollup_ratio = ratio.clamp(0.0, 100.0);
        self
    }

    /// Replace the unique-format set
    pub fn unique_formats(mut self, formats: impl IntoIterator<Item = Format>) -> Self {
        self.config.unique_formats = formats.into_iter().collect();
        self
    }

    /// Set the maximum nesting depth
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.config.max_depth = depth.max(1);
        self
    }

    /// Enable or disable non-temporal format detection
    pub fn detect_formats(mut self, detect: bool) -> Self {
        self.config.detect_formats = detect;
        self
    }

    /// Build the configuration
    pub fn build(self) -> GeneratorConfig {
        self.config
    }
}

/// Per-request sample configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleConfig {
    /// Samples are envelopes carrying an array of events
    #[serde(default)]
    pub is_batch: bool,
    /// Dot path to the event array inside each envelope
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extraction_key: Option<String>,
    /// Dataset the samples belong to
    pub dataset: String,
}

impl SampleConfig {
    /// Single-event samples for `dataset`
    pub fn new(dataset: impl Into<String>) -> Self {
        Self {
            is_batch: false,
            extraction_key: None,
            dataset: dataset.into(),
        }
    }

    /// Batch samples whose events live at `extraction_key`
    pub fn batch(dataset: impl Into<String>, extraction_key: impl Into<String>) -> Self {
        Self {
            is_batch: true,
            extraction_key: Some(extraction_key.into()),
            dataset: dataset.into(),
        }
    }
}
