//! Schema inference engine

use serde_json::Value;
use tracing::debug;

use super::config::{GeneratorConfig, SampleConfig};
use super::error::{InferenceResult, SchemaGenerationError};
use super::formats::{Format, detect_format, is_epoch_number, is_epoch_string, looks_temporal};
use super::merge::merge_element;
use super::types::{FieldSchema, JsonType};

/// Schema inference engine
///
/// Converts one sample object into a structural schema tree. Every property
/// present in a sample is required in that sample's tree; optionality only
/// emerges when samples are compared.
#[derive(Debug, Clone, Default)]
pub struct SchemaInferrer {
    config: GeneratorConfig,
}

impl SchemaInferrer {
    /// Create a new schema inferrer with default configuration
    pub fn new() -> Self {
        Self::with_config(GeneratorConfig::default())
    }

    /// Create a new schema inferrer with custom configuration
    pub fn with_config(config: GeneratorConfig) -> Self {
        Self { config }
    }

    /// Infer the schema of one sample. The root must be an object.
    pub fn infer_sample(&self, sample: &Value) -> InferenceResult<FieldSchema> {
        if !sample.is_object() {
            return Err(SchemaGenerationError::InvalidStructure(
                JsonType::of(sample).to_string(),
            ));
        }
        self.infer_value(sample, 0)
    }

    /// Infer one schema per sample, in order
    pub fn infer_samples(&self, samples: &[Value]) -> InferenceResult<Vec<FieldSchema>> {
        samples.iter().map(|s| self.infer_sample(s)).collect()
    }

    fn infer_value(&self, value: &Value, depth: usize) -> InferenceResult<FieldSchema> {
        if depth > self.config.max_depth {
            return Err(SchemaGenerationError::MaxDepthExceeded {
                depth,
                max: self.config.max_depth,
            });
        }

        let schema = match value {
            Value::Null => FieldSchema::scalar(JsonType::Null),
            Value::Bool(_) => FieldSchema::scalar(JsonType::Boolean),
            Value::Number(n) => {
                let format = is_epoch_number(n).then_some(Format::Epoch);
                FieldSchema::scalar(JsonType::of(value)).with_format(format)
            }
            Value::String(s) => {
                FieldSchema::scalar(JsonType::String).with_format(self.string_format(s))
            }
            Value::Array(elements) => {
                let mut items: Option<FieldSchema> = None;
                for element in elements {
                    let element_schema = self.infer_value(element, depth + 1)?;
                    match items.as_mut() {
                        Some(merged) => merge_element(merged, &element_schema),
                        None => items = Some(element_schema),
                    }
                }
                FieldSchema::array(items)
            }
            Value::Object(map) => {
                let mut schema = FieldSchema::object();
                for (key, child) in map {
                    schema.insert_property(key.clone(), self.infer_value(child, depth + 1)?, true);
                }
                schema
            }
        };

        Ok(schema)
    }

    /// Format of a string leaf in this sample.
    ///
    /// Digit strings are tested as epochs first. Temporal formats only stand
    /// when the value itself parses as a date or time.
    fn string_format(&self, value: &str) -> Option<Format> {
        if is_epoch_string(value) {
            return Some(Format::Epoch);
        }

        let detected = detect_format(value);
        if looks_temporal(value) {
            return Some(match detected {
                Some(format) if format.is_temporal() => format,
                _ => Format::DateTime,
            });
        }

        match detected {
            Some(format) if format.is_temporal() => None,
            Some(format) if self.config.detect_formats => Some(format),
            _ => None,
        }
    }
}

/// Pull the events out of batch envelopes.
///
/// The value at the dot path `extraction_key` must be an array of objects in
/// every sample; each element becomes one sample.
pub fn extract_batch(samples: &[Value], extraction_key: &str) -> InferenceResult<Vec<Value>> {
    let mut events = Vec::new();

    for (index, sample) in samples.iter().enumerate() {
        let found = extraction_key
            .split('.')
            .try_fold(sample, |current, segment| current.get(segment))
            .ok_or_else(|| SchemaGenerationError::MissingExtractionKey {
                key: extraction_key.to_string(),
                sample: index,
            })?;

        let not_extractable = |found: &Value| SchemaGenerationError::NotExtractable {
            key: extraction_key.to_string(),
            sample: index,
            found: JsonType::of(found).to_string(),
        };

        let elements = found.as_array().ok_or_else(|| not_extractable(found))?;
        for element in elements {
            if !element.is_object() {
                return Err(not_extractable(element));
            }
            events.push(element.clone());
        }
    }

    debug!(
        envelopes = samples.len(),
        events = events.len(),
        key = extraction_key,
        "Extracted batch events"
    );

    Ok(events)
}

/// Validate the request and produce the list of samples to analyse
pub fn prepare_samples(samples: &[Value], config: &SampleConfig) -> InferenceResult<Vec<Value>> {
    if samples.is_empty() {
        return Err(SchemaGenerationError::NoSamples);
    }

    let prepared = if config.is_batch {
        let key = config
            .extraction_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| SchemaGenerationError::MissingExtractionConfig {
                dataset: config.dataset.clone(),
            })?;
        extract_batch(samples, key)?
    } else {
        samples.to_vec()
    };

    if prepared.is_empty() {
        return Err(SchemaGenerationError::NoSamples);
    }
    if let Some(bad) = prepared.iter().find(|s| !s.is_object()) {
        return Err(SchemaGenerationError::InvalidStructure(
            JsonType::of(bad).to_string(),
        ));
    }

    Ok(prepared)
}
