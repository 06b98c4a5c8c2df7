//! Dataset Schema Core - schema inference and reconciliation for event datasets
//!
//! Provides:
//! - Per-sample structural type inference with temporal/format detection
//! - Multi-sample merge, array homogeneity enforcement and conflict classification
//! - Cardinality analysis for rollup/index and dedup recommendations
//! - Canonical storage type mapping of the finalized schema
//! - Flattened field descriptors for column-store and lakehouse ingestion specs
//!
//! The engine is a pure function of `(samples, config)`: it performs no I/O and
//! keeps no state between calls.
//!
//! ```rust,ignore
//! use dataset_schema_core::{GeneratorConfig, SampleConfig, SchemaGenerator};
//! use serde_json::json;
//!
//! let generator = SchemaGenerator::new(GeneratorConfig::default());
//! let samples = vec![json!({"id": 1, "ts": "2023-07-03 00:00:00"})];
//! let generated = generator.generate(&samples, &SampleConfig::new("telemetry"))?;
//! println!("{}", serde_json::to_string_pretty(&generated)?);
//! ```

pub mod indexing;
pub mod inference;
pub mod mapping;
pub mod pipeline;
pub mod reconcile;

pub use indexing::{
    CardinalityAnalyser, Configurations, DedupKey, IndexConfiguration, IndexDefaults, Processing,
    RollupEntry, suggest_config,
};
pub use inference::{
    ConfigError, FieldSchema, Format, GeneratorConfig, JsonType, SampleConfig,
    SchemaGenerationError, SchemaInferrer, SchemaKind, SchemaPath,
};
pub use mapping::{
    ArrivalFormat, DataMappings, DenormField, FieldDescriptor, MappingError, NamingConvention,
    TransformationField, generate_ingestion_fields, map_types,
};
pub use pipeline::{GeneratedSchema, PipelineContext, SchemaGenerator, generate_schema};
pub use reconcile::{Conflict, ConflictKind, Resolution, Severity, Suggestion};
