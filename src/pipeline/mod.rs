//! Schema generation pipeline
//!
//! Runs the stages in a fixed order against a fresh [`PipelineContext`]:
//!
//! 1. **Infer** - one schema per sample
//! 2. **Merge** - deep union of the per-sample schemas
//! 3. **Validate arrays** - degrade arrays whose items disagree across samples
//! 4. **Tabulate** - flatten and group by path
//! 5. **Classify** - conflicts from the occurrence histograms
//! 6. **Cardinality** - rollup entries for unique-format fields
//! 7. **Apply resolutions** / **compose suggestions** / **map types**
//! 8. **Suggest config** - index and dedup configuration
//!
//! # Example
//!
//! ```rust,ignore
//! use dataset_schema_core::pipeline::generate_schema;
//! use dataset_schema_core::SampleConfig;
//!
//! let generated = generate_schema(&samples, &SampleConfig::new("orders"))?;
//! ```

mod context;
mod executor;

pub use context::{PipelineContext, PipelineStage};
pub use executor::{GeneratedSchema, SchemaGenerator};

use serde_json::Value;

use crate::inference::{InferenceResult, SampleConfig};

/// Generate a schema with the default configuration
pub fn generate_schema(
    samples: &[Value],
    sample_config: &SampleConfig,
) -> InferenceResult<GeneratedSchema> {
    SchemaGenerator::default().generate(samples, sample_config)
}
