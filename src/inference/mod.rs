//! Schema inference for dataset samples
//!
//! This module turns raw event samples into structural schema trees,
//! detecting types and formats, and deep-merges the per-sample trees into a
//! single candidate schema.
//!
//! ## Features
//!
//! - **Type inference** - Detect JSON types (string, number, integer, boolean, array, object, null)
//! - **Temporal detection** - Recognize epoch values and ~90 date/time layouts
//! - **Format detection** - Recognize uuid, email, uri, ipv4, ipv6 and credit card strings
//! - **Batch extraction** - Pull event arrays out of envelope payloads
//! - **Schema merging** - Deep-union per-sample schemas into one candidate tree
//!
//! ## Example
//!
//! ```rust,ignore
//! use dataset_schema_core::inference::{SchemaInferrer, merge_schemas};
//! use serde_json::json;
//!
//! let inferrer = SchemaInferrer::new();
//! let schemas = inferrer.infer_samples(&[json!({"a": 1}), json!({"a": 2, "b": "x"})])?;
//! let merged = merge_schemas(&schemas);
//! ```

mod config;
mod error;
mod formats;
mod inferrer;
mod merge;
mod types;

pub use config::{GeneratorConfig, GeneratorConfigBuilder, SampleConfig};
pub use error::{ConfigError, InferenceResult, SchemaGenerationError};
pub use formats::{
    EPOCH_LOWER_BOUND, Format, detect_format, is_epoch_millis, is_epoch_number, is_epoch_string,
    looks_temporal, temporal_pattern_count,
};
pub use inferrer::{SchemaInferrer, extract_batch, prepare_samples};
pub use merge::{MAX_UNION_BRANCHES, merge_element, merge_into, merge_schemas, same_shape};
pub use types::{Annotations, FieldSchema, JsonType, PathSegment, SchemaKind, SchemaPath};
