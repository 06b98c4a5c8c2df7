//! Storage type mapping and ingestion field generation
//!
//! This module provides functionality to:
//! - Map inferred `(type, format)` pairs onto the platform's storage taxonomy
//! - Describe the static arrival-format table returned with every schema
//! - Read finalized JSON Schemas back into schema trees
//! - Flatten finalized schemas into column descriptors for ingestion specs
//!
//! # Example
//!
//! ```rust,ignore
//! use dataset_schema_core::mapping::{
//!     NamingConvention, TransformationField, generate_ingestion_fields,
//! };
//! use serde_json::json;
//!
//! let schema = json!({
//!     "type": "object",
//!     "properties": {
//!         "device": {"type": "object", "properties": {"os": {"type": "string"}}}
//!     }
//! });
//!
//! let fields = generate_ingestion_fields(
//!     &schema,
//!     &[TransformationField::new("os_upper", "$uppercase(device.os)")],
//!     &[],
//!     NamingConvention::Underscored,
//! )?;
//! assert_eq!(fields[0].name, "device_os");
//! ```

mod config;
mod error;
mod generator;
mod schema_reader;
mod table;
mod type_mapper;
mod types;

pub use config::NamingConvention;
pub use error::{MappingError, MappingResult};
pub use generator::{generate_ingestion_fields, json_path};
pub use schema_reader::parse_schema;
pub use table::{ArrivalFormat, ArrivalMapping, DataMappings};
pub use type_mapper::{map_types, storage_type};
pub use types::{DenormField, FieldDescriptor, FieldKind, TransformationField};
