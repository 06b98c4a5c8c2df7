//! Ingestion field generation
//!
//! Re-flattens a finalized schema, plus a dataset's transformation and
//! denormalization fields, into the column descriptors consumed by ingestion
//! spec builders.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::debug;

use crate::inference::{FieldSchema, SchemaKind};

use super::config::NamingConvention;
use super::error::MappingResult;
use super::schema_reader::parse_schema;
use super::type_mapper::storage_type;
use super::types::{DenormField, FieldDescriptor, FieldKind, TransformationField};

static IDENTIFIER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());

/// Build the ingestion field list for a dataset.
///
/// Objects are descended; every other node becomes a `path` descriptor.
/// Denorm schemas are flattened under their alias. Transformation fields
/// replace schema fields of the same name, where a dotted `field_key` is
/// named with the same convention as the schema. Deleted entries are skipped
/// and the result is sorted by name.
pub fn generate_ingestion_fields(
    schema: &Value,
    transformations: &[TransformationField],
    denorms: &[DenormField],
    naming: NamingConvention,
) -> MappingResult<Vec<FieldDescriptor>> {
    let mut fields: BTreeMap<String, FieldDescriptor> = BTreeMap::new();

    let tree = parse_schema(schema)?;
    collect_fields(&tree, &mut Vec::new(), naming, &mut fields);

    for denorm in denorms.iter().filter(|d| !d.is_deleted) {
        let master = parse_schema(&denorm.schema)?;
        let mut prefix = vec![denorm.denorm_out_field.clone()];
        collect_fields(&master, &mut prefix, naming, &mut fields);
    }

    for transformation in transformations.iter().filter(|t| !t.is_deleted) {
        let name = naming.join(&field_segments(&transformation.field_key));
        let descriptor = transformation_descriptor(transformation, naming, fields.get(&name));
        fields.insert(name, descriptor);
    }

    debug!(
        fields = fields.len(),
        naming = %naming,
        "Generated ingestion fields"
    );

    Ok(fields.into_values().collect())
}

fn collect_fields(
    node: &FieldSchema,
    segments: &mut Vec<String>,
    naming: NamingConvention,
    fields: &mut BTreeMap<String, FieldDescriptor>,
) {
    let SchemaKind::Object { properties, .. } = &node.kind else {
        return;
    };

    for (name, child) in properties {
        segments.push(name.clone());
        if matches!(child.kind, SchemaKind::Object { .. }) {
            collect_fields(child, segments, naming, fields);
        } else {
            let descriptor = path_descriptor(child, segments, naming);
            fields.insert(descriptor.name.clone(), descriptor);
        }
        segments.pop();
    }
}

fn field_segments(field_key: &str) -> Vec<&str> {
    field_key.split('.').filter(|s| !s.is_empty()).collect()
}

/// Descriptor for a transformation output column. Types the transformation
/// leaves unset are taken from the schema field it replaces.
fn transformation_descriptor(
    transformation: &TransformationField,
    naming: NamingConvention,
    replaced: Option<&FieldDescriptor>,
) -> FieldDescriptor {
    let segments = field_segments(&transformation.field_key);
    FieldDescriptor {
        expr: json_path(&segments),
        name: naming.join(&segments),
        data_type: transformation
            .data_type
            .clone()
            .or_else(|| replaced.and_then(|f| f.data_type.clone())),
        arrival_format: transformation
            .arrival_format
            .clone()
            .or_else(|| replaced.and_then(|f| f.arrival_format.clone())),
        kind: FieldKind::Expr,
    }
}

fn path_descriptor(
    node: &FieldSchema,
    segments: &[String],
    naming: NamingConvention,
) -> FieldDescriptor {
    let fallback = storage_type(node.json_type(), node.format);
    let data_type = node
        .annotations
        .data_type
        .clone()
        .or_else(|| fallback.map(|(_, data_type)| data_type.to_string()));
    let arrival_format = node
        .annotations
        .arrival_format
        .or_else(|| fallback.map(|(arrival, _)| arrival))
        .map(|a| a.as_str().to_string());

    FieldDescriptor {
        expr: json_path(segments),
        name: naming.join(segments),
        data_type,
        arrival_format,
        kind: FieldKind::Path,
    }
}

/// JSONPath for a list of property names: `$.a.b`, with `['..']` for names
/// that are not plain identifiers
pub fn json_path<S: AsRef<str>>(segments: &[S]) -> String {
    let mut expr = String::from("$");
    for segment in segments {
        let segment = segment.as_ref();
        if IDENTIFIER_REGEX.is_match(segment) {
            expr.push('.');
            expr.push_str(segment);
        } else {
            expr.push_str("['");
            expr.push_str(&segment.replace('\\', "\\\\").replace('\'', "\\'"));
            expr.push_str("']");
        }
    }
    expr
}
