//! Canonical storage type mapping

use crate::inference::{FieldSchema, Format, JsonType, SchemaKind};

use super::table::ArrivalFormat;

/// Storage mapping of a `(type, format)` pair. `None` for `null` nodes.
pub fn storage_type(
    json_type: JsonType,
    format: Option<Format>,
) -> Option<(ArrivalFormat, &'static str)> {
    let mapped = match (json_type, format) {
        (JsonType::String, Some(Format::DateTime)) => (ArrivalFormat::Text, "date-time"),
        (JsonType::String, Some(Format::Date)) => (ArrivalFormat::Text, "date"),
        (JsonType::String, Some(Format::Time)) => (ArrivalFormat::Text, "time"),
        (JsonType::String, Some(Format::Epoch)) => (ArrivalFormat::Text, "epoch"),
        (JsonType::String, _) => (ArrivalFormat::Text, "string"),
        (JsonType::Integer | JsonType::Number, Some(Format::Epoch)) => {
            (ArrivalFormat::Number, "epoch")
        }
        (JsonType::Integer, _) => (ArrivalFormat::Number, "integer"),
        (JsonType::Number, _) => (ArrivalFormat::Number, "number"),
        (JsonType::Boolean, _) => (ArrivalFormat::Boolean, "boolean"),
        (JsonType::Object, _) => (ArrivalFormat::Object, "object"),
        (JsonType::Array, _) => (ArrivalFormat::Array, "array"),
        (JsonType::Null, _) => return None,
    };
    Some(mapped)
}

/// Rewrite a finalized schema into storage types.
///
/// Every node below the root gets `arrival_format` and `data_type`, every
/// `format` is consumed, and the root allows additional properties.
pub fn map_types(schema: &mut FieldSchema) {
    schema.format = None;
    map_children(schema);
    schema.annotations.additional_properties = Some(true);
}

fn map_children(node: &mut FieldSchema) {
    match &mut node.kind {
        SchemaKind::Object { properties, .. } => {
            for child in properties.values_mut() {
                map_node(child);
            }
        }
        SchemaKind::Array { items, .. } => {
            if let Some(items) = items.as_deref_mut() {
                map_node(items);
            }
        }
        SchemaKind::Union(branches) => {
            for branch in branches {
                map_node(branch);
            }
        }
        SchemaKind::Scalar(_) => {}
    }
}

fn map_node(node: &mut FieldSchema) {
    if let Some((arrival, data_type)) = storage_type(node.json_type(), node.format) {
        node.annotations.arrival_format = Some(arrival);
        node.annotations.data_type = Some(data_type.to_string());
    }
    node.format = None;
    map_children(node);
}
