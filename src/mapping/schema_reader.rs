//! Reading JSON Schema documents back into schema trees

use serde_json::{Map, Value};

use crate::inference::{FieldSchema, Format, JsonType, SchemaPath};

use super::error::{MappingError, MappingResult};
use super::table::ArrivalFormat;

/// Parse a JSON Schema document (as produced by schema generation) into a
/// [`FieldSchema`] tree.
///
/// `type` may be a string or a list of strings; a list, `anyOf` or `oneOf`
/// becomes a union. `arrival_format` and `data_type` annotations are kept,
/// unknown keywords are ignored.
pub fn parse_schema(schema: &Value) -> MappingResult<FieldSchema> {
    parse_node(schema, &SchemaPath::root())
}

fn parse_node(value: &Value, path: &SchemaPath) -> MappingResult<FieldSchema> {
    let node = value
        .as_object()
        .ok_or_else(|| MappingError::invalid(path.pointer(), "schema node must be an object"))?;

    let mut schema = match node.get("type") {
        Some(Value::String(name)) => parse_typed(node, parse_type(name, path)?, path)?,
        Some(Value::Array(names)) => {
            let branches = names
                .iter()
                .map(|name| {
                    let name = name.as_str().ok_or_else(|| {
                        MappingError::invalid(path.pointer(), "type list must contain strings")
                    })?;
                    parse_typed(node, parse_type(name, path)?, path)
                })
                .collect::<MappingResult<Vec<_>>>()?;
            FieldSchema::union(branches)
        }
        Some(_) => {
            return Err(MappingError::invalid(
                path.pointer(),
                "type must be a string or list",
            ));
        }
        None => {
            if let Some(Value::Array(branches)) = node.get("anyOf").or_else(|| node.get("oneOf")) {
                let branches = branches
                    .iter()
                    .map(|branch| parse_node(branch, path))
                    .collect::<MappingResult<Vec<_>>>()?;
                FieldSchema::union(branches)
            } else if node.contains_key("properties") {
                parse_typed(node, JsonType::Object, path)?
            } else {
                return Err(MappingError::invalid(path.pointer(), "missing type"));
            }
        }
    };

    schema.annotations.arrival_format = node
        .get("arrival_format")
        .and_then(Value::as_str)
        .and_then(|s| s.parse::<ArrivalFormat>().ok());
    schema.annotations.data_type = node
        .get("data_type")
        .and_then(Value::as_str)
        .map(String::from);
    if let Some(allowed) = node.get("additionalProperties").and_then(Value::as_bool) {
        if schema.json_type() != JsonType::Array {
            schema.annotations.additional_properties = Some(allowed);
        }
    }

    Ok(schema)
}

fn parse_type(name: &str, path: &SchemaPath) -> MappingResult<JsonType> {
    name.parse().map_err(|_| MappingError::UnsupportedType {
        path: path.pointer(),
        type_name: name.to_string(),
    })
}

fn parse_typed(
    node: &Map<String, Value>,
    json_type: JsonType,
    path: &SchemaPath,
) -> MappingResult<FieldSchema> {
    let format = node
        .get("format")
        .and_then(Value::as_str)
        .and_then(|f| f.parse::<Format>().ok());

    let schema = match json_type {
        JsonType::Object => {
            let mut object = FieldSchema::object();
            let required: Vec<&str> = node
                .get("required")
                .and_then(Value::as_array)
                .map(|names| names.iter().filter_map(Value::as_str).collect())
                .unwrap_or_default();

            if let Some(properties) = node.get("properties") {
                let properties = properties.as_object().ok_or_else(|| {
                    MappingError::invalid(path.pointer(), "properties must be an object")
                })?;
                for (name, child) in properties {
                    let child = parse_node(child, &path.child(name.as_str()))?;
                    object.insert_property(name.clone(), child, required.contains(&name.as_str()));
                }
            }
            object
        }
        JsonType::Array => match node.get("items") {
            Some(items) => FieldSchema::array(Some(parse_node(items, &path.items())?)),
            None if node.get("additionalProperties") == Some(&Value::Bool(false)) => {
                FieldSchema::opaque_array()
            }
            None => FieldSchema::array(None),
        },
        scalar => FieldSchema::scalar(scalar).with_format(format),
    };

    Ok(schema)
}
