//! Schema flattening

use serde::Serialize;
use tracing::debug;

use crate::inference::{FieldSchema, Format, JsonType, SchemaKind, SchemaPath};

/// One node of a schema tree addressed by its path
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlattenedField {
    /// Property name of the node
    pub property: String,
    pub data_type: JsonType,
    /// Listed in the parent object's `required` set
    pub is_required: bool,
    /// Display path (`a[*].b`)
    pub path: String,
    /// Schema pointer (`$.properties.a.items.properties.b`)
    pub absolute_path: SchemaPath,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<Format>,
}

/// Flatten a schema tree, starting from the root's properties.
///
/// Objects emit themselves and then their children. Arrays emit themselves
/// and descend into object items. A union with exactly two branches emits one
/// record per branch at the same path; wider unions are skipped.
pub fn flatten_schema(schema: &FieldSchema) -> Vec<FlattenedField> {
    let mut fields = Vec::new();
    flatten_children(schema, &SchemaPath::root(), &mut fields);
    fields
}

fn flatten_children(node: &FieldSchema, path: &SchemaPath, fields: &mut Vec<FlattenedField>) {
    let SchemaKind::Object {
        properties,
        required,
    } = &node.kind
    else {
        return;
    };

    for (name, child) in properties {
        let child_path = path.child(name.as_str());
        flatten_node(name, child, required.contains(name), &child_path, fields);
    }
}

fn flatten_node(
    name: &str,
    node: &FieldSchema,
    is_required: bool,
    path: &SchemaPath,
    fields: &mut Vec<FlattenedField>,
) {
    let record = |data_type: JsonType, format: Option<Format>| FlattenedField {
        property: name.to_string(),
        data_type,
        is_required,
        path: path.display_path(),
        absolute_path: path.clone(),
        format,
    };

    match &node.kind {
        SchemaKind::Scalar(t) => fields.push(record(*t, node.format)),
        SchemaKind::Object { .. } => {
            fields.push(record(JsonType::Object, None));
            flatten_children(node, path, fields);
        }
        SchemaKind::Array { items, .. } => {
            fields.push(record(JsonType::Array, None));
            if let Some(items) = items.as_deref() {
                flatten_children(items, &path.items(), fields);
            }
        }
        SchemaKind::Union(branches) if branches.len() == 2 => {
            for branch in branches {
                fields.push(record(branch.json_type(), branch.format));
            }
        }
        SchemaKind::Union(branches) => {
            debug!(
                path = %path.display_path(),
                branches = branches.len(),
                "Skipping non-binary union while flattening"
            );
        }
    }
}
