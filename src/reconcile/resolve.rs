//! Resolution applier

use tracing::{debug, warn};

use crate::inference::{FieldSchema, Format, JsonType, SchemaKind};
use crate::mapping::DataMappings;

use super::conflict::{Conflict, Resolution};

/// Write each conflict's resolution onto the merged schema.
///
/// `per_sample` supplies the structure for nodes retyped to an object or
/// array. Conflicts whose path is missing from `merged` are skipped with a
/// warning.
pub fn apply_resolutions(
    merged: &mut FieldSchema,
    conflicts: &[Conflict],
    per_sample: &[FieldSchema],
    mappings: &DataMappings,
) {
    for conflict in conflicts {
        match &conflict.resolution {
            Resolution::DataType(target) => {
                let template = per_sample
                    .iter()
                    .filter_map(|s| s.get(&conflict.path))
                    .find(|node| node.json_type() == *target);

                let Some(node) = merged.get_mut(&conflict.path) else {
                    warn!(
                        path = %conflict.display_path(),
                        "Cannot apply data type resolution: path not in schema"
                    );
                    continue;
                };
                node.retype(*target, template);
                if !format_fits(*target, node.format) {
                    node.format = None;
                }

                let mut families: Vec<JsonType> = conflict
                    .candidate_types()
                    .iter()
                    .map(JsonType::family)
                    .collect();
                families.sort_by_key(|t| t.as_str());
                families.dedup();
                node.annotations.one_of = families;
            }
            Resolution::NullField => {
                let Some(node) = merged.get_mut(&conflict.path) else {
                    warn!(
                        path = %conflict.display_path(),
                        "Cannot apply null resolution: path not in schema"
                    );
                    continue;
                };
                node.retype(JsonType::Null, None);
                node.format = None;
                node.annotations.one_of = mappings.json_families();
                node.annotations.arrival_one_of = mappings.arrival_formats();
            }
            Resolution::Optional(required) => {
                let parent = match conflict.path.parent() {
                    Some(parent_path) => merged.get_mut(&parent_path),
                    None => None,
                };
                let (Some(parent), Some(name)) = (parent, conflict.path.property_name()) else {
                    warn!(
                        path = %conflict.display_path(),
                        "Cannot apply optional resolution: no enclosing object"
                    );
                    continue;
                };
                match &mut parent.kind {
                    SchemaKind::Object { required: set, .. } => {
                        if *required {
                            set.insert(name.to_string());
                        } else {
                            set.remove(name);
                        }
                    }
                    _ => {
                        warn!(
                            path = %conflict.display_path(),
                            "Cannot apply optional resolution: parent is not an object"
                        );
                    }
                }
            }
            Resolution::Format { format, action } => {
                debug!(
                    path = %conflict.display_path(),
                    format = %format,
                    action = ?action,
                    "Format resolution is advisory"
                );
            }
        }
    }
}

fn format_fits(json_type: JsonType, format: Option<Format>) -> bool {
    match (json_type, format) {
        (_, None) => true,
        (JsonType::String, Some(_)) => true,
        (JsonType::Integer | JsonType::Number, Some(Format::Epoch)) => true,
        _ => false,
    }
}
