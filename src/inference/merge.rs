//! Schema merging utilities
//!
//! Deep-unions per-sample schemas into one candidate tree. Merging never
//! reports conflicts; disagreements between samples are classified later from
//! the per-sample trees.

use tracing::debug;

use super::types::{FieldSchema, JsonType, SchemaKind};

/// Widest union kept for the elements of one array
pub const MAX_UNION_BRANCHES: usize = 2;

/// Left-fold a list of schemas into one. Returns `None` for an empty list.
pub fn merge_schemas(schemas: &[FieldSchema]) -> Option<FieldSchema> {
    let (first, rest) = schemas.split_first()?;
    let mut merged = first.clone();
    for schema in rest {
        merge_into(&mut merged, schema);
    }
    Some(merged)
}

/// Merge `other` into `target`
///
/// - objects union their properties (recursively) and `required` sets
/// - arrays merge their item schemas; an opaque side makes the result opaque
/// - `integer` and `number` widen to `number`
/// - any other kind mismatch takes the kind of `other`
/// - the format of `other` wins unless it has none
pub fn merge_into(target: &mut FieldSchema, other: &FieldSchema) {
    match (&mut target.kind, &other.kind) {
        (
            SchemaKind::Object {
                properties,
                required,
            },
            SchemaKind::Object {
                properties: other_properties,
                required: other_required,
            },
        ) => {
            for (name, other_child) in other_properties {
                match properties.get_mut(name) {
                    Some(child) => merge_into(child, other_child),
                    None => {
                        properties.insert(name.clone(), other_child.clone());
                    }
                }
            }
            required.extend(other_required.iter().cloned());
        }
        (
            SchemaKind::Array { items, validated },
            SchemaKind::Array {
                items: other_items,
                validated: other_validated,
            },
        ) => {
            if !*validated || !*other_validated {
                *items = None;
                *validated = false;
            } else {
                match (items.as_deref_mut(), other_items.as_deref()) {
                    (Some(mine), Some(theirs)) => merge_into(mine, theirs),
                    (None, Some(theirs)) => *items = Some(Box::new(theirs.clone())),
                    _ => {}
                }
            }
        }
        (SchemaKind::Scalar(mine), SchemaKind::Scalar(theirs)) => {
            *mine = match (*mine, *theirs) {
                (JsonType::Integer, JsonType::Number) | (JsonType::Number, JsonType::Integer) => {
                    JsonType::Number
                }
                (_, theirs) => theirs,
            };
        }
        (SchemaKind::Union(branches), SchemaKind::Union(other_branches)) => {
            for branch in other_branches {
                absorb_branch(branches, branch, merge_into);
            }
        }
        (_, other_kind) => {
            target.kind = other_kind.clone();
        }
    }

    target.format = other.format.or(target.format);
    if target.json_type().is_structural() {
        target.format = None;
    }
}

/// Merge the schema of one array element into the items schema built from
/// the earlier elements of the same array.
///
/// Unlike [`merge_into`], a property stays required only when every element
/// carries it, and kinds from different families become a union (at most
/// [`MAX_UNION_BRANCHES`] branches) instead of replacing each other.
pub fn merge_element(target: &mut FieldSchema, element: &FieldSchema) {
    if let SchemaKind::Union(branches) = &mut target.kind {
        absorb_branch(branches, element, merge_element);
        return;
    }

    if target.json_type().family() != element.json_type().family() {
        let first = std::mem::replace(target, FieldSchema::union(Vec::new()));
        let mut branches = vec![first];
        absorb_branch(&mut branches, element, merge_element);
        *target = FieldSchema::union(branches);
        return;
    }

    match (&mut target.kind, &element.kind) {
        (
            SchemaKind::Object {
                properties,
                required,
            },
            SchemaKind::Object {
                properties: element_properties,
                required: element_required,
            },
        ) => {
            for (name, child) in element_properties {
                match properties.get_mut(name) {
                    Some(existing) => merge_element(existing, child),
                    None => {
                        properties.insert(name.clone(), child.clone());
                    }
                }
            }
            required.retain(|name| element_required.contains(name));
        }
        (
            SchemaKind::Array { items, validated },
            SchemaKind::Array {
                items: element_items,
                validated: element_validated,
            },
        ) => {
            if !*validated || !*element_validated {
                *items = None;
                *validated = false;
            } else {
                match (items.as_deref_mut(), element_items.as_deref()) {
                    (Some(mine), Some(theirs)) => merge_element(mine, theirs),
                    (None, Some(theirs)) => *items = Some(Box::new(theirs.clone())),
                    _ => {}
                }
            }
        }
        (SchemaKind::Scalar(mine), SchemaKind::Scalar(theirs)) => {
            if *mine != *theirs {
                *mine = JsonType::Number;
            }
        }
        _ => {}
    }

    target.format = element.format.or(target.format);
    if target.json_type().is_structural() {
        target.format = None;
    }
}

/// Fold `schema` into the union branch of the same family, or add it as a new
/// branch while there is room. Branches stay in [`JsonType`] order.
fn absorb_branch(
    branches: &mut Vec<FieldSchema>,
    schema: &FieldSchema,
    merge: fn(&mut FieldSchema, &FieldSchema),
) {
    let family = schema.json_type().family();
    if let Some(branch) = branches
        .iter_mut()
        .find(|branch| branch.json_type().family() == family)
    {
        merge(branch, schema);
    } else if branches.len() < MAX_UNION_BRANCHES {
        branches.push(schema.clone());
        branches.sort_by_key(FieldSchema::json_type);
    } else {
        debug!(
            dropped = %schema.json_type(),
            "Union already holds the maximum number of branches"
        );
    }
}

/// Structural equality ignoring formats, annotations and `required` sets.
///
/// `integer` and `number` count as the same shape.
pub fn same_shape(a: &FieldSchema, b: &FieldSchema) -> bool {
    match (&a.kind, &b.kind) {
        (SchemaKind::Scalar(x), SchemaKind::Scalar(y)) => x.family() == y.family(),
        (
            SchemaKind::Object { properties: pa, .. },
            SchemaKind::Object { properties: pb, .. },
        ) => {
            pa.len() == pb.len()
                && pa
                    .iter()
                    .zip(pb.iter())
                    .all(|((ka, va), (kb, vb))| ka == kb && same_shape(va, vb))
        }
        (
            SchemaKind::Array {
                items: ia,
                validated: va,
            },
            SchemaKind::Array {
                items: ib,
                validated: vb,
            },
        ) => {
            va == vb
                && match (ia.as_deref(), ib.as_deref()) {
                    (Some(x), Some(y)) => same_shape(x, y),
                    (None, None) => true,
                    _ => false,
                }
        }
        (SchemaKind::Union(xa), SchemaKind::Union(xb)) => {
            xa.len() == xb.len() && xa.iter().zip(xb.iter()).all(|(x, y)| same_shape(x, y))
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::formats::Format;
    use crate::inference::types::SchemaPath;

    fn obj(fields: &[(&str, FieldSchema)]) -> FieldSchema {
        fields.iter().fold(FieldSchema::object(), |acc, (name, schema)| {
            acc.with_property(*name, schema.clone(), true)
        })
    }

    #[test]
    fn test_merge_empty() {
        assert!(merge_schemas(&[]).is_none());
    }

    #[test]
    fn test_merge_unions_properties() {
        let a = obj(&[("id", FieldSchema::scalar(JsonType::Integer))]);
        let b = obj(&[("name", FieldSchema::scalar(JsonType::String))]);
        let merged = merge_schemas(&[a, b]).unwrap();

        let props = merged.properties().unwrap();
        assert!(props.contains_key("id"));
        assert!(props.contains_key("name"));
        assert_eq!(merged.required().unwrap().len(), 2);
    }

    #[test]
    fn test_merge_widens_integer() {
        let a = obj(&[("v", FieldSchema::scalar(JsonType::Integer))]);
        let b = obj(&[("v", FieldSchema::scalar(JsonType::Number))]);
        let merged = merge_schemas(&[a, b]).unwrap();
        let v = merged.get(&SchemaPath::root().child("v")).unwrap();
        assert_eq!(v.json_type(), JsonType::Number);
    }

    #[test]
    fn test_merge_later_kind_wins() {
        let a = obj(&[("v", FieldSchema::scalar(JsonType::Integer))]);
        let b = obj(&[("v", FieldSchema::scalar(JsonType::String))]);
        let merged = merge_schemas(&[a.clone(), b.clone()]).unwrap();
        let path = SchemaPath::root().child("v");
        assert_eq!(merged.get(&path).unwrap().json_type(), JsonType::String);

        let reversed = merge_schemas(&[b, a]).unwrap();
        assert_eq!(reversed.get(&path).unwrap().json_type(), JsonType::Integer);
    }

    #[test]
    fn test_merge_nested_objects() {
        let a = obj(&[("a", obj(&[("b", FieldSchema::scalar(JsonType::Integer))]))]);
        let b = obj(&[("a", obj(&[("c", FieldSchema::scalar(JsonType::Boolean))]))]);
        let merged = merge_schemas(&[a, b]).unwrap();
        let inner = merged.get(&SchemaPath::root().child("a")).unwrap();
        assert_eq!(inner.properties().unwrap().len(), 2);
    }

    #[test]
    fn test_merge_format_keeps_last_present() {
        let ts = FieldSchema::scalar(JsonType::String).with_format(Some(Format::DateTime));
        let a = obj(&[("ts", ts)]);
        let b = obj(&[("ts", FieldSchema::scalar(JsonType::String))]);
        let merged = merge_schemas(&[a, b]).unwrap();
        let ts = merged.get(&SchemaPath::root().child("ts")).unwrap();
        assert_eq!(ts.format, Some(Format::DateTime));
    }

    #[test]
    fn test_merge_array_items() {
        let empty = obj(&[("tags", FieldSchema::array(None))]);
        let filled = obj(&[(
            "tags",
            FieldSchema::array(Some(FieldSchema::scalar(JsonType::String))),
        )]);
        let merged = merge_schemas(&[empty, filled]).unwrap();
        let items = merged.get(&SchemaPath::root().child("tags").items()).unwrap();
        assert_eq!(items.json_type(), JsonType::String);
    }

    #[test]
    fn test_merge_opaque_array_stays_opaque() {
        let opaque = obj(&[("xs", FieldSchema::opaque_array())]);
        let filled = obj(&[(
            "xs",
            FieldSchema::array(Some(FieldSchema::scalar(JsonType::String))),
        )]);
        let merged = merge_schemas(&[filled, opaque]).unwrap();
        assert!(merged.get(&SchemaPath::root().child("xs")).unwrap().is_opaque_array());
    }

    #[test]
    fn test_same_shape() {
        let a = obj(&[("x", FieldSchema::scalar(JsonType::Integer))]);
        let epoch = FieldSchema::scalar(JsonType::Number).with_format(Some(Format::Epoch));
        let b = obj(&[("x", epoch)]);
        let c = obj(&[("y", FieldSchema::scalar(JsonType::Integer))]);
        assert!(same_shape(&a, &b));
        assert!(!same_shape(&a, &c));
        assert!(!same_shape(&a, &FieldSchema::scalar(JsonType::String)));
    }

    #[test]
    fn test_merge_element_requires_common_keys() {
        let mut items = obj(&[("a", FieldSchema::scalar(JsonType::Integer))]);
        merge_element(&mut items, &obj(&[("b", FieldSchema::scalar(JsonType::Integer))]));

        assert_eq!(items.properties().unwrap().len(), 2);
        assert!(items.required().unwrap().is_empty());
    }

    #[test]
    fn test_merge_element_builds_union() {
        let mut items = obj(&[("a", FieldSchema::scalar(JsonType::Integer))]);
        merge_element(&mut items, &obj(&[("a", FieldSchema::scalar(JsonType::String))]));
        merge_element(&mut items, &obj(&[("a", FieldSchema::scalar(JsonType::Number))]));

        let a = items.get(&SchemaPath::root().child("a")).unwrap();
        let SchemaKind::Union(branches) = &a.kind else {
            panic!("expected a union, got {:?}", a.kind);
        };
        let types: Vec<JsonType> = branches.iter().map(FieldSchema::json_type).collect();
        assert_eq!(types, vec![JsonType::String, JsonType::Number]);
        assert_eq!(items.required().unwrap().len(), 1);
    }

    #[test]
    fn test_merge_element_caps_union() {
        let mut items = FieldSchema::scalar(JsonType::Integer);
        merge_element(&mut items, &FieldSchema::scalar(JsonType::String));
        merge_element(&mut items, &FieldSchema::scalar(JsonType::Boolean));

        let SchemaKind::Union(branches) = &items.kind else {
            panic!("expected a union, got {:?}", items.kind);
        };
        assert_eq!(branches.len(), MAX_UNION_BRANCHES);
        assert!(branches.iter().all(|b| b.json_type() != JsonType::Boolean));
    }
}
