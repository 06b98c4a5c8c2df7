//! Array homogeneity enforcement

use std::collections::BTreeMap;

use tracing::debug;

use crate::inference::{FieldSchema, SchemaKind, SchemaPath, same_shape};

/// Degrade arrays whose item shapes differ between samples.
///
/// Every array path carrying items (or already opaque) in more than one
/// per-sample schema is compared across those samples. On any shape mismatch
/// the path becomes an opaque array in every per-sample schema and in the
/// merged tree. Returns the degraded paths, outermost first.
pub fn validate_arrays(
    per_sample: &mut [FieldSchema],
    merged: &mut FieldSchema,
) -> Vec<SchemaPath> {
    let divergent = {
        let mut observed: BTreeMap<SchemaPath, Vec<&FieldSchema>> = BTreeMap::new();
        for schema in per_sample.iter() {
            collect_arrays(schema, SchemaPath::root(), &mut observed);
        }

        let mut divergent: Vec<SchemaPath> = Vec::new();
        for (path, arrays) in observed {
            if arrays.len() < 2 || divergent.iter().any(|outer| path.starts_with(outer)) {
                continue;
            }
            let first = arrays[0];
            if arrays[1..].iter().any(|other| !same_shape(first, other)) {
                divergent.push(path);
            }
        }
        divergent
    };

    for path in &divergent {
        debug!(path = %path.display_path(), "Degrading heterogeneous array");
        for schema in per_sample.iter_mut() {
            degrade(schema, path);
        }
        degrade(merged, path);
    }

    divergent
}

fn collect_arrays<'a>(
    node: &'a FieldSchema,
    path: SchemaPath,
    observed: &mut BTreeMap<SchemaPath, Vec<&'a FieldSchema>>,
) {
    match &node.kind {
        SchemaKind::Object { properties, .. } => {
            for (name, child) in properties {
                collect_arrays(child, path.child(name.as_str()), observed);
            }
        }
        SchemaKind::Array { items, validated } => {
            if items.is_some() || !validated {
                observed.entry(path.clone()).or_default().push(node);
            }
            if let Some(items) = items.as_deref() {
                collect_arrays(items, path.items(), observed);
            }
        }
        SchemaKind::Scalar(_) | SchemaKind::Union(_) => {}
    }
}

fn degrade(schema: &mut FieldSchema, path: &SchemaPath) {
    if let Some(node) = schema.get_mut(path) {
        if matches!(node.kind, SchemaKind::Array { .. }) {
            node.kind = FieldSchema::opaque_array().kind;
            node.format = None;
        }
    }
}
