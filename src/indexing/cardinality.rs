//! Cardinality analysis for rollup and index recommendations

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::inference::{FieldSchema, Format, GeneratorConfig, SchemaKind, SchemaPath};

/// Rollup recommendation for one field
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RollupEntry {
    /// Display path
    pub path: String,
    /// Schema path the entry was measured at
    #[serde(skip)]
    pub absolute_path: SchemaPath,
    /// 100 minus the share (in percent) of the most repeated value
    pub cardinality: f64,
    /// Majority share reached the rollup threshold
    pub index: bool,
}

/// Walks raw rows against a schema and measures how repetitive the values of
/// unique-format fields are
#[derive(Debug, Clone)]
pub struct CardinalityAnalyser {
    rollup_ratio: f64,
    unique_formats: Vec<Format>,
}

impl CardinalityAnalyser {
    pub fn new(rollup_ratio: f64, unique_formats: Vec<Format>) -> Self {
        Self {
            rollup_ratio: rollup_ratio.clamp(0.0, 100.0),
            unique_formats,
        }
    }

    pub fn from_config(config: &GeneratorConfig) -> Self {
        Self::new(config.rollup_ratio, config.unique_formats.clone())
    }

    /// One entry per analysed field, in schema path order
    pub fn analyse(&self, rows: &[Value], schema: &FieldSchema) -> Vec<RollupEntry> {
        let mut observed: BTreeMap<SchemaPath, Vec<String>> = BTreeMap::new();
        for row in rows {
            self.walk(row, schema, &SchemaPath::root(), &mut observed);
        }

        let entries: Vec<RollupEntry> = observed
            .into_iter()
            .filter(|(_, values)| !values.is_empty())
            .map(|(path, values)| self.summarise(path, &values))
            .collect();

        debug!(
            rows = rows.len(),
            fields = entries.len(),
            "Computed field cardinality"
        );

        entries
    }

    fn walk(
        &self,
        value: &Value,
        schema: &FieldSchema,
        path: &SchemaPath,
        observed: &mut BTreeMap<SchemaPath, Vec<String>>,
    ) {
        match (&schema.kind, value) {
            (SchemaKind::Object { properties, .. }, Value::Object(map)) => {
                for (name, child) in properties {
                    if let Some(child_value) = map.get(name) {
                        self.walk(child_value, child, &path.child(name.as_str()), observed);
                    }
                }
            }
            (SchemaKind::Array { items: Some(items), .. }, Value::Array(elements)) => {
                let item_path = path.items();
                for element in elements {
                    self.walk(element, items, &item_path, observed);
                }
            }
            (SchemaKind::Scalar(_), value) if !value.is_null() => {
                let unique = schema
                    .format
                    .is_some_and(|format| self.unique_formats.contains(&format));
                if unique {
                    let realized = match value {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    observed.entry(path.clone()).or_default().push(realized);
                }
            }
            _ => {}
        }
    }

    fn summarise(&self, path: SchemaPath, values: &[String]) -> RollupEntry {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for value in values {
            *counts.entry(value.as_str()).or_insert(0) += 1;
        }
        let most_frequent = counts.values().copied().max().unwrap_or(0);
        let ratio = most_frequent as f64 / values.len() as f64 * 100.0;

        RollupEntry {
            path: path.display_path(),
            absolute_path: path,
            cardinality: round2(100.0 - ratio),
            index: ratio >= self.rollup_ratio,
        }
    }
}

fn round2(value: f64) -> f64 {
    ((value * 100.0).round() / 100.0).clamp(0.0, 100.0)
}
