//! Indexing and processing configuration suggestions

use serde::Serialize;

use crate::reconcile::{Conflict, FormatAction, Resolution};

use super::cardinality::RollupEntry;

/// Default segment indexing settings
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexDefaults {
    pub granularity: String,
    pub query_granularity: String,
    pub rollup: bool,
}

impl Default for IndexDefaults {
    fn default() -> Self {
        Self {
            granularity: "day".to_string(),
            query_granularity: "none".to_string(),
            rollup: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexConfiguration {
    pub index: IndexDefaults,
    pub rollup_suggestions: Vec<RollupEntry>,
}

/// A candidate deduplication key
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DedupKey {
    /// Display path
    pub path: String,
    pub cardinality: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Processing {
    pub dedup_keys: Vec<DedupKey>,
    pub drop_duplicates: Vec<String>,
}

/// Suggested dataset configuration
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Configurations {
    pub index_configuration: IndexConfiguration,
    pub processing: Processing,
}

/// Package rollup suggestions and pick dedup keys.
///
/// Dedup candidates are fields with a dedup format conflict whose rollup
/// entry is not indexed, most distinct first.
pub fn suggest_config(conflicts: &[Conflict], rollup: &[RollupEntry]) -> Configurations {
    let mut dedup_keys: Vec<DedupKey> = conflicts
        .iter()
        .filter(|c| {
            matches!(
                c.resolution,
                Resolution::Format {
                    action: FormatAction::Dedup,
                    ..
                }
            )
        })
        .filter_map(|c| {
            rollup
                .iter()
                .find(|entry| entry.absolute_path == c.path && !entry.index)
                .map(|entry| DedupKey {
                    path: entry.path.clone(),
                    cardinality: entry.cardinality,
                })
        })
        .collect();

    dedup_keys.sort_by(|a, b| {
        b.cardinality
            .total_cmp(&a.cardinality)
            .then_with(|| a.path.cmp(&b.path))
    });

    Configurations {
        index_configuration: IndexConfiguration {
            index: IndexDefaults::default(),
            rollup_suggestions: rollup.to_vec(),
        },
        processing: Processing {
            dedup_keys,
            drop_duplicates: vec!["Yes".to_string(), "No".to_string()],
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::{Format, SchemaPath};
    use crate::reconcile::{ConflictKind, Severity};
    use serde_json::json;

    fn dedup_conflict(name: &str, format: Format) -> Conflict {
        Conflict {
            kind: ConflictKind::Format(format),
            property: name.to_string(),
            path: SchemaPath::root().child(name),
            histogram: Default::default(),
            values: vec![format.to_string()],
            severity: Severity::Low,
            resolution: Resolution::Format {
                format,
                action: FormatAction::for_format(format),
            },
        }
    }

    fn entry(path: &str, cardinality: f64, index: bool) -> RollupEntry {
        RollupEntry {
            path: path.to_string(),
            absolute_path: SchemaPath::root().child(path),
            cardinality,
            index,
        }
    }

    #[test]
    fn test_dedup_keys_ordered_by_cardinality() {
        let conflicts = vec![
            dedup_conflict("a", Format::Uuid),
            dedup_conflict("b", Format::Uri),
            dedup_conflict("c", Format::Uuid),
            dedup_conflict("mail", Format::Email),
        ];
        let rollup = vec![
            entry("a", 40.0, false),
            entry("b", 90.0, false),
            entry("c", 10.0, true),
            entry("mail", 99.0, false),
        ];

        let config = suggest_config(&conflicts, &rollup);
        let keys: Vec<&str> =
            config.processing.dedup_keys.iter().map(|k| k.path.as_str()).collect();
        assert_eq!(keys, vec!["b", "a"]);
        assert_eq!(config.index_configuration.rollup_suggestions.len(), 4);
    }

    #[test]
    fn test_dedup_lookup_uses_schema_path() {
        let nested = SchemaPath::root().child("a").child("b");
        let conflict = Conflict {
            path: nested.clone(),
            ..dedup_conflict("b", Format::Uuid)
        };
        let rollup = vec![
            entry("a.b", 100.0, false),
            RollupEntry {
                path: nested.display_path(),
                absolute_path: nested,
                cardinality: 10.0,
                index: true,
            },
        ];

        let config = suggest_config(&[conflict], &rollup);
        assert!(config.processing.dedup_keys.is_empty());
    }

    #[test]
    fn test_serialization_shape() {
        let config = suggest_config(&[], &[]);
        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(
            value,
            json!({
                "indexConfiguration": {
                    "index": {"granularity": "day", "queryGranularity": "none", "rollup": false},
                    "rollupSuggestions": []
                },
                "processing": {"dedupKeys": [], "dropDuplicates": ["Yes", "No"]}
            })
        );
    }
}
