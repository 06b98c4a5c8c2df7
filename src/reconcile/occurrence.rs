//! Occurrence tabulation across samples

use std::collections::{BTreeMap, BTreeSet};

use crate::inference::{Format, JsonType, SchemaPath};

use super::flatten::FlattenedField;

/// Histograms for one schema path aggregated over all samples
#[derive(Debug, Clone, PartialEq)]
pub struct Occurrence {
    pub property: String,
    /// Display path
    pub path: String,
    pub absolute_path: SchemaPath,
    /// One count per flattened record; binary unions count once per branch
    pub data_types: BTreeMap<JsonType, usize>,
    pub formats: BTreeMap<Format, usize>,
    /// Declared required-ness, counted once per sample
    pub required: BTreeMap<bool, usize>,
    /// Number of samples in which the path appeared
    pub presence: usize,
}

impl Occurrence {
    fn new(field: &FlattenedField) -> Self {
        Self {
            property: field.property.clone(),
            path: field.path.clone(),
            absolute_path: field.absolute_path.clone(),
            data_types: BTreeMap::new(),
            formats: BTreeMap::new(),
            required: BTreeMap::new(),
            presence: 0,
        }
    }

    /// Count of samples that declared the path required
    pub fn declared_required(&self) -> usize {
        self.required.get(&true).copied().unwrap_or(0)
    }

    /// Count of samples that declared the path optional
    pub fn declared_optional(&self) -> usize {
        self.required.get(&false).copied().unwrap_or(0)
    }
}

/// Occurrences of every path seen in a sample set, ordered by path
#[derive(Debug, Clone, Default)]
pub struct OccurrenceTable {
    entries: BTreeMap<SchemaPath, Occurrence>,
    sample_count: usize,
}

impl OccurrenceTable {
    /// Group the flattened fields of each sample by path
    pub fn tabulate(per_sample: &[Vec<FlattenedField>]) -> Self {
        let mut entries: BTreeMap<SchemaPath, Occurrence> = BTreeMap::new();

        for fields in per_sample {
            let mut seen: BTreeSet<&SchemaPath> = BTreeSet::new();
            for field in fields {
                let entry = entries
                    .entry(field.absolute_path.clone())
                    .or_insert_with(|| Occurrence::new(field));

                *entry.data_types.entry(field.data_type).or_insert(0) += 1;
                if let Some(format) = field.format {
                    *entry.formats.entry(format).or_insert(0) += 1;
                }
                if seen.insert(&field.absolute_path) {
                    entry.presence += 1;
                    *entry.required.entry(field.is_required).or_insert(0) += 1;
                }
            }
        }

        Self {
            entries,
            sample_count: per_sample.len(),
        }
    }

    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, path: &SchemaPath) -> Option<&Occurrence> {
        self.entries.get(path)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Occurrence> {
        self.entries.values()
    }

    /// Presence of the object or array enclosing `path`; the sample count for
    /// top-level fields
    pub fn container_presence(&self, path: &SchemaPath) -> usize {
        let container = path.container();
        if container.is_root() {
            return self.sample_count;
        }
        self.entries
            .get(&container)
            .map(|o| o.presence)
            .unwrap_or(self.sample_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::FieldSchema;
    use crate::reconcile::flatten::flatten_schema;

    fn sample(fields: &[(&str, FieldSchema)]) -> Vec<FlattenedField> {
        let schema = fields.iter().fold(FieldSchema::object(), |acc, (name, schema)| {
            acc.with_property(*name, schema.clone(), true)
        });
        flatten_schema(&schema)
    }

    #[test]
    fn test_tabulate_counts() {
        let per_sample = vec![
            sample(&[("a", FieldSchema::scalar(JsonType::Integer))]),
            sample(&[("a", FieldSchema::scalar(JsonType::String))]),
            sample(&[("b", FieldSchema::scalar(JsonType::Boolean))]),
        ];
        let table = OccurrenceTable::tabulate(&per_sample);
        assert_eq!(table.sample_count(), 3);
        assert_eq!(table.len(), 2);

        let a = table.get(&SchemaPath::root().child("a")).unwrap();
        assert_eq!(a.presence, 2);
        assert_eq!(a.data_types.get(&JsonType::Integer), Some(&1));
        assert_eq!(a.data_types.get(&JsonType::String), Some(&1));
        assert_eq!(a.declared_required(), 2);
        assert_eq!(a.declared_optional(), 0);
    }

    #[test]
    fn test_union_counts_presence_once() {
        let union = FieldSchema::union(vec![
            FieldSchema::scalar(JsonType::String),
            FieldSchema::scalar(JsonType::Null),
        ]);
        let table = OccurrenceTable::tabulate(&[sample(&[("a", union)])]);
        let a = table.get(&SchemaPath::root().child("a")).unwrap();
        assert_eq!(a.presence, 1);
        assert_eq!(a.data_types.values().sum::<usize>(), 2);
        assert_eq!(a.required.values().sum::<usize>(), 1);
    }

    #[test]
    fn test_container_presence() {
        let nested =
            FieldSchema::object().with_property("b", FieldSchema::scalar(JsonType::Integer), true);
        let per_sample = vec![
            sample(&[("a", nested.clone())]),
            sample(&[("a", nested)]),
            sample(&[("c", FieldSchema::scalar(JsonType::Integer))]),
        ];
        let table = OccurrenceTable::tabulate(&per_sample);
        let ab = SchemaPath::root().child("a").child("b");
        assert_eq!(table.container_presence(&ab), 2);
        assert_eq!(table.container_presence(&SchemaPath::root().child("a")), 3);
    }
}
