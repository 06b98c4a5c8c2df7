//! Conflict classification

use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::fmt;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::{Value, json};

use crate::inference::{Format, JsonType, SchemaPath};

use super::occurrence::{Occurrence, OccurrenceTable};

/// How urgently a conflict needs attention
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Severity {
    #[serde(rename = "MUST-FIX")]
    MustFix,
    #[serde(rename = "MEDIUM")]
    Medium,
    #[serde(rename = "LOW")]
    Low,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::MustFix => "MUST-FIX",
            Severity::Medium => "MEDIUM",
            Severity::Low => "LOW",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Follow-up suggested for a detected format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatAction {
    /// Sensitive values worth masking or hashing
    Transformation,
    /// Temporal values worth indexing
    Index,
    /// Identifiers worth deduplicating on
    Dedup,
}

impl FormatAction {
    /// Action for a detected format
    pub fn for_format(format: Format) -> Self {
        match format {
            Format::Email | Format::CreditCard | Format::Ipv4 | Format::Ipv6 => {
                FormatAction::Transformation
            }
            Format::Date | Format::DateTime | Format::Time | Format::Epoch => FormatAction::Index,
            Format::Uuid | Format::Uri => FormatAction::Dedup,
        }
    }
}

/// Machine-readable resolution category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResolutionType {
    DataType,
    NullField,
    Optional,
    Transformation,
    Index,
    Dedup,
    ArrivalFormat,
}

impl ResolutionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolutionType::DataType => "DATA_TYPE",
            ResolutionType::NullField => "NULL_FIELD",
            ResolutionType::Optional => "OPTIONAL",
            ResolutionType::Transformation => "TRANSFORMATION",
            ResolutionType::Index => "INDEX",
            ResolutionType::Dedup => "DEDUP",
            ResolutionType::ArrivalFormat => "ARRIVAL_FORMAT",
        }
    }
}

impl fmt::Display for ResolutionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolution of one conflict, serialised as `{value, type}`
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Retype the node to the majority type
    DataType(JsonType),
    /// Mark the node as null-typed
    NullField,
    /// Set the node's required flag
    Optional(bool),
    /// Advisory only; the schema is left as is
    Format { format: Format, action: FormatAction },
}

impl Resolution {
    pub fn resolution_type(&self) -> ResolutionType {
        match self {
            Resolution::DataType(_) => ResolutionType::DataType,
            Resolution::NullField => ResolutionType::NullField,
            Resolution::Optional(_) => ResolutionType::Optional,
            Resolution::Format { action, .. } => match action {
                FormatAction::Transformation => ResolutionType::Transformation,
                FormatAction::Index => ResolutionType::Index,
                FormatAction::Dedup => ResolutionType::Dedup,
            },
        }
    }

    pub fn value(&self) -> Value {
        match self {
            Resolution::DataType(t) => json!(t.as_str()),
            Resolution::NullField => json!("null"),
            Resolution::Optional(required) => json!(required),
            Resolution::Format { format, .. } => json!(format.as_str()),
        }
    }
}

impl Serialize for Resolution {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("value", &self.value())?;
        map.serialize_entry("type", self.resolution_type().as_str())?;
        map.end()
    }
}

/// Kind of disagreement found at a path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConflictKind {
    NullField,
    DataType,
    OptionalType,
    /// A detected format, named after the majority format
    Format(Format),
}

impl ConflictKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConflictKind::NullField => "NULL_FIELD",
            ConflictKind::DataType => "DATA_TYPE",
            ConflictKind::OptionalType => "OPTIONAL_TYPE",
            ConflictKind::Format(format) => format.as_str(),
        }
    }
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ConflictKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A disagreement for one field across the sample set
#[derive(Debug, Clone, PartialEq)]
pub struct Conflict {
    pub kind: ConflictKind,
    pub property: String,
    pub path: SchemaPath,
    /// The histogram the conflict was derived from
    pub histogram: BTreeMap<String, usize>,
    /// Candidate values; never contains `"null"` for data type conflicts
    pub values: Vec<String>,
    pub severity: Severity,
    pub resolution: Resolution,
}

impl Conflict {
    /// Display path of the conflicting field
    pub fn display_path(&self) -> String {
        self.path.display_path()
    }

    /// Candidate JSON types of a data type conflict
    pub fn candidate_types(&self) -> Vec<JsonType> {
        self.values.iter().filter_map(|v| v.parse().ok()).collect()
    }
}

impl Serialize for Conflict {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(8))?;
        map.serialize_entry("type", &self.kind)?;
        map.serialize_entry("property", &self.property)?;
        map.serialize_entry("path", &self.display_path())?;
        map.serialize_entry("absolutePath", &self.path)?;
        map.serialize_entry("conflicts", &self.histogram)?;
        map.serialize_entry("resolution", &self.resolution)?;
        map.serialize_entry("values", &self.values)?;
        map.serialize_entry("severity", &self.severity)?;
        map.end()
    }
}

/// Classify the conflicts of every tabulated path, in path order
pub fn classify_conflicts(table: &OccurrenceTable) -> Vec<Conflict> {
    let multi_sample = table.sample_count() > 1;
    let mut conflicts = Vec::new();

    for occurrence in table.iter() {
        let null_only = occurrence.data_types.len() == 1
            && occurrence.data_types.contains_key(&JsonType::Null);

        if null_only {
            conflicts.push(null_field_conflict(occurrence));
        } else if occurrence.data_types.len() > 1 {
            conflicts.push(data_type_conflict(occurrence));
        }

        if multi_sample {
            if let Some(conflict) = optional_conflict(occurrence, table) {
                conflicts.push(conflict);
            }
        }

        if let Some(conflict) = format_conflict(occurrence) {
            conflicts.push(conflict);
        }
    }

    conflicts
}

fn conflict(
    occurrence: &Occurrence,
    kind: ConflictKind,
    histogram: BTreeMap<String, usize>,
    values: Vec<String>,
    severity: Severity,
    resolution: Resolution,
) -> Conflict {
    Conflict {
        kind,
        property: occurrence.property.clone(),
        path: occurrence.absolute_path.clone(),
        histogram,
        values,
        severity,
        resolution,
    }
}

fn type_histogram(occurrence: &Occurrence) -> BTreeMap<String, usize> {
    occurrence
        .data_types
        .iter()
        .map(|(t, count)| (t.as_str().to_string(), *count))
        .collect()
}

fn null_field_conflict(occurrence: &Occurrence) -> Conflict {
    conflict(
        occurrence,
        ConflictKind::NullField,
        type_histogram(occurrence),
        Vec::new(),
        Severity::MustFix,
        Resolution::NullField,
    )
}

/// Majority type, ignoring `null` when anything else was seen. Equal counts
/// go to the type that comes first in [`JsonType`] order.
fn majority_type(data_types: &BTreeMap<JsonType, usize>) -> JsonType {
    data_types
        .iter()
        .filter(|(t, _)| **t != JsonType::Null || data_types.len() == 1)
        .max_by_key(|(t, count)| (**count, Reverse(**t)))
        .map(|(t, _)| *t)
        .unwrap_or(JsonType::Null)
}

fn data_type_conflict(occurrence: &Occurrence) -> Conflict {
    let resolved = majority_type(&occurrence.data_types);
    let values = occurrence
        .data_types
        .keys()
        .filter(|t| **t != JsonType::Null)
        .map(|t| t.as_str().to_string())
        .collect();

    conflict(
        occurrence,
        ConflictKind::DataType,
        type_histogram(occurrence),
        values,
        Severity::MustFix,
        Resolution::DataType(resolved),
    )
}

/// Required-ness disagreement between what samples declared and where the
/// field actually showed up.
///
/// A field is actually required when it appeared in more than one sample and
/// in every sample that carried its enclosing container.
fn optional_conflict(occurrence: &Occurrence, table: &OccurrenceTable) -> Option<Conflict> {
    let declared = occurrence.declared_required() > occurrence.declared_optional();
    let container = table.container_presence(&occurrence.absolute_path);
    let actual = occurrence.presence > 1 && occurrence.presence >= container;

    if declared == actual {
        return None;
    }

    let mut histogram = BTreeMap::new();
    histogram.insert("present".to_string(), occurrence.presence);
    histogram.insert(
        "absent".to_string(),
        container.saturating_sub(occurrence.presence),
    );

    Some(conflict(
        occurrence,
        ConflictKind::OptionalType,
        histogram,
        vec![declared.to_string(), actual.to_string()],
        Severity::Medium,
        Resolution::Optional(actual),
    ))
}

fn format_conflict(occurrence: &Occurrence) -> Option<Conflict> {
    let majority = occurrence
        .formats
        .iter()
        .max_by_key(|(format, count)| (**count, Reverse(**format)))
        .map(|(format, _)| *format)?;

    let histogram = occurrence
        .formats
        .iter()
        .map(|(format, count)| (format.as_str().to_string(), *count))
        .collect();
    let values = occurrence
        .formats
        .keys()
        .map(|format| format.as_str().to_string())
        .collect();

    Some(conflict(
        occurrence,
        ConflictKind::Format(majority),
        histogram,
        values,
        Severity::Low,
        Resolution::Format {
            format: majority,
            action: FormatAction::for_format(majority),
        },
    ))
}
