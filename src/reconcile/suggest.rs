//! Suggestion composer

use serde::Serialize;

use crate::inference::{FieldSchema, JsonType};
use crate::mapping::{ArrivalFormat, DataMappings};

use super::conflict::{Conflict, FormatAction, Resolution, ResolutionType, Severity};

/// Human-readable advisory derived from a conflict
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub property: String,
    pub message: String,
    pub advice: String,
    pub resolution_type: ResolutionType,
    pub severity: Severity,
    /// Display path
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arrival_conflict: Option<bool>,
}

/// Render every conflict as a suggestion and attach it to the schema node at
/// the conflict's path.
///
/// A data type conflict whose candidates span more than one arrival format
/// gets a second `ARRIVAL_FORMAT` suggestion, and its node records the
/// candidate arrival formats.
pub fn compose_suggestions(
    schema: &mut FieldSchema,
    conflicts: &[Conflict],
    mappings: &DataMappings,
) -> Vec<Suggestion> {
    let mut suggestions = Vec::new();

    for conflict in conflicts {
        let mut composed = vec![suggestion_for(conflict)];

        let mut arrivals: Vec<ArrivalFormat> = Vec::new();
        if let Resolution::DataType(_) = conflict.resolution {
            arrivals = conflict
                .candidate_types()
                .into_iter()
                .filter_map(|t| mappings.arrival_for(t))
                .collect();
            arrivals.sort();
            arrivals.dedup();
            if arrivals.len() > 1 {
                composed.push(arrival_suggestion(conflict, &arrivals));
            }
        }

        if let Some(node) = schema.get_mut(&conflict.path) {
            if arrivals.len() > 1 {
                node.annotations.arrival_one_of = arrivals;
            }
            node.annotations.suggestions.extend(composed.iter().cloned());
        }
        suggestions.extend(composed);
    }

    suggestions
}

fn suggestion(conflict: &Conflict, message: String, advice: String) -> Suggestion {
    Suggestion {
        property: conflict.property.clone(),
        message,
        advice,
        resolution_type: conflict.resolution.resolution_type(),
        severity: conflict.severity,
        path: conflict.display_path(),
        arrival_conflict: None,
    }
}

fn suggestion_for(conflict: &Conflict) -> Suggestion {
    let property = &conflict.property;
    let path = conflict.display_path();

    let (message, advice) = match &conflict.resolution {
        Resolution::NullField => (
            format!("Field '{property}' was null in every sample"),
            format!("Send a non-null value for '{path}' or pick one of the candidate types"),
        ),
        Resolution::DataType(resolved) => (
            format!(
                "Field '{property}' arrived as {}",
                describe_types(&conflict.candidate_types())
            ),
            format!("Defaulted '{path}' to {resolved}; send a single type for this field"),
        ),
        Resolution::Optional(true) => (
            format!("Field '{property}' is present in every sample but is not always declared"),
            format!("Marked '{path}' as required"),
        ),
        Resolution::Optional(false) => (
            format!("Field '{property}' is missing from some samples"),
            format!("Marked '{path}' as optional"),
        ),
        Resolution::Format { format, action } => match action {
            FormatAction::Transformation => (
                format!("Field '{property}' looks like {format} data"),
                format!("Consider masking or hashing '{path}' during ingestion"),
            ),
            FormatAction::Index => (
                format!("Field '{property}' holds {format} values"),
                format!("Consider '{path}' as the timestamp or an index column"),
            ),
            FormatAction::Dedup => (
                format!("Field '{property}' holds {format} identifiers"),
                format!("Consider '{path}' as a deduplication key"),
            ),
        },
    };

    suggestion(conflict, message, advice)
}

fn arrival_suggestion(conflict: &Conflict, arrivals: &[ArrivalFormat]) -> Suggestion {
    let names: Vec<&str> = arrivals.iter().map(ArrivalFormat::as_str).collect();
    let mut composed = suggestion(
        conflict,
        format!(
            "Field '{}' arrives as more than one format: {}",
            conflict.property,
            names.join(", ")
        ),
        format!(
            "Choose one arrival format for '{}' before ingesting",
            conflict.display_path()
        ),
    );
    composed.resolution_type = ResolutionType::ArrivalFormat;
    composed.arrival_conflict = Some(true);
    composed
}

fn describe_types(types: &[JsonType]) -> String {
    let names: Vec<&str> = types.iter().map(JsonType::as_str).collect();
    match names.split_last() {
        Some((last, rest)) if !rest.is_empty() => format!("{} and {}", rest.join(", "), last),
        Some((last, _)) => last.to_string(),
        None => "no known type".to_string(),
    }
}
