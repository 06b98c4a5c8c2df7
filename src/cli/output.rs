//! Output formatting for CLI

use std::path::Path;

use serde::Serialize;

use dataset_schema_core::mapping::FieldDescriptor;
use dataset_schema_core::pipeline::GeneratedSchema;

use crate::error::CliError;

/// Serialized document format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Json,
    Yaml,
}

/// Serialize `value` in the requested format
pub fn render<T: Serialize>(value: &T, format: OutputFormat) -> Result<String, CliError> {
    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(value).map_err(|e| CliError::Serialization(e.to_string()))
        }
        OutputFormat::Yaml => {
            serde_yaml::to_string(value).map_err(|e| CliError::Serialization(e.to_string()))
        }
    }
}

/// Write to `output`, or stdout when no path is given
pub fn emit(content: &str, output: Option<&Path>) -> Result<(), CliError> {
    match output {
        Some(path) => std::fs::write(path, content)
            .map_err(|e| CliError::FileWriteError(path.to_path_buf(), e.to_string())),
        None => {
            println!("{}", content);
            Ok(())
        }
    }
}

/// Human-readable conflict report
pub fn format_conflict_summary(generated: &GeneratedSchema) -> String {
    let mut output = String::new();

    if generated.suggestions.is_empty() {
        output.push_str("No conflicts across samples\n");
        return output;
    }

    output.push_str(&format!("{} suggestion(s):\n", generated.suggestions.len()));
    for suggestion in &generated.suggestions {
        output.push_str(&format!(
            "  [{}] {} ({}): {}\n",
            suggestion.severity, suggestion.path, suggestion.resolution_type, suggestion.message
        ));
        if !suggestion.advice.is_empty() {
            output.push_str(&format!("      {}\n", suggestion.advice));
        }
    }

    let dedup_keys = &generated.configurations.processing.dedup_keys;
    if !dedup_keys.is_empty() {
        let keys: Vec<String> = dedup_keys
            .iter()
            .map(|k| format!("{} ({:.2})", k.path, k.cardinality))
            .collect();
        output.push_str(&format!("Dedup key candidates: {}\n", keys.join(", ")));
    }

    output
}

/// Compact `name:type` listing of ingestion fields
pub fn format_field_summary(fields: &[FieldDescriptor]) -> String {
    let columns: Vec<String> = fields
        .iter()
        .map(|f| format!("{}:{}", f.name, f.data_type.as_deref().unwrap_or("?")))
        .collect();
    format!("{} field(s): {}\n", fields.len(), columns.join(", "))
}
