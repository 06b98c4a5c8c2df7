//! Fields command implementation

use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde_json::Value;

use dataset_schema_core::mapping::{
    DenormField, NamingConvention, TransformationField, generate_ingestion_fields,
};

use super::load_input;
use crate::error::CliError;
use crate::output::{OutputFormat, emit, format_field_summary, render};

pub struct FieldsArgs {
    pub schema: String,
    pub naming: NamingConvention,
    pub transformations: Option<PathBuf>,
    pub denorms: Option<PathBuf>,
    pub format: OutputFormat,
    pub output: Option<PathBuf>,
    pub quiet: bool,
}

fn load_json<T: DeserializeOwned>(input: &str) -> Result<T, CliError> {
    let content = load_input(input)?;
    serde_json::from_str(&content)
        .map_err(|e| CliError::InvalidJson(input.to_string(), e.to_string()))
}

fn load_optional<T: DeserializeOwned>(path: Option<&PathBuf>) -> Result<Vec<T>, CliError> {
    match path {
        Some(path) => load_json(&path.to_string_lossy()),
        None => Ok(Vec::new()),
    }
}

/// Handle the fields command
pub fn handle_fields(args: FieldsArgs) -> Result<(), CliError> {
    let document: Value = load_json(&args.schema)?;
    // Accept either a bare schema or a full generation result
    let schema = document.get("schema").cloned().unwrap_or(document);

    let transformations: Vec<TransformationField> = load_optional(args.transformations.as_ref())?;
    let denorms: Vec<DenormField> = load_optional(args.denorms.as_ref())?;

    let fields = generate_ingestion_fields(&schema, &transformations, &denorms, args.naming)?;

    if !args.quiet {
        eprint!("{}", format_field_summary(&fields));
    }

    emit(&render(&fields, args.format)?, args.output.as_deref())
}
