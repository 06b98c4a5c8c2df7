//! Generate command implementation

use std::path::PathBuf;

use serde_json::Value;

use dataset_schema_core::inference::{GeneratorConfig, SampleConfig};
use dataset_schema_core::pipeline::SchemaGenerator;

use super::load_input;
use crate::error::CliError;
use crate::output::{OutputFormat, emit, format_conflict_summary, render};

pub struct GenerateArgs {
    pub input: String,
    pub dataset: String,
    pub batch_key: Option<String>,
    pub config: Option<PathBuf>,
    pub format: OutputFormat,
    pub output: Option<PathBuf>,
    pub quiet: bool,
}

/// Parse samples from a JSON array, a single JSON document or JSON lines
fn parse_samples(content: &str, source: &str) -> Result<Vec<Value>, CliError> {
    if let Ok(value) = serde_json::from_str::<Value>(content) {
        return Ok(match value {
            Value::Array(samples) => samples,
            other => vec![other],
        });
    }

    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            serde_json::from_str(line).map_err(|e| {
                CliError::InvalidJson(format!("{} line {}", source, idx + 1), e.to_string())
            })
        })
        .collect()
}

/// Handle the generate command
pub fn handle_generate(args: GenerateArgs) -> Result<(), CliError> {
    let config = match &args.config {
        Some(path) => GeneratorConfig::from_file(path)?,
        None => GeneratorConfig::default(),
    };

    let content = load_input(&args.input)?;
    let samples = parse_samples(&content, &args.input)?;

    let sample_config = match &args.batch_key {
        Some(key) => SampleConfig::batch(args.dataset.clone(), key.clone()),
        None => SampleConfig::new(args.dataset.clone()),
    };

    if !args.quiet {
        eprintln!("Inferring schema for '{}' from {} sample(s)", args.dataset, samples.len());
    }

    let generated = SchemaGenerator::new(config).generate(&samples, &sample_config)?;

    if !args.quiet {
        eprint!("{}", format_conflict_summary(&generated));
    }

    let rendered = render(&generated, args.format)?;
    emit(&rendered, args.output.as_deref())?;

    if let (Some(path), false) = (&args.output, args.quiet) {
        eprintln!("Wrote schema to {}", path.display());
    }

    Ok(())
}
