//! dataset-schema: infer and reconcile dataset schemas from sample events

mod commands;
mod error;
mod output;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use dataset_schema_core::mapping::NamingConvention;

use commands::{FieldsArgs, GenerateArgs, handle_fields, handle_generate};
use output::OutputFormat;

#[derive(Parser)]
#[command(name = "dataset-schema", version, about = "Infer dataset schemas from sample events")]
struct Cli {
    /// Suppress progress output on stderr
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a schema, suggestions and configuration from samples
    Generate {
        /// Samples file (JSON array or JSON lines), or '-' for stdin
        input: String,

        /// Dataset name
        #[arg(short, long, default_value = "dataset")]
        dataset: String,

        /// Extract events from this dot path of each sample
        #[arg(short, long)]
        batch_key: Option<String>,

        /// Generator settings (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        #[arg(short, long, value_enum, default_value = "json")]
        format: OutputFormat,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Flatten a generated schema into ingestion field descriptors
    Fields {
        /// Schema file, or '-' for stdin
        schema: String,

        /// Column naming: dotted or underscored
        #[arg(short, long, default_value = "dotted")]
        naming: NamingConvention,

        /// Transformation fields (JSON array)
        #[arg(short, long)]
        transformations: Option<PathBuf>,

        /// Denormalized fields (JSON array)
        #[arg(long)]
        denorms: Option<PathBuf>,

        #[arg(short, long, value_enum, default_value = "json")]
        format: OutputFormat,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Generate {
            input,
            dataset,
            batch_key,
            config,
            format,
            output,
        } => handle_generate(GenerateArgs {
            input,
            dataset,
            batch_key,
            config,
            format,
            output,
            quiet: cli.quiet,
        })
        .context("generate failed")?,
        Command::Fields {
            schema,
            naming,
            transformations,
            denorms,
            format,
            output,
        } => handle_fields(FieldsArgs {
            schema,
            naming,
            transformations,
            denorms,
            format,
            output,
            quiet: cli.quiet,
        })
        .context("fields failed")?,
    }

    Ok(())
}
