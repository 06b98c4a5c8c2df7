//! CLI command implementations

mod fields;
mod generate;

pub use fields::{FieldsArgs, handle_fields};
pub use generate::{GenerateArgs, handle_generate};

use std::io::Read;
use std::path::PathBuf;

use crate::error::CliError;

/// Load input content from file or stdin
pub(crate) fn load_input(input: &str) -> Result<String, CliError> {
    if input == "-" {
        let mut content = String::new();
        std::io::stdin()
            .read_to_string(&mut content)
            .map_err(|e| CliError::InvalidArgument(format!("Failed to read stdin: {}", e)))?;
        Ok(content)
    } else {
        let path = PathBuf::from(input);
        std::fs::read_to_string(&path).map_err(|e| CliError::FileReadError(path, e.to_string()))
    }
}
