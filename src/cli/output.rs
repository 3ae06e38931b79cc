//! Output formatting for CLI

use std::io::Read;
use std::path::{Path, PathBuf};

use bq_ddl_sdk::models::TableSchema;

use crate::error::CliError;

/// Load input content from file or stdin (`-`)
pub fn load_input(input: &str) -> Result<String, CliError> {
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

/// Write to `output`, or print to stdout when none is given
pub fn write_output(content: &str, output: Option<&Path>) -> Result<(), CliError> {
    match output {
        Some(path) => {
            std::fs::write(path, content)
                .map_err(|e| CliError::FileWriteError(path.to_path_buf(), e.to_string()))?;
            eprintln!("Written to: {}", path.display());
        }
        None => println!("{}", content),
    }
    Ok(())
}

/// Serialize a schema as `json` or `yaml`
pub fn format_schema(schema: &TableSchema, format: &str) -> Result<String, CliError> {
    match format {
        "json" => Ok(schema.to_json_pretty()?),
        "yaml" => Ok(serde_yaml::to_string(schema)?),
        other => Err(CliError::InvalidArgument(format!(
            "Unknown output format: {} (expected json or yaml)",
            other
        ))),
    }
}

/// Print the parser diagnostic and warnings to stderr
pub fn report_diagnostics(diagnostic: Option<&str>, warnings: &[String]) {
    if let Some(message) = diagnostic {
        eprintln!("{}", message);
    }
    for warning in warnings {
        eprintln!("warning: {}", warning);
    }
}

/// One name per line, or a placeholder when empty
pub fn format_list(items: &[String], empty: &str) -> String {
    if items.is_empty() {
        empty.to_string()
    } else {
        items.join("\n")
    }
}
