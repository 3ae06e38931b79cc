//! CLI command implementations

pub mod enrich;
pub mod models;
pub mod parse;
pub mod render;

#[cfg(feature = "postgres-backend")]
pub mod catalog;

use bq_ddl_sdk::pipeline::SchemaInput;

use crate::error::CliError;

/// Build a pipeline input, detecting JSON by its leading brace when `from` is `auto`
pub(crate) fn schema_input(content: String, from: &str, dialect: &str) -> Result<SchemaInput, CliError> {
    let is_json = match from {
        "auto" => content.trim_start().starts_with('{'),
        "json" => true,
        "ddl" | "sql" => false,
        other => {
            return Err(CliError::InvalidArgument(format!(
                "Unknown input format: {} (expected auto, ddl or json)",
                other
            )));
        }
    };

    Ok(if is_json {
        SchemaInput::Json(content)
    } else {
        SchemaInput::Ddl {
            text: content,
            dialect: dialect.to_string(),
        }
    })
}
