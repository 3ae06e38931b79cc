//! `parse` command: DDL to canonical schema

use std::path::PathBuf;

use clap::Args;

use bq_ddl_sdk::import::SQLImporter;

use crate::error::CliError;
use crate::output::{format_schema, load_input, report_diagnostics, write_output};

#[derive(Debug, Args)]
pub struct ParseArgs {
    /// DDL file, or `-` for stdin
    pub input: String,

    /// Tokenizer dialect (generic, mysql, postgresql, mssql, bigquery, ...)
    #[arg(long, default_value = "generic")]
    pub dialect: String,

    /// Output format: json or yaml
    #[arg(long, default_value = "json")]
    pub format: String,

    /// Leave missing database/schema qualifiers empty
    #[arg(long)]
    pub no_placeholders: bool,

    /// Output file (stdout if not provided)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Handle the parse command
pub fn handle_parse(args: &ParseArgs) -> Result<(), CliError> {
    let content = load_input(&args.input)?;

    let mut importer = SQLImporter::new(&args.dialect);
    if args.no_placeholders {
        importer = importer.without_placeholders();
    }
    let schema = importer.parse(&content);

    report_diagnostics(schema.diagnostic_message.as_deref(), &[]);
    write_output(&format_schema(&schema, &args.format)?, args.output.as_deref())
}
