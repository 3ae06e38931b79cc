//! `render` command: schema to BigQuery DDL

use std::path::PathBuf;

use clap::Args;

use bq_ddl_sdk::config::AppConfig;
use bq_ddl_sdk::llm::{CommentEnricher, create_client};
use bq_ddl_sdk::pipeline::{DdlRequest, generate_ddl, generate_ddl_with_comments};

use super::schema_input;
use crate::error::CliError;
use crate::output::{load_input, report_diagnostics, write_output};

#[derive(Debug, Args)]
pub struct RenderArgs {
    /// DDL or schema JSON file, or `-` for stdin
    pub input: String,

    /// Input format: auto, ddl or json
    #[arg(long, default_value = "auto")]
    pub from: String,

    /// Tokenizer dialect for DDL input
    #[arg(long, default_value = "generic")]
    pub dialect: String,

    /// GCP project (used together with --dataset)
    #[arg(long)]
    pub project: Option<String>,

    /// Target dataset
    #[arg(long)]
    pub dataset: Option<String>,

    /// Override the table name
    #[arg(long)]
    pub table: Option<String>,

    /// Use the source schema namespace when no dataset is set
    #[arg(long)]
    pub namespace_fallback: bool,

    /// Fail on duplicate column names
    #[arg(long)]
    pub strict: bool,

    /// Generate missing comments with the configured LLM
    #[arg(long)]
    pub enrich: bool,

    /// Output file (stdout if not provided)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Handle the render command
pub async fn handle_render(args: &RenderArgs, config: &AppConfig) -> Result<(), CliError> {
    let content = load_input(&args.input)?;

    let mut target = config.target_options();
    if let Some(project) = &args.project {
        target.project_id = Some(project.clone());
    }
    if let Some(dataset) = &args.dataset {
        target.dataset_id = Some(dataset.clone());
    }
    target.table_name = args.table.clone();
    target.fallback_to_namespace |= args.namespace_fallback;

    let request = DdlRequest::new(schema_input(content, &args.from, &args.dialect)?)
        .with_target(target)
        .with_strict(args.strict);

    let output = if args.enrich {
        let enrichment = config.enrichment_config()?;
        let enricher = CommentEnricher::new(create_client(&enrichment)?, enrichment);
        generate_ddl_with_comments(&request, &enricher).await?
    } else {
        generate_ddl(&request)?
    };

    report_diagnostics(output.diagnostic.as_deref(), &output.warnings);
    write_output(&output.ddl, args.output.as_deref())
}
