//! `enrich` command: fill missing comments with an LLM

use std::path::PathBuf;

use clap::Args;

use bq_ddl_sdk::config::AppConfig;
use bq_ddl_sdk::llm::{CommentEnricher, EnrichmentConfig, LlmMode, create_client, extract_ddl};
use bq_ddl_sdk::pipeline::extract_schema;
use bq_ddl_sdk::validation::SchemaNormalizer;

use super::schema_input;
use crate::error::CliError;
use crate::output::{format_schema, load_input, report_diagnostics, write_output};

#[derive(Debug, Args)]
pub struct EnrichArgs {
    /// DDL or schema JSON file, or `-` for stdin
    pub input: String,

    /// Input format: auto, ddl or json
    #[arg(long, default_value = "auto")]
    pub from: String,

    /// Tokenizer dialect for DDL input
    #[arg(long, default_value = "generic")]
    pub dialect: String,

    /// Ollama server URL
    #[arg(long)]
    pub ollama_url: Option<String>,

    /// Ollama model name
    #[arg(long, conflicts_with = "model_path")]
    pub model: Option<String>,

    /// Local GGUF model file (relative names resolve against the models dir)
    #[arg(long)]
    pub model_path: Option<PathBuf>,

    /// GPU layers for the local model
    #[arg(long, default_value = "0")]
    pub gpu_layers: u32,

    /// Limit for the whole pass in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Regenerate comments that are already present
    #[arg(long)]
    pub overwrite: bool,

    /// Treat the input as a rendered statement and ask the model to annotate it
    #[arg(long)]
    pub annotate: bool,

    /// Output format for the schema: json or yaml
    #[arg(long, default_value = "json")]
    pub format: String,

    /// Output file (stdout if not provided)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

fn enrichment_config(args: &EnrichArgs, config: &AppConfig) -> Result<EnrichmentConfig, CliError> {
    let mut enrichment = config.enrichment_config()?;

    if let Some(model) = &args.model {
        let url = args
            .ollama_url
            .clone()
            .or_else(|| config.llm.url.clone())
            .unwrap_or_else(|| bq_ddl_sdk::llm::DEFAULT_OLLAMA_URL.to_string());
        enrichment.llm_mode = LlmMode::online_with_url(url, model.clone());
    } else if let Some(path) = &args.model_path {
        enrichment.llm_mode =
            LlmMode::offline_with_gpu(config.resolve_model_path(path), args.gpu_layers);
    }
    if let Some(timeout) = args.timeout {
        enrichment.timeout_seconds = timeout;
    }
    enrichment.overwrite_existing |= args.overwrite;

    if !enrichment.is_enabled() {
        return Err(CliError::InvalidArgument(
            "no model selected: pass --model or --model-path, or set [llm] in the config file"
                .to_string(),
        ));
    }
    Ok(enrichment)
}

/// Handle the enrich command
pub async fn handle_enrich(args: &EnrichArgs, config: &AppConfig) -> Result<(), CliError> {
    let content = load_input(&args.input)?;
    let enrichment = enrichment_config(args, config)?;
    let enricher = CommentEnricher::new(create_client(&enrichment)?, enrichment);

    eprintln!("Generating comments with {}...", enricher.model_name());

    if args.annotate {
        let annotated = enricher.annotate_ddl(&content).await?;
        return write_output(&extract_ddl(&annotated), args.output.as_deref());
    }

    let schema = extract_schema(&schema_input(content, &args.from, &args.dialect)?)?;
    let diagnostic = schema.diagnostic_message.clone();
    let normalized = SchemaNormalizer::new()
        .normalize(schema)
        .map_err(|e| CliError::Pipeline(e.into()))?;
    report_diagnostics(diagnostic.as_deref(), &normalized.report.warnings);

    let result = enricher.enrich(&normalized.schema).await?;
    eprintln!(
        "Wrote {} column comment(s){}",
        result.columns_enriched,
        if result.table_enriched { " and the table comment" } else { "" }
    );

    write_output(&format_schema(&result.schema, &args.format)?, args.output.as_deref())
}
