//! `models` command: list available models

use std::path::PathBuf;

use clap::Args;

use bq_ddl_sdk::config::AppConfig;
use bq_ddl_sdk::llm::{OllamaClient, list_local_models};

use crate::error::CliError;
use crate::output::format_list;

#[derive(Debug, Args)]
pub struct ModelsArgs {
    /// Directory holding GGUF files (defaults to the configured models dir)
    #[arg(long)]
    pub dir: Option<PathBuf>,

    /// Also list the models installed on this Ollama server
    #[arg(long)]
    pub ollama_url: Option<String>,
}

/// Handle the models command
pub async fn handle_models(args: &ModelsArgs, config: &AppConfig) -> Result<(), CliError> {
    let dir = args.dir.clone().unwrap_or_else(|| config.models_dir.clone());
    let local = list_local_models(&dir)?;
    println!("Local models in {}:", dir.display());
    println!("{}", format_list(&local, "  (none)"));

    if let Some(url) = &args.ollama_url {
        let remote = OllamaClient::new(url.clone(), "").list_models().await?;
        println!("\nOllama models at {}:", url);
        println!("{}", format_list(&remote, "  (none)"));
    }
    Ok(())
}
