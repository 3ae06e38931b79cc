//! bq-ddl CLI - render BigQuery CREATE TABLE statements from source schemas.

mod commands;
mod error;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;

use bq_ddl_sdk::config::AppConfig;

use crate::commands::enrich::EnrichArgs;
use crate::commands::models::ModelsArgs;
use crate::commands::parse::ParseArgs;
use crate::commands::render::RenderArgs;
use crate::error::CliError;

#[derive(Parser)]
#[command(name = "bq-ddl")]
#[command(about = "Normalize source schemas and render BigQuery DDL")]
#[command(version)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log format: text or json
    #[arg(long, default_value = "text", global = true)]
    log_format: String,

    /// Log verbosity: debug, info, warn, error
    #[arg(long, default_value = "warn", global = true)]
    verbosity: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a CREATE TABLE statement into the canonical schema
    Parse(ParseArgs),

    /// Render a BigQuery CREATE OR REPLACE TABLE statement
    Render(RenderArgs),

    /// Fill in missing comments with an LLM
    Enrich(EnrichArgs),

    /// List available models
    Models(ModelsArgs),

    /// Browse a live source database
    #[cfg(feature = "postgres-backend")]
    Catalog(commands::catalog::CatalogArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = setup_logging(&cli.verbosity, &cli.log_format) {
        eprintln!("Failed to setup logging: {}", e);
        return ExitCode::from(1);
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e.user_message());
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = AppConfig::load_or_default(cli.config.as_deref())?;

    match cli.command {
        Commands::Parse(args) => commands::parse::handle_parse(&args),
        Commands::Render(args) => commands::render::handle_render(&args, &config).await,
        Commands::Enrich(args) => commands::enrich::handle_enrich(&args, &config).await,
        Commands::Models(args) => commands::models::handle_models(&args, &config).await,
        #[cfg(feature = "postgres-backend")]
        Commands::Catalog(args) => commands::catalog::handle_catalog(&args).await,
    }
}

fn setup_logging(verbosity: &str, format: &str) -> anyhow::Result<()> {
    let level = match verbosity.to_lowercase().as_str() {
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        other => anyhow::bail!("unknown verbosity '{}'", other),
    };

    // Logs go to stderr so rendered DDL on stdout stays clean
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .with_writer(std::io::stderr);

    if format == "json" {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
    Ok(())
}
