//! LLM comment enrichment
//!
//! Generates human-readable column and table descriptions for schemas that
//! lack them.
//!
//! # Features
//!
//! - **Online Mode**: Connect to an Ollama server (requires `llm-online` feature)
//! - **Offline Mode**: Run a local GGUF model through llama.cpp (requires `llm-offline` feature)
//!
//! # Example
//!
//! ```ignore
//! use bq_ddl_sdk::llm::{CommentEnricher, EnrichmentConfig, OllamaClient};
//!
//! let client = OllamaClient::new("http://localhost:11434", "phi3");
//! let enricher = CommentEnricher::new(client, EnrichmentConfig::with_ollama("phi3"));
//!
//! let result = enricher.enrich(&schema).await?;
//! println!("{} comments written", result.columns_enriched);
//! ```
//!
//! Without either backend feature, the module still provides configuration,
//! prompts and the enrichment pass, but the bundled clients return
//! [`LlmError::FeatureNotAvailable`].

pub mod client;
pub mod config;
pub mod enrich;
pub mod error;
pub mod llamacpp;
pub mod models;
pub mod ollama;
pub mod prompt;

// Re-export main types
pub use client::{CompletionResponse, GenerationRequest, LlmClient};
pub use config::{DEFAULT_OLLAMA_URL, EnrichmentConfig, LlmMode};
pub use enrich::{CommentEnricher, EnrichmentResult, enrich_schema};
pub use error::{LlmError, LlmResult};
pub use llamacpp::LlamaCppClient;
pub use models::list_local_models;
pub use ollama::OllamaClient;
pub use prompt::{extract_ddl, sanitize_comment};

#[cfg(test)]
pub use client::MockLlmClient;

/// Build the client selected by `config`
///
/// Returns [`LlmError::ConfigError`] when the mode is [`LlmMode::None`].
pub fn create_client(config: &EnrichmentConfig) -> LlmResult<Box<dyn LlmClient>> {
    match &config.llm_mode {
        LlmMode::None => Err(LlmError::ConfigError(
            "no LLM mode configured".to_string(),
        )),
        LlmMode::Online { url, model } => Ok(Box::new(
            OllamaClient::new(url.clone(), model.clone())
                .with_timeout(config.timeout_seconds)
                .with_temperature(config.temperature),
        )),
        LlmMode::Offline {
            model_path,
            gpu_layers,
        } => Ok(Box::new(
            LlamaCppClient::new(model_path.clone())?
                .with_gpu_layers(*gpu_layers)
                .with_temperature(config.temperature),
        )),
    }
}
