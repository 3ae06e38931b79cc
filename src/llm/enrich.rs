//! Comment enrichment pass
//!
//! Fills missing column and table descriptions with model-generated text.
//! The pass works on a copy of the schema and either completes as a whole or
//! fails with one [`LlmError`]; the caller's schema is never half-enriched.

use std::time::Instant;

use serde::{Deserialize, Serialize};

use super::client::{GenerationRequest, LlmClient};
use super::config::EnrichmentConfig;
use super::error::{LlmError, LlmResult};
use super::prompt::{annotate_prompt, column_prompt, sanitize_comment, table_prompt};
use crate::models::TableSchema;

/// Result of an enrichment pass
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichmentResult {
    /// The enriched copy of the schema
    pub schema: TableSchema,
    /// Number of column comments written
    pub columns_enriched: usize,
    /// Whether the table comment was written
    pub table_enriched: bool,
    /// The model used (if any)
    pub model_used: Option<String>,
    /// Time taken in milliseconds
    pub duration_ms: Option<u64>,
}

impl EnrichmentResult {
    /// Create a result for when no enrichment was performed
    pub fn unchanged(schema: TableSchema) -> Self {
        Self {
            schema,
            columns_enriched: 0,
            table_enriched: false,
            model_used: None,
            duration_ms: None,
        }
    }

    pub fn was_enriched(&self) -> bool {
        self.columns_enriched > 0 || self.table_enriched
    }
}

/// Generates comments through an [`LlmClient`]
pub struct CommentEnricher<C: LlmClient> {
    client: C,
    config: EnrichmentConfig,
}

impl<C: LlmClient> CommentEnricher<C> {
    /// Create a new enricher
    pub fn new(client: C, config: EnrichmentConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &EnrichmentConfig {
        &self.config
    }

    pub fn model_name(&self) -> &str {
        self.client.model_name()
    }

    /// Enrich a copy of `schema`
    ///
    /// Only empty comments are generated unless
    /// [`EnrichmentConfig::overwrite_existing`] is set. The whole pass runs
    /// under [`EnrichmentConfig::timeout`]; on expiry the pass fails with
    /// [`LlmError::Timeout`] and the in-flight request is dropped. A local
    /// llama.cpp generation stops at its next token.
    pub async fn enrich(&self, schema: &TableSchema) -> LlmResult<EnrichmentResult> {
        let start = Instant::now();
        let mut working = schema.clone();

        let (columns_enriched, table_enriched) =
            tokio::time::timeout(self.config.timeout(), self.fill_comments(&mut working))
                .await
                .map_err(|_| LlmError::Timeout(self.config.timeout_seconds))??;

        let duration = start.elapsed().as_millis() as u64;
        tracing::info!(
            table = %working.table_name,
            columns_enriched,
            table_enriched,
            duration_ms = duration,
            "Comment enrichment finished"
        );

        Ok(EnrichmentResult {
            schema: working,
            columns_enriched,
            table_enriched,
            model_used: Some(self.client.model_name().to_string()),
            duration_ms: Some(duration),
        })
    }

    async fn fill_comments(&self, schema: &mut TableSchema) -> LlmResult<(usize, bool)> {
        let overwrite = self.config.overwrite_existing;
        let mut columns_enriched = 0;

        for column in schema.columns.iter_mut() {
            if column.has_comment() && !overwrite {
                continue;
            }
            let column_type = if column.source_type.trim().is_empty() {
                column.resolved_target_type().to_string()
            } else {
                column.source_type.clone()
            };

            let comment = self
                .generate(column_prompt(&column.name, &column_type))
                .await?;
            tracing::debug!(column = %column.name, comment = %comment, "Generated column comment");

            if !comment.is_empty() {
                column.comment = comment;
                columns_enriched += 1;
            }
        }

        let mut table_enriched = false;
        if overwrite || !schema.has_table_comment() {
            let comment = self.generate(table_prompt(&schema.table_name)).await?;
            if !comment.is_empty() {
                schema.table_comment = comment;
                table_enriched = true;
            }
        }

        Ok((columns_enriched, table_enriched))
    }

    async fn generate(&self, prompt: String) -> LlmResult<String> {
        let request = GenerationRequest::new(prompt, self.config.max_output_tokens)
            .with_temperature(self.config.temperature);
        let response = self.client.complete(&request).await?;
        Ok(sanitize_comment(&response.text))
    }

    /// Ask the model to add descriptions to a rendered DDL statement
    ///
    /// Returns the model's reply as-is; nothing checks it is valid DDL.
    pub async fn annotate_ddl(&self, ddl: &str) -> LlmResult<String> {
        let request = GenerationRequest::new(annotate_prompt(ddl), self.config.annotate_max_tokens)
            .with_temperature(self.config.temperature);

        let response = tokio::time::timeout(self.config.timeout(), self.client.complete(&request))
            .await
            .map_err(|_| LlmError::Timeout(self.config.timeout_seconds))??;
        Ok(response.text)
    }
}

/// Enrich a schema without creating an enricher
///
/// Returns the schema unchanged when the config has no LLM mode enabled.
pub async fn enrich_schema<C: LlmClient>(
    client: C,
    schema: &TableSchema,
    config: &EnrichmentConfig,
) -> LlmResult<EnrichmentResult> {
    if !config.is_enabled() {
        return Ok(EnrichmentResult::unchanged(schema.clone()));
    }
    CommentEnricher::new(client, config.clone())
        .enrich(schema)
        .await
}
