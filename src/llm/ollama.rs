//! Ollama API client for online comment generation
//!
//! # Example
//!
//! ```ignore
//! use bq_ddl_sdk::llm::{GenerationRequest, LlmClient, OllamaClient};
//!
//! let client = OllamaClient::new("http://localhost:11434", "phi3").with_timeout(60);
//! let response = client
//!     .complete(&GenerationRequest::new("Describe the column `email`", 64))
//!     .await?;
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::client::{CompletionResponse, GenerationRequest, LlmClient};
use super::error::{LlmError, LlmResult};

/// Ollama API client
#[derive(Debug, Clone)]
pub struct OllamaClient {
    base_url: String,
    model: String,
    /// Per-request timeout in seconds
    timeout_seconds: u64,
    /// Default temperature when the request carries none
    temperature: f32,
    #[cfg(feature = "llm-online")]
    client: reqwest::Client,
}

/// Request body for `/api/generate`
#[derive(Debug, Serialize)]
#[cfg_attr(not(feature = "llm-online"), allow(dead_code))]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
#[cfg_attr(not(feature = "llm-online"), allow(dead_code))]
struct GenerateOptions {
    temperature: f32,
    /// Output token limit
    num_predict: usize,
}

/// Response from `/api/generate`
#[derive(Debug, Deserialize)]
#[cfg_attr(not(feature = "llm-online"), allow(dead_code))]
struct GenerateResponse {
    response: String,
    #[serde(default)]
    done: bool,
    /// Nanoseconds
    #[serde(default)]
    total_duration: Option<u64>,
    #[serde(default)]
    prompt_eval_count: Option<usize>,
    #[serde(default)]
    eval_count: Option<usize>,
}

impl GenerateResponse {
    #[cfg_attr(not(feature = "llm-online"), allow(dead_code))]
    fn into_completion(self) -> CompletionResponse {
        let mut completion = CompletionResponse::new(self.response);
        if let (Some(prompt), Some(eval)) = (self.prompt_eval_count, self.eval_count) {
            completion = completion.with_tokens(prompt, eval);
        }
        if let Some(nanos) = self.total_duration {
            completion = completion.with_duration(nanos / 1_000_000);
        }
        completion
    }
}

/// Response from `/api/tags`
#[derive(Debug, Deserialize)]
#[cfg_attr(not(feature = "llm-online"), allow(dead_code))]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelInfo>,
}

#[derive(Debug, Deserialize)]
#[cfg_attr(not(feature = "llm-online"), allow(dead_code))]
struct ModelInfo {
    name: String,
}

fn not_available() -> LlmError {
    LlmError::FeatureNotAvailable("Online LLM".to_string(), "llm-online".to_string())
}

impl OllamaClient {
    /// Create a new Ollama client
    ///
    /// # Arguments
    /// * `base_url` - Base URL of the Ollama API (e.g., "http://localhost:11434")
    /// * `model` - Model name to use (e.g., "phi3", "llama3.2")
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            timeout_seconds: 120,
            temperature: 0.1,
            #[cfg(feature = "llm-online")]
            client: reqwest::Client::new(),
        }
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    /// Set the default temperature for sampling
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature.clamp(0.0, 2.0);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// List models installed on the Ollama server
    #[cfg(feature = "llm-online")]
    pub async fn list_models(&self) -> LlmResult<Vec<String>> {
        let url = format!("{}/api/tags", self.base_url);

        let response = self
            .client
            .get(&url)
            .timeout(std::time::Duration::from_secs(10))
            .send()
            .await
            .map_err(|e| LlmError::ConnectionError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(LlmError::ConnectionError(format!(
                "Failed to list models: HTTP {}",
                response.status()
            )));
        }

        let tags: TagsResponse = response
            .json()
            .await
            .map_err(|e| LlmError::ParseError(e.to_string()))?;

        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    #[cfg(not(feature = "llm-online"))]
    pub async fn list_models(&self) -> LlmResult<Vec<String>> {
        Err(not_available())
    }

    fn generate_body<'a>(&'a self, request: &'a GenerationRequest) -> GenerateRequest<'a> {
        GenerateRequest {
            model: &self.model,
            prompt: &request.prompt,
            stream: false,
            options: GenerateOptions {
                temperature: request.temperature.unwrap_or(self.temperature),
                num_predict: request.max_output_tokens,
            },
        }
    }
}

#[async_trait]
impl LlmClient for OllamaClient {
    #[cfg(feature = "llm-online")]
    async fn complete(&self, request: &GenerationRequest) -> LlmResult<CompletionResponse> {
        let url = format!("{}/api/generate", self.base_url);
        let body = self.generate_body(request);

        tracing::debug!(url = %url, model = %self.model, "Sending request to Ollama");

        let response = self
            .client
            .post(&url)
            .json(&body)
            .timeout(std::time::Duration::from_secs(self.timeout_seconds))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout(self.timeout_seconds)
                } else if e.is_connect() {
                    LlmError::ConnectionError(format!(
                        "Failed to connect to Ollama at {}: {}",
                        self.base_url, e
                    ))
                } else {
                    LlmError::ConnectionError(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            if status.as_u16() == 429 {
                return Err(LlmError::RateLimited(60));
            }
            let error_text = response.text().await.unwrap_or_default();
            if status.as_u16() == 404 {
                return Err(LlmError::ModelError(format!(
                    "model '{}' not found: {}",
                    self.model, error_text
                )));
            }
            return Err(LlmError::ConnectionError(format!(
                "Ollama API error (HTTP {}): {}",
                status, error_text
            )));
        }

        let generated: GenerateResponse = response
            .json()
            .await
            .map_err(|e| LlmError::ParseError(e.to_string()))?;

        let completion = generated.into_completion();
        tracing::debug!(
            duration_ms = completion.duration_ms.unwrap_or(0),
            completion_tokens = completion.completion_tokens.unwrap_or(0),
            "Ollama completion finished"
        );
        Ok(completion)
    }

    #[cfg(not(feature = "llm-online"))]
    async fn complete(&self, request: &GenerationRequest) -> LlmResult<CompletionResponse> {
        let _ = self.generate_body(request);
        Err(not_available())
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    async fn is_ready(&self) -> bool {
        self.list_models().await.is_ok()
    }
}
