//! LLM client trait and request/response types
//!
//! This module defines the `LlmClient` trait the enrichment pass talks to.
//! Backends live in [`ollama`](super::ollama) (online) and
//! [`llamacpp`](super::llamacpp) (offline).

use async_trait::async_trait;

#[cfg(test)]
use super::error::LlmError;
use super::error::LlmResult;

/// A single text-generation request
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    /// Full prompt text
    pub prompt: String,
    /// Upper bound on generated tokens
    pub max_output_tokens: usize,
    /// Sampling temperature; `None` uses the backend's setting
    pub temperature: Option<f32>,
}

impl GenerationRequest {
    /// Create a new request
    pub fn new(prompt: impl Into<String>, max_output_tokens: usize) -> Self {
        Self {
            prompt: prompt.into(),
            max_output_tokens,
            temperature: None,
        }
    }

    /// Set temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// Trait for LLM client implementations
///
/// This trait provides a unified interface for different LLM backends,
/// allowing comment enrichment to work with both online (Ollama) and
/// offline (llama.cpp) models.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Generate a completion for the given request
    async fn complete(&self, request: &GenerationRequest) -> LlmResult<CompletionResponse>;

    /// Get the model name being used
    fn model_name(&self) -> &str;

    /// Check if the client is ready and connected
    async fn is_ready(&self) -> bool;
}

#[async_trait]
impl<T: LlmClient + ?Sized> LlmClient for Box<T> {
    async fn complete(&self, request: &GenerationRequest) -> LlmResult<CompletionResponse> {
        (**self).complete(request).await
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }

    async fn is_ready(&self) -> bool {
        (**self).is_ready().await
    }
}

/// Response from an LLM completion request
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    /// The generated text
    pub text: String,
    /// Number of tokens in the prompt
    pub prompt_tokens: Option<usize>,
    /// Number of tokens generated
    pub completion_tokens: Option<usize>,
    /// Time taken for completion in milliseconds
    pub duration_ms: Option<u64>,
}

impl CompletionResponse {
    /// Create a new completion response
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            prompt_tokens: None,
            completion_tokens: None,
            duration_ms: None,
        }
    }

    /// Set token counts
    pub fn with_tokens(mut self, prompt: usize, completion: usize) -> Self {
        self.prompt_tokens = Some(prompt);
        self.completion_tokens = Some(completion);
        self
    }

    /// Set duration
    pub fn with_duration(mut self, ms: u64) -> Self {
        self.duration_ms = Some(ms);
        self
    }
}

/// A mock LLM client for testing
///
/// Replies with its responses in turn (cycling) and records every request.
#[cfg(test)]
pub struct MockLlmClient {
    responses: Vec<String>,
    model: String,
    fail_after: Option<usize>,
    delay: Option<std::time::Duration>,
    requests: std::sync::Mutex<Vec<GenerationRequest>>,
}

#[cfg(test)]
impl MockLlmClient {
    /// Create a new mock client that always returns the given response
    pub fn new(response: impl Into<String>) -> Self {
        Self::with_responses(vec![response.into()])
    }

    /// Create a mock client that returns each response in turn
    pub fn with_responses(responses: Vec<String>) -> Self {
        Self {
            responses,
            model: "mock-model".to_string(),
            fail_after: None,
            delay: None,
            requests: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Create a mock client that fails
    pub fn failing() -> Self {
        Self::new("").fail_after(0)
    }

    /// Fail every request after the first `successes`
    pub fn fail_after(mut self, successes: usize) -> Self {
        self.fail_after = Some(successes);
        self
    }

    /// Sleep before answering
    pub fn with_delay(mut self, delay: std::time::Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[cfg(test)]
#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, request: &GenerationRequest) -> LlmResult<CompletionResponse> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let index = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(request.clone());
            requests.len() - 1
        };
        if self.fail_after.is_some_and(|n| index >= n) {
            return Err(LlmError::ConnectionError("Mock failure".to_string()));
        }
        let text = if self.responses.is_empty() {
            String::new()
        } else {
            self.responses[index % self.responses.len()].clone()
        };
        Ok(CompletionResponse::new(text))
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    async fn is_ready(&self) -> bool {
        self.fail_after != Some(0)
    }
}
