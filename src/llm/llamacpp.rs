//! llama.cpp client for offline comment generation
//!
//! Runs a local GGUF model (the files listed by
//! [`list_local_models`](super::models::list_local_models)) without any
//! network service. The model is loaded on first use and shared by clones.
//!
//! # Example
//!
//! ```ignore
//! use bq_ddl_sdk::llm::{GenerationRequest, LlamaCppClient, LlmClient};
//!
//! let client = LlamaCppClient::new("models/Phi-3-mini-4k-instruct.Q4_0.gguf")?
//!     .with_gpu_layers(35);
//! let response = client
//!     .complete(&GenerationRequest::new("Describe the column `email`", 64))
//!     .await?;
//! ```

use std::path::{Path, PathBuf};
#[cfg(feature = "llm-offline")]
use std::sync::atomic::{AtomicBool, Ordering};
#[cfg(feature = "llm-offline")]
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::client::{CompletionResponse, GenerationRequest, LlmClient};
use super::error::{LlmError, LlmResult};

#[cfg(feature = "llm-offline")]
use llama_cpp_2::{
    context::params::LlamaContextParams,
    llama_backend::LlamaBackend,
    llama_batch::LlamaBatch,
    model::{AddBos, LlamaModel, Special, params::LlamaModelParams},
    sampling::{LlamaSampler, LlamaSamplerChainParams},
    token::LlamaToken,
};

/// File extension of loadable model files
pub const MODEL_EXTENSION: &str = "gguf";

/// llama.cpp client for offline inference
#[derive(Debug, Clone)]
pub struct LlamaCppClient {
    model_path: PathBuf,
    /// File stem of the model path
    model_name: String,
    gpu_layers: u32,
    /// Context size in tokens
    context_size: usize,
    /// Default temperature when the request carries none
    temperature: f32,
    top_p: f32,
    top_k: i32,
    /// Loaded model (lazy initialization)
    #[cfg(feature = "llm-offline")]
    inner: Arc<Mutex<Option<LoadedModel>>>,
}

#[cfg(feature = "llm-offline")]
struct LoadedModel {
    backend: LlamaBackend,
    model: LlamaModel,
}

#[cfg(feature = "llm-offline")]
impl std::fmt::Debug for LoadedModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("LoadedModel")
    }
}

/// Raises its flag when dropped
///
/// Held by the future awaiting a blocking generation. A caller timeout drops
/// that future, and the generation loop stops at the next token, releasing
/// the model lock.
#[cfg(feature = "llm-offline")]
struct CancelOnDrop(Arc<AtomicBool>);

#[cfg(feature = "llm-offline")]
impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.0.store(true, Ordering::Relaxed);
    }
}

impl LlamaCppClient {
    /// Create a new llama.cpp client
    ///
    /// The file must exist and carry the `.gguf` extension. Loading happens
    /// on the first completion.
    pub fn new(model_path: impl Into<PathBuf>) -> LlmResult<Self> {
        let path: PathBuf = model_path.into();

        if !path.is_file() {
            return Err(LlmError::ModelError(format!(
                "Model file not found: {}",
                path.display()
            )));
        }

        if path.extension().and_then(|s| s.to_str()) != Some(MODEL_EXTENSION) {
            return Err(LlmError::ModelError(format!(
                "Model file must be a GGUF file: {}",
                path.display()
            )));
        }

        let model_name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown")
            .to_string();

        Ok(Self {
            model_path: path,
            model_name,
            gpu_layers: 0,
            context_size: 2048,
            temperature: 0.1,
            top_p: 0.9,
            top_k: 40,
            #[cfg(feature = "llm-offline")]
            inner: Arc::new(Mutex::new(None)),
        })
    }

    /// Set the number of GPU layers to offload (0 = CPU only)
    pub fn with_gpu_layers(mut self, layers: u32) -> Self {
        self.gpu_layers = layers;
        self
    }

    /// Set the context size in tokens
    pub fn with_context_size(mut self, size: usize) -> Self {
        self.context_size = size.max(64);
        self
    }

    /// Set the default temperature for sampling
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature.clamp(0.0, 2.0);
        self
    }

    /// Set the top-p (nucleus) sampling parameter
    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = top_p.clamp(0.0, 1.0);
        self
    }

    /// Set the top-k sampling parameter
    pub fn with_top_k(mut self, top_k: i32) -> Self {
        self.top_k = top_k.max(1);
        self
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    pub fn uses_gpu(&self) -> bool {
        self.gpu_layers > 0
    }

    /// Load the model if not already loaded
    #[cfg(feature = "llm-offline")]
    fn ensure_loaded(&self) -> LlmResult<()> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|e| LlmError::ModelError(format!("Failed to acquire model lock: {}", e)))?;

        if inner.is_some() {
            return Ok(());
        }

        tracing::info!(
            model_path = %self.model_path.display(),
            gpu_layers = self.gpu_layers,
            context_size = self.context_size,
            "Loading llama.cpp model"
        );

        let backend = LlamaBackend::init().map_err(|e| {
            LlmError::ModelError(format!("Failed to initialize llama.cpp backend: {}", e))
        })?;

        let model_params = LlamaModelParams::default().with_n_gpu_layers(self.gpu_layers);
        let model = LlamaModel::load_from_file(&backend, &self.model_path, &model_params)
            .map_err(|e| LlmError::ModelError(format!("Failed to load model: {}", e)))?;

        tracing::info!(n_vocab = model.n_vocab(), "Model loaded");

        *inner = Some(LoadedModel { backend, model });
        Ok(())
    }

    /// Run one blocking generation
    #[cfg(feature = "llm-offline")]
    fn generate(
        &self,
        request: &GenerationRequest,
        cancel: &AtomicBool,
    ) -> LlmResult<CompletionResponse> {
        let started = std::time::Instant::now();
        self.ensure_loaded()?;

        let inner = self
            .inner
            .lock()
            .map_err(|e| LlmError::ModelError(format!("Failed to acquire model lock: {}", e)))?;
        let loaded = inner
            .as_ref()
            .ok_or_else(|| LlmError::ModelError("Model not loaded".to_string()))?;

        let n_ctx = std::num::NonZeroU32::new(self.context_size as u32)
            .ok_or_else(|| LlmError::ConfigError("context size must be non-zero".to_string()))?;
        let mut ctx = loaded
            .model
            .new_context(&loaded.backend, LlamaContextParams::default().with_n_ctx(Some(n_ctx)))
            .map_err(|e| LlmError::ModelError(format!("Failed to create context: {}", e)))?;

        let tokens = loaded
            .model
            .str_to_token(&request.prompt, AddBos::Always)
            .map_err(|e| LlmError::ModelError(format!("Tokenization failed: {}", e)))?;

        let prompt_len = tokens.len();
        if prompt_len >= self.context_size {
            return Err(LlmError::ContextTooLarge {
                max: self.context_size,
                actual: prompt_len,
            });
        }

        let mut batch = LlamaBatch::new(self.context_size, 1);
        for (i, token) in tokens.iter().enumerate() {
            let is_last = i == prompt_len - 1;
            batch.add(*token, i as i32, &[0], is_last).map_err(|e| {
                LlmError::ModelError(format!("Failed to add token to batch: {}", e))
            })?;
        }
        ctx.decode(&mut batch)
            .map_err(|e| LlmError::ModelError(format!("Failed to decode prompt: {}", e)))?;

        let mut sampler = LlamaSampler::chain(LlamaSamplerChainParams::default());
        sampler.add_temp(request.temperature.unwrap_or(self.temperature));
        sampler.add_top_k(self.top_k);
        sampler.add_top_p(self.top_p, 1);
        sampler.add_dist(42);

        let mut output_tokens: Vec<LlamaToken> = Vec::new();
        let mut pos = prompt_len;
        let max_tokens = request
            .max_output_tokens
            .min(self.context_size - prompt_len);

        for _ in 0..max_tokens {
            if cancel.load(Ordering::Relaxed) {
                tracing::debug!(generated = output_tokens.len(), "Generation cancelled");
                return Err(LlmError::ModelError("generation cancelled".to_string()));
            }
            let token = sampler.sample(&ctx, -1);
            sampler.accept(token);

            if loaded.model.is_eog_token(token) {
                break;
            }
            output_tokens.push(token);

            batch.clear();
            batch.add(token, pos as i32, &[0], true).map_err(|e| {
                LlmError::ModelError(format!("Failed to add generated token to batch: {}", e))
            })?;
            ctx.decode(&mut batch).map_err(|e| {
                LlmError::ModelError(format!("Failed to decode generated token: {}", e))
            })?;
            pos += 1;
        }

        let text = loaded
            .model
            .tokens_to_str(&output_tokens, Special::Tokenize)
            .map_err(|e| LlmError::ModelError(format!("Failed to decode output tokens: {}", e)))?;

        Ok(CompletionResponse::new(text)
            .with_tokens(prompt_len, output_tokens.len())
            .with_duration(started.elapsed().as_millis() as u64))
    }
}

#[cfg(feature = "llm-offline")]
#[async_trait]
impl LlmClient for LlamaCppClient {
    async fn complete(&self, request: &GenerationRequest) -> LlmResult<CompletionResponse> {
        // llama.cpp inference is blocking
        let client = self.clone();
        let request = request.clone();
        let cancel = Arc::new(AtomicBool::new(false));
        let _guard = CancelOnDrop(Arc::clone(&cancel));

        tokio::task::spawn_blocking(move || client.generate(&request, &cancel))
            .await
            .map_err(|e| LlmError::ModelError(format!("Task join error: {}", e)))?
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }

    async fn is_ready(&self) -> bool {
        self.ensure_loaded().is_ok()
    }
}

#[cfg(not(feature = "llm-offline"))]
#[async_trait]
impl LlmClient for LlamaCppClient {
    async fn complete(&self, _request: &GenerationRequest) -> LlmResult<CompletionResponse> {
        Err(LlmError::FeatureNotAvailable(
            "Offline LLM".to_string(),
            "llm-offline".to_string(),
        ))
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }

    async fn is_ready(&self) -> bool {
        false
    }
}
