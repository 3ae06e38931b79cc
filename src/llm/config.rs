//! Configuration types for comment enrichment
//!
//! Selects the backend (online Ollama, offline GGUF, or none) and bounds each
//! enrichment pass: time limit, output length and sampling temperature.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default Ollama endpoint
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// LLM operation mode
///
/// - `None`: no enrichment, comments are left as they are
/// - `Online`: connect to an Ollama API server
/// - `Offline`: run a local GGUF model through llama.cpp
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum LlmMode {
    /// No enrichment
    #[default]
    None,

    /// Online mode using Ollama API
    Online {
        /// Ollama API URL (default: http://localhost:11434)
        #[serde(default = "default_url")]
        url: String,
        /// Model name (e.g., "llama3.2", "phi3")
        model: String,
    },

    /// Offline mode using embedded llama.cpp
    Offline {
        /// Path to GGUF model file
        model_path: PathBuf,
        /// Number of GPU layers to offload (0 = CPU only)
        #[serde(default)]
        gpu_layers: u32,
    },
}

fn default_url() -> String {
    DEFAULT_OLLAMA_URL.to_string()
}

impl LlmMode {
    /// Create an online mode configuration with default Ollama URL
    pub fn online(model: impl Into<String>) -> Self {
        LlmMode::Online {
            url: default_url(),
            model: model.into(),
        }
    }

    /// Create an online mode configuration with custom URL
    pub fn online_with_url(url: impl Into<String>, model: impl Into<String>) -> Self {
        LlmMode::Online {
            url: url.into(),
            model: model.into(),
        }
    }

    /// Create an offline mode configuration
    pub fn offline(model_path: impl Into<PathBuf>) -> Self {
        LlmMode::Offline {
            model_path: model_path.into(),
            gpu_layers: 0,
        }
    }

    /// Create an offline mode configuration with GPU acceleration
    pub fn offline_with_gpu(model_path: impl Into<PathBuf>, gpu_layers: u32) -> Self {
        LlmMode::Offline {
            model_path: model_path.into(),
            gpu_layers,
        }
    }

    pub fn is_enabled(&self) -> bool {
        !matches!(self, LlmMode::None)
    }

    pub fn is_online(&self) -> bool {
        matches!(self, LlmMode::Online { .. })
    }

    pub fn is_offline(&self) -> bool {
        matches!(self, LlmMode::Offline { .. })
    }
}

/// Configuration for one enrichment pass
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichmentConfig {
    /// LLM mode (none, online, offline)
    #[serde(default)]
    pub llm_mode: LlmMode,

    /// Limit for the whole pass in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Token limit for each column/table comment
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: usize,

    /// Token limit for whole-DDL annotation
    #[serde(default = "default_annotate_max_tokens")]
    pub annotate_max_tokens: usize,

    /// Temperature for LLM sampling (0.0 = deterministic)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Regenerate comments that are already present
    #[serde(default)]
    pub overwrite_existing: bool,
}

fn default_timeout_seconds() -> u64 {
    120
}

fn default_max_output_tokens() -> usize {
    64
}

fn default_annotate_max_tokens() -> usize {
    256
}

fn default_temperature() -> f32 {
    0.1
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            llm_mode: LlmMode::None,
            timeout_seconds: default_timeout_seconds(),
            max_output_tokens: default_max_output_tokens(),
            annotate_max_tokens: default_annotate_max_tokens(),
            temperature: default_temperature(),
            overwrite_existing: false,
        }
    }
}

impl EnrichmentConfig {
    /// Create a config using an Ollama model
    pub fn with_ollama(model: impl Into<String>) -> Self {
        Self {
            llm_mode: LlmMode::online(model),
            ..Default::default()
        }
    }

    /// Create a config using a local GGUF model
    pub fn with_local_model(model_path: impl Into<PathBuf>) -> Self {
        Self {
            llm_mode: LlmMode::offline(model_path),
            ..Default::default()
        }
    }

    /// Set timeout in seconds
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    /// Set per-comment token limit
    pub fn with_max_output_tokens(mut self, tokens: usize) -> Self {
        self.max_output_tokens = tokens.max(1);
        self
    }

    /// Set temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature.clamp(0.0, 2.0);
        self
    }

    /// Regenerate existing comments too
    pub fn with_overwrite_existing(mut self, overwrite: bool) -> Self {
        self.overwrite_existing = overwrite;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn is_enabled(&self) -> bool {
        self.llm_mode.is_enabled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_llm_mode_default() {
        let mode = LlmMode::default();
        assert!(matches!(mode, LlmMode::None));
        assert!(!mode.is_enabled());
    }

    #[test]
    fn test_llm_mode_online() {
        let mode = LlmMode::online("phi3");
        assert!(mode.is_online());
        assert!(!mode.is_offline());

        match mode {
            LlmMode::Online { url, model } => {
                assert_eq!(url, "http://localhost:11434");
                assert_eq!(model, "phi3");
            }
            _ => panic!("Expected Online mode"),
        }
    }

    #[test]
    fn test_llm_mode_offline_with_gpu() {
        let mode = LlmMode::offline_with_gpu("/models/phi-3.gguf", 35);
        assert!(mode.is_offline());
        match mode {
            LlmMode::Offline {
                model_path,
                gpu_layers,
            } => {
                assert_eq!(model_path, PathBuf::from("/models/phi-3.gguf"));
                assert_eq!(gpu_layers, 35);
            }
            _ => panic!("Expected Offline mode"),
        }
    }

    #[test]
    fn test_llm_mode_serde() {
        let parsed: LlmMode = serde_json::from_str(r#"{"mode": "online", "model": "phi3"}"#).unwrap();
        assert_eq!(parsed, LlmMode::online("phi3"));

        let json = serde_json::to_string(&LlmMode::offline("m.gguf")).unwrap();
        assert!(json.contains("offline"));
    }

    #[test]
    fn test_enrichment_config_default() {
        let config = EnrichmentConfig::default();
        assert!(!config.is_enabled());
        assert_eq!(config.max_output_tokens, 64);
        assert_eq!(config.annotate_max_tokens, 256);
        assert_eq!(config.timeout(), Duration::from_secs(120));
        assert!(!config.overwrite_existing);
    }

    #[test]
    fn test_enrichment_config_builders() {
        let config = EnrichmentConfig::with_ollama("phi3")
            .with_timeout(30)
            .with_temperature(5.0)
            .with_overwrite_existing(true);
        assert!(config.is_enabled());
        assert_eq!(config.timeout_seconds, 30);
        assert!((config.temperature - 2.0).abs() < f32::EPSILON);
        assert!(config.overwrite_existing);
    }

    #[test]
    fn test_enrichment_config_partial_deserialize() {
        let config: EnrichmentConfig = serde_json::from_str(r#"{"timeout_seconds": 5}"#).unwrap();
        assert_eq!(config.timeout_seconds, 5);
        assert_eq!(config.max_output_tokens, 64);
        assert_eq!(config.llm_mode, LlmMode::None);
    }
}
