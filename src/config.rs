//! Application configuration
//!
//! Loaded from a TOML file; every field has a default so an empty file (or
//! no file at all) is a valid configuration. Command-line flags override
//! values read here.
//!
//! ```toml
//! models_dir = "models"
//!
//! [target]
//! project_id = "acme-analytics"
//! dataset_id = "hr"
//! fallback_to_namespace = true
//!
//! [llm]
//! mode = "online"
//! url = "http://localhost:11434"
//! model = "phi3"
//! timeout_seconds = 60
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::export::TargetOptions;

/// Errors loading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {message}")]
    Read { path: PathBuf, message: String },

    #[error("Invalid config: {0}")]
    Parse(String),

    #[error("Invalid LLM settings: {0}")]
    Llm(String),
}

/// Backend selector for the `[llm]` section
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LlmBackend {
    #[default]
    None,
    Online,
    Offline,
}

/// `[target]` section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetSection {
    pub project_id: Option<String>,
    pub dataset_id: Option<String>,
    pub fallback_to_namespace: bool,
}

/// `[llm]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSection {
    pub mode: LlmBackend,
    /// Ollama URL (online mode)
    pub url: Option<String>,
    /// Ollama model name (online mode)
    pub model: Option<String>,
    /// GGUF file (offline mode); relative paths resolve against `models_dir`
    pub model_path: Option<PathBuf>,
    pub gpu_layers: u32,
    pub timeout_seconds: u64,
    pub max_output_tokens: usize,
    pub temperature: f32,
    pub overwrite_existing: bool,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            mode: LlmBackend::None,
            url: None,
            model: None,
            model_path: None,
            gpu_layers: 0,
            timeout_seconds: 120,
            max_output_tokens: 64,
            temperature: 0.1,
            overwrite_existing: false,
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub target: TargetSection,
    pub llm: LlmSection,
    /// Directory scanned for local GGUF models
    pub models_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            target: TargetSection::default(),
            llm: LlmSection::default(),
            models_dir: PathBuf::from("models"),
        }
    }
}

impl AppConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Load `path` if given, else the defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Render target derived from the `[target]` section
    pub fn target_options(&self) -> TargetOptions {
        TargetOptions {
            project_id: self.target.project_id.clone(),
            dataset_id: self.target.dataset_id.clone(),
            table_name: None,
            fallback_to_namespace: self.target.fallback_to_namespace,
        }
    }

    /// Resolve an offline model path against `models_dir`
    pub fn resolve_model_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() || path.exists() {
            path.to_path_buf()
        } else {
            self.models_dir.join(path)
        }
    }

    /// Enrichment settings derived from the `[llm]` section
    #[cfg(feature = "llm")]
    pub fn enrichment_config(&self) -> Result<crate::llm::EnrichmentConfig, ConfigError> {
        use crate::llm::{DEFAULT_OLLAMA_URL, EnrichmentConfig, LlmMode};

        let llm = &self.llm;
        let llm_mode = match llm.mode {
            LlmBackend::None => LlmMode::None,
            LlmBackend::Online => {
                let model = llm.model.clone().ok_or_else(|| {
                    ConfigError::Llm("online mode needs `model`".to_string())
                })?;
                LlmMode::Online {
                    url: llm
                        .url
                        .clone()
                        .unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string()),
                    model,
                }
            }
            LlmBackend::Offline => {
                let model_path = llm.model_path.as_deref().ok_or_else(|| {
                    ConfigError::Llm("offline mode needs `model_path`".to_string())
                })?;
                LlmMode::Offline {
                    model_path: self.resolve_model_path(model_path),
                    gpu_layers: llm.gpu_layers,
                }
            }
        };

        Ok(EnrichmentConfig {
            llm_mode,
            timeout_seconds: llm.timeout_seconds,
            max_output_tokens: llm.max_output_tokens,
            temperature: llm.temperature,
            overwrite_existing: llm.overwrite_existing,
            ..EnrichmentConfig::default()
        })
    }
}
