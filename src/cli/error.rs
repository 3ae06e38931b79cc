//! CLI error type

use std::path::PathBuf;

use bq_ddl_sdk::config::ConfigError;
use bq_ddl_sdk::import::ImportError;
use bq_ddl_sdk::llm::LlmError;
use bq_ddl_sdk::pipeline::PipelineError;

/// Errors reported by `bq-ddl` commands
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Failed to read {0}: {1}")]
    FileReadError(PathBuf, String),

    #[error("Failed to write {0}: {1}")]
    FileWriteError(PathBuf, String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Import(#[from] ImportError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error(transparent)]
    Llm(#[from] LlmError),

    #[cfg(feature = "postgres-backend")]
    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl CliError {
    /// Message shown to the user, with hints where there are any
    pub fn user_message(&self) -> String {
        match self {
            CliError::Llm(e) => e.user_message(),
            other => other.to_string(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            CliError::InvalidArgument(_) | CliError::Config(_) => 2,
            _ => 1,
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for CliError {
    fn from(err: serde_yaml::Error) -> Self {
        CliError::Serialization(err.to_string())
    }
}
