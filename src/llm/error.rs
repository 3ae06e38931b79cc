//! Error types for comment generation
//!
//! Every failure of a text-generation backend, and of an enrichment pass as a
//! whole, surfaces as a single [`LlmError`].

use thiserror::Error;

/// Errors that can occur during LLM operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// Failed to connect to LLM service
    #[error("Failed to connect to LLM service: {0}")]
    ConnectionError(String),

    /// Request or pass timeout
    #[error("LLM request timed out after {0} seconds")]
    Timeout(u64),

    /// Model not found or failed to load
    #[error("Model error: {0}")]
    ModelError(String),

    /// Invalid response from LLM
    #[error("Invalid LLM response: {0}")]
    InvalidResponse(String),

    /// Failed to decode a service response body
    #[error("Failed to parse LLM service response: {0}")]
    ParseError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// IO error
    #[error("IO error: {0}")]
    IoError(String),

    /// Rate limiting
    #[error("Rate limited by LLM service, retry after {0} seconds")]
    RateLimited(u64),

    /// Prompt too large for the model context
    #[error("Context exceeds maximum tokens ({max}): {actual} tokens")]
    ContextTooLarge { max: usize, actual: usize },

    /// Feature not available
    #[error("LLM feature not available: {0}. Enable with --features {1}")]
    FeatureNotAvailable(String, String),
}

impl From<std::io::Error> for LlmError {
    fn from(err: std::io::Error) -> Self {
        LlmError::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for LlmError {
    fn from(err: serde_json::Error) -> Self {
        LlmError::ParseError(err.to_string())
    }
}

/// Result type for LLM operations
pub type LlmResult<T> = Result<T, LlmError>;

impl LlmError {
    /// Get a user-friendly error message for CLI output
    pub fn user_message(&self) -> String {
        match self {
            LlmError::ConnectionError(msg) => {
                format!(
                    "Failed to connect to LLM service: {msg}\n\n\
                    Hints:\n\
                    - Verify the --ollama-url endpoint is correct\n\
                    - Ensure 'ollama serve' is running"
                )
            }
            LlmError::Timeout(secs) => {
                format!(
                    "Comment generation timed out after {secs} seconds.\n\n\
                    Hints:\n\
                    - Consider using a smaller/faster model\n\
                    - Increase the limit with --timeout"
                )
            }
            LlmError::ModelError(msg) => {
                format!(
                    "Model error: {msg}\n\n\
                    Hint: list available models with 'bq-ddl models'"
                )
            }
            LlmError::RateLimited(secs) => {
                format!(
                    "Rate limited by LLM service. Retry after {secs} seconds."
                )
            }
            LlmError::ContextTooLarge { max, actual } => {
                format!(
                    "Prompt too large for model context ({actual} tokens, max {max}).\n\n\
                    Hint: use a model with a larger context window"
                )
            }
            LlmError::FeatureNotAvailable(feature, flag) => {
                format!(
                    "LLM feature '{feature}' not available.\n\n\
                    Hint: Rebuild with --features {flag}"
                )
            }
            _ => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LlmError::ConnectionError("Connection refused".to_string());
        assert_eq!(
            err.to_string(),
            "Failed to connect to LLM service: Connection refused"
        );

        let err = LlmError::Timeout(30);
        assert_eq!(err.to_string(), "LLM request timed out after 30 seconds");

        let err = LlmError::ContextTooLarge {
            max: 2048,
            actual: 4000,
        };
        assert_eq!(
            err.to_string(),
            "Context exceeds maximum tokens (2048): 4000 tokens"
        );
    }

    #[test]
    fn test_user_message_hints() {
        let msg = LlmError::Timeout(10).user_message();
        assert!(msg.contains("--timeout"));

        let msg = LlmError::FeatureNotAvailable("Ollama".into(), "llm-online".into()).user_message();
        assert!(msg.contains("--features llm-online"));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let llm_err: LlmError = io_err.into();
        assert!(matches!(llm_err, LlmError::IoError(_)));
    }

    #[test]
    fn test_error_from_serde() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let llm_err: LlmError = json_err.into();
        assert!(matches!(llm_err, LlmError::ParseError(_)));
    }
}
