//! Error types for the LiteLLM adapter

use std::time::Duration;
use thiserror::Error;
use ube_application::BackendError;

/// Result type alias for LiteLLM operations
pub type Result<T> = std::result::Result<T, LiteLlmError>;

/// Errors that can occur when talking to the proxy
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LiteLlmError {
    #[error("Request failed: {0}")]
    Connection(String),

    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Request timeout after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("Failed to parse response: {0}")]
    MalformedResponse(String),

    #[error("Invalid arguments for tool call '{tool}': {message}")]
    InvalidToolArguments { tool: String, message: String },
}

impl From<LiteLlmError> for BackendError {
    fn from(err: LiteLlmError) -> Self {
        match err {
            LiteLlmError::Connection(_) | LiteLlmError::Http { .. } => {
                BackendError::Transport(err.to_string())
            }
            LiteLlmError::Timeout(after) => BackendError::Timeout(after),
            LiteLlmError::MalformedResponse(_) | LiteLlmError::InvalidToolArguments { .. } => {
                BackendError::MalformedCompletion(err.to_string())
            }
        }
    }
}
