//! Chat backend port
//!
//! Defines the single call the engine makes to a language model.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use ube_domain::{Completion, Message, ToolChoice, ToolDefinition};

/// Errors a chat backend can surface. The variants are distinct so callers can
/// tell a broken connection from an unusable answer or a slow provider.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Malformed completion: {0}")]
    MalformedCompletion(String),

    #[error("Backend timed out after {}s", .0.as_secs())]
    Timeout(Duration),
}

impl BackendError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, BackendError::Timeout(_))
    }
}

/// Port for model completions
///
/// Implementations decode whatever wire format their provider uses into a
/// [`Completion`]. `tools` is `None` when tools must be hidden for this call.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn chat(
        &self,
        history: &[Message],
        tools: Option<&[ToolDefinition]>,
        tool_choice: Option<&ToolChoice>,
    ) -> Result<Completion, BackendError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            BackendError::Transport("connection refused".to_string()).to_string(),
            "Transport error: connection refused"
        );
        let timeout = BackendError::Timeout(Duration::from_secs(30));
        assert_eq!(timeout.to_string(), "Backend timed out after 30s");
        assert!(timeout.is_timeout());
    }
}
