//! LiteLLM backend: the `ChatBackend` adapter over HTTP.

use super::error::{LiteLlmError, Result};
use super::protocol::{build_request, parse_completion};
use crate::config::FileBackendConfig;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};
use ube_application::ports::chat_backend::{BackendError, ChatBackend};
use ube_domain::{Completion, Message, ToolChoice, ToolDefinition};

/// Default per-request timeout
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Chat backend talking to an OpenAI-compatible proxy.
pub struct LiteLlmBackend {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl LiteLlmBackend {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            model: model.into(),
            api_key: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Build from the `[backend]` config section. The API key is read from
    /// the configured environment variable; without one, requests are sent
    /// unauthenticated.
    pub fn from_config(config: &FileBackendConfig) -> Self {
        let api_key = config.api_key();
        if api_key.is_none() {
            warn!(
                env = %config.api_key_env,
                "No API key in environment, sending unauthenticated requests"
            );
        }

        let backend = Self::new(&config.base_url, &config.model)
            .with_timeout(Duration::from_secs(config.timeout_seconds));
        match api_key {
            Some(key) => backend.with_api_key(key),
            None => backend,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// `{base_url}/v1/chat/completions`
    pub fn endpoint(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url.trim_end_matches('/'))
    }

    async fn send(
        &self,
        history: &[Message],
        tools: Option<&[ToolDefinition]>,
        tool_choice: Option<&ToolChoice>,
    ) -> Result<Completion> {
        let body = build_request(&self.model, history, tools, tool_choice);
        debug!(
            model = %self.model,
            messages = body.messages.len(),
            tools = body.tools.as_ref().map_or(0, Vec::len),
            "Sending chat completion request"
        );

        let mut request = self
            .client
            .post(self.endpoint())
            .timeout(self.timeout)
            .json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| self.request_error(e))?;
        let status = response.status();
        let text = response.text().await.map_err(|e| self.request_error(e))?;

        if !status.is_success() {
            return Err(LiteLlmError::Http {
                status: status.as_u16(),
                message: error_message(&text),
            });
        }

        parse_completion(&text)
    }

    fn request_error(&self, err: reqwest::Error) -> LiteLlmError {
        if err.is_timeout() {
            LiteLlmError::Timeout(self.timeout)
        } else {
            LiteLlmError::Connection(err.to_string())
        }
    }
}

/// `error.message` from an OpenAI-style error body, or the raw body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.pointer("/error/message")
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string())
}

#[async_trait]
impl ChatBackend for LiteLlmBackend {
    async fn chat(
        &self,
        history: &[Message],
        tools: Option<&[ToolDefinition]>,
        tool_choice: Option<&ToolChoice>,
    ) -> std::result::Result<Completion, BackendError> {
        self.send(history, tools, tool_choice).await.map_err(|e| {
            warn!(error = %e, "Chat completion failed");
            BackendError::from(e)
        })
    }
}
