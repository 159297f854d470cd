//! Chat backend configuration from TOML (`[backend]` section)

use serde::{Deserialize, Serialize};

/// OpenAI-compatible proxy settings.
///
/// # Example
///
/// ```toml
/// [backend]
/// base_url = "http://localhost:4000"
/// model = "ube-default"
/// api_key_env = "LITELLM_MASTER_KEY"
/// timeout_seconds = 120
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileBackendConfig {
    /// Proxy root; `/v1/chat/completions` is appended
    pub base_url: String,
    /// Model alias passed through to the proxy
    pub model: String,
    /// Environment variable holding the bearer token
    pub api_key_env: String,
    /// Timeout for a single chat call
    pub timeout_seconds: u64,
}

impl Default for FileBackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:4000".to_string(),
            model: "ube-default".to_string(),
            api_key_env: "LITELLM_MASTER_KEY".to_string(),
            timeout_seconds: 120,
        }
    }
}

impl FileBackendConfig {
    /// Read the API key from the configured environment variable.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.is_empty())
    }
}
