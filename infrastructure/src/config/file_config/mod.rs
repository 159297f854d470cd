//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted into application and domain
//! types at composition time.

mod backend;
mod execution;
mod governance;
mod output;

pub use backend::FileBackendConfig;
pub use execution::FileExecutionConfig;
pub use governance::FileGovernanceConfig;
pub use output::{FileAuditConfig, FileLoggingConfig};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use ube_application::ExecutionParams;
use ube_domain::PermissionFilter;

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigValidationError {
    #[error("backend.timeout_seconds cannot be 0")]
    InvalidTimeout,

    #[error("backend.model cannot be empty")]
    EmptyModelName,

    #[error("backend.base_url cannot be empty")]
    EmptyBaseUrl,

    #[error("execution.max_tool_call_depth must be at least 1")]
    ZeroToolCallDepth,

    #[error("execution.max_decomposition_retries must be at least 1")]
    ZeroDecompositionRetries,
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// OpenAI-compatible chat backend
    pub backend: FileBackendConfig,
    /// Loop depth, retries and fan-out
    pub execution: FileExecutionConfig,
    /// Permission filter allow-list
    pub governance: FileGovernanceConfig,
    /// Audit trail destination
    pub audit: FileAuditConfig,
    /// Log file destination
    pub logging: FileLoggingConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning every detected issue.
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut issues = Vec::new();

        if self.backend.timeout_seconds == 0 {
            issues.push(ConfigValidationError::InvalidTimeout);
        }
        if self.backend.model.trim().is_empty() {
            issues.push(ConfigValidationError::EmptyModelName);
        }
        if self.backend.base_url.trim().is_empty() {
            issues.push(ConfigValidationError::EmptyBaseUrl);
        }
        if self.execution.max_tool_call_depth == 0 {
            issues.push(ConfigValidationError::ZeroToolCallDepth);
        }
        if self.execution.max_decomposition_retries == 0 {
            issues.push(ConfigValidationError::ZeroDecompositionRetries);
        }

        issues
    }

    pub fn to_execution_params(&self) -> ExecutionParams {
        ExecutionParams::default()
            .with_max_tool_call_depth(self.execution.max_tool_call_depth)
            .with_max_decomposition_retries(self.execution.max_decomposition_retries)
            .with_backend_timeout(Some(Duration::from_secs(self.backend.timeout_seconds)))
            .with_history_limit(self.execution.history_limit)
            .with_parallel_subtasks(self.execution.parallel_subtasks)
    }

    pub fn to_permission_filter(&self) -> PermissionFilter {
        self.governance.to_permission_filter()
    }

    /// Workspace root for file tools; the current directory when unset.
    pub fn workspace_root(&self) -> PathBuf {
        self.execution
            .workspace_root
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}
