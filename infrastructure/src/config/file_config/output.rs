//! Audit and logging output configuration (`[audit]`, `[logging]` sections)

use serde::{Deserialize, Serialize};

/// ```toml
/// [audit]
/// jsonl_path = ".ube/audit.jsonl"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAuditConfig {
    /// Append audit events here; without it events go to `tracing`
    pub jsonl_path: Option<String>,
}

/// ```toml
/// [logging]
/// directory = ".ube/logs"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// Also write daily-rolling log files into this directory
    pub directory: Option<String>,
}
