//! Execution configuration from TOML (`[execution]` section)

use serde::{Deserialize, Serialize};
use ube_application::ExecutionParams;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileExecutionConfig {
    /// Backend calls allowed in one tool-invocation turn
    pub max_tool_call_depth: usize,
    /// Decomposition attempts before the fallback subtask
    pub max_decomposition_retries: usize,
    /// Prior messages loaded per turn
    pub history_limit: usize,
    /// Run a batch's subtasks concurrently
    pub parallel_subtasks: bool,
    /// Workspace root for `write_file`; defaults to the current directory
    pub workspace_root: Option<String>,
}

impl Default for FileExecutionConfig {
    fn default() -> Self {
        let params = ExecutionParams::default();
        Self {
            max_tool_call_depth: params.max_tool_call_depth,
            max_decomposition_retries: params.max_decomposition_retries,
            history_limit: params.history_limit,
            parallel_subtasks: params.parallel_subtasks,
            workspace_root: None,
        }
    }
}
