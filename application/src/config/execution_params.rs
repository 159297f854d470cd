//! Execution parameters — use case loop control.
//!
//! [`ExecutionParams`] groups the static parameters that bound the
//! invocation loop, the decomposition retries and the tactical fan-out.
//! These are application-layer concerns, not domain policy.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Execution control parameters.
///
/// | Field | Used by |
/// |-------|---------|
/// | `max_tool_call_depth` | ToolInvocationLoop |
/// | `backend_timeout` | ToolInvocationLoop, TaskDecomposer |
/// | `history_limit` | ToolInvocationLoop::process |
/// | `max_decomposition_retries` | TaskDecomposer |
/// | `parallel_subtasks` | TacticalDispatcher |
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionParams {
    /// Maximum backend calls in one invocation loop turn.
    pub max_tool_call_depth: usize,
    /// Decomposition attempts before falling back to a single coder subtask.
    pub max_decomposition_retries: usize,
    /// Timeout for a single backend call; `None` waits indefinitely.
    pub backend_timeout: Option<Duration>,
    /// Prior messages loaded from the message store per turn.
    pub history_limit: usize,
    /// Run a batch's subtasks concurrently.
    pub parallel_subtasks: bool,
}

impl Default for ExecutionParams {
    fn default() -> Self {
        Self {
            max_tool_call_depth: 5,
            max_decomposition_retries: 3,
            backend_timeout: Some(Duration::from_secs(120)),
            history_limit: 50,
            parallel_subtasks: false,
        }
    }
}

impl ExecutionParams {
    // ==================== Builder Methods ====================

    pub fn with_max_tool_call_depth(mut self, depth: usize) -> Self {
        self.max_tool_call_depth = depth;
        self
    }

    pub fn with_max_decomposition_retries(mut self, retries: usize) -> Self {
        self.max_decomposition_retries = retries;
        self
    }

    pub fn with_backend_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.backend_timeout = timeout;
        self
    }

    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    pub fn with_parallel_subtasks(mut self, parallel: bool) -> Self {
        self.parallel_subtasks = parallel;
        self
    }
}
