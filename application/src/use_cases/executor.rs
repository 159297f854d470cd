//! Atomic executors.
//!
//! An executor turns one [`SubtaskSpec`] into one [`ExecutorReport`]. It has
//! no decision authority: unclear work comes back as an escalation, and every
//! error is folded into a `Failed` report instead of propagating.

use crate::use_cases::tool_loop::{InvocationError, ToolInvocationLoop};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Instant;
use tracing::{debug, info, warn};
use ube_domain::{ExecutorKind, ExecutorReport, SubtaskSpec, is_escalation};

/// Anything the tactical dispatcher can hand a subtask to.
#[async_trait]
pub trait Executor: Send + Sync {
    /// Name reported in every [`ExecutorReport`]
    fn name(&self) -> &str;

    /// Execute one subtask. Never fails: errors become `Failed` reports and
    /// cancellation becomes a `Pending` report with `cancelled: true`.
    async fn execute_task(&self, task: &SubtaskSpec) -> ExecutorReport;
}

/// Executor backed by a tool-invocation loop.
pub struct LoopExecutor {
    kind: ExecutorKind,
    agent: ToolInvocationLoop,
}

impl LoopExecutor {
    pub fn new(kind: ExecutorKind, agent: ToolInvocationLoop) -> Self {
        Self { kind, agent }
    }

    pub fn kind(&self) -> ExecutorKind {
        self.kind
    }
}

#[async_trait]
impl Executor for LoopExecutor {
    fn name(&self) -> &str {
        self.kind.executor_name()
    }

    async fn execute_task(&self, task: &SubtaskSpec) -> ExecutorReport {
        let started = Instant::now();
        debug!(executor = self.name(), task_id = %task.task_id, "Executing subtask");

        let report = match self.agent.process(&task.description).await {
            Ok(turn) if is_escalation(&turn.text) => {
                info!(executor = self.name(), task_id = %task.task_id, "Executor escalated");
                ExecutorReport::failed(&task.task_id, self.name(), turn.text)
                    .with_metadata("escalation", true)
            }
            Ok(turn) => ExecutorReport::completed(&task.task_id, self.name(), turn.text)
                .with_metadata("turn_outcome", turn.outcome.as_str()),
            Err(InvocationError::Cancelled) => {
                ExecutorReport::pending(&task.task_id, self.name()).with_metadata("cancelled", true)
            }
            Err(e) => {
                warn!(executor = self.name(), task_id = %task.task_id, error = %e, "Subtask failed");
                ExecutorReport::failed(
                    &task.task_id,
                    self.name(),
                    format!("Execution error: {}", e),
                )
            }
        };

        report
            .with_metadata("executor_type", self.kind.as_str())
            .with_execution_time(started.elapsed().as_millis() as u64)
    }
}

/// Decorator that caches completed artifacts by task description.
///
/// The cache belongs to this decorator alone; a repeated description is
/// answered without calling the inner executor.
pub struct CachingExecutor<E> {
    inner: E,
    cache: Mutex<HashMap<String, String>>,
}

impl<E: Executor> CachingExecutor<E> {
    pub fn new(inner: E) -> Self {
        Self {
            inner,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn clear_cache(&self) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.clear();
        }
    }

    pub fn cached_entries(&self) -> usize {
        self.cache.lock().map(|c| c.len()).unwrap_or(0)
    }

    fn lookup(&self, description: &str) -> Option<String> {
        self.cache.lock().ok()?.get(description).cloned()
    }
}

#[async_trait]
impl<E: Executor> Executor for CachingExecutor<E> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn execute_task(&self, task: &SubtaskSpec) -> ExecutorReport {
        if let Some(artifact) = self.lookup(&task.description) {
            debug!(executor = self.name(), task_id = %task.task_id, "Cache hit");
            return ExecutorReport::completed(&task.task_id, self.name(), artifact)
                .with_metadata("executor_type", task.executor_type.as_str())
                .with_metadata("cached", true)
                .with_execution_time(0);
        }

        let report = self.inner.execute_task(task).await;
        if report.is_completed()
            && let Some(artifact) = report.artifact()
            && let Ok(mut cache) = self.cache.lock()
        {
            cache.insert(task.description.clone(), artifact.to_string());
        }
        report
    }
}
