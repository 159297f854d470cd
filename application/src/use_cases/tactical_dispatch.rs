//! Tactical dispatcher (TLB).
//!
//! Fans a domain handler's subtasks out to atomic executors and aggregates
//! their reports into a [`TacticalBatchResult`].

use crate::use_cases::executor::Executor;
use crate::use_cases::shared::is_cancelled;
use futures::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use ube_domain::{DomainError, ExecutorReport, SubtaskSpec, TacticalBatchResult};

/// Routes subtasks to executors by executor type.
pub struct TacticalDispatcher {
    executors: HashMap<String, Arc<dyn Executor>>,
    parallel: bool,
    cancellation_token: Option<CancellationToken>,
}

impl Default for TacticalDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl TacticalDispatcher {
    pub fn new() -> Self {
        Self {
            executors: HashMap::new(),
            parallel: false,
            cancellation_token: None,
        }
    }

    /// Register `executor` for `executor_type` (matched case-insensitively).
    pub fn with_executor(mut self, executor_type: &str, executor: Arc<dyn Executor>) -> Self {
        self.executors
            .insert(executor_type.trim().to_lowercase(), executor);
        self
    }

    /// Run a batch's subtasks concurrently. Reports keep input order either way.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = Some(token);
        self
    }

    pub fn executor_types(&self) -> impl Iterator<Item = &str> {
        self.executors.keys().map(String::as_str)
    }

    /// Execute every subtask and aggregate the reports.
    ///
    /// An empty batch is not an error. Returns [`DomainError::Cancelled`] when
    /// the token fires during the batch; partial reports are discarded.
    pub async fn execute_tasks(
        &self,
        tasks: &[SubtaskSpec],
    ) -> Result<TacticalBatchResult, DomainError> {
        if tasks.is_empty() {
            return Ok(TacticalBatchResult::empty());
        }

        let started = Instant::now();
        info!(count = tasks.len(), parallel = self.parallel, "Dispatching subtasks");

        let reports = if self.parallel {
            join_all(tasks.iter().map(|task| self.dispatch(task))).await
        } else {
            let mut reports = Vec::with_capacity(tasks.len());
            for task in tasks {
                if is_cancelled(&self.cancellation_token) {
                    return Err(DomainError::Cancelled);
                }
                reports.push(self.dispatch(task).await);
            }
            reports
        };

        if is_cancelled(&self.cancellation_token) {
            return Err(DomainError::Cancelled);
        }

        let batch =
            TacticalBatchResult::from_reports(reports, started.elapsed().as_millis() as u64);
        info!(
            total = batch.total_tasks,
            completed = batch.completed,
            failed = batch.failed,
            "Batch finished"
        );
        Ok(batch)
    }

    async fn dispatch(&self, task: &SubtaskSpec) -> ExecutorReport {
        let key = task.executor_type.trim().to_lowercase();
        match self.executors.get(&key) {
            Some(executor) => {
                debug!(task_id = %task.task_id, executor = executor.name(), "Routing subtask");
                executor.execute_task(task).await
            }
            None => {
                warn!(task_id = %task.task_id, executor_type = %task.executor_type, "Unknown executor type");
                ExecutorReport::failed(
                    &task.task_id,
                    &format!("{}Executor", task.executor_type),
                    format!("Unknown executor type: {}", task.executor_type),
                )
            }
        }
    }
}
