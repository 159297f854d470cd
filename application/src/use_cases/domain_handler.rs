//! Domain handler use case.
//!
//! A domain handler owns one domain: it decomposes each plan task and hands
//! the subtasks to the tactical dispatcher. It makes no retry decisions.

use crate::use_cases::decompose_task::TaskDecomposer;
use crate::use_cases::tactical_dispatch::TacticalDispatcher;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;
use ube_domain::{DecompositionPromptTemplate, DomainError, DomainTaskResult, TaskDefinition};

/// Anything the strategic router can route a plan task to.
#[async_trait]
pub trait DomainLead: Send + Sync {
    fn name(&self) -> &str;

    fn domain(&self) -> &str;

    /// Execute one plan task. `Err` is reserved for cancellation and
    /// failures that prevented the task from running at all.
    async fn execute_task(&self, task: &TaskDefinition) -> Result<DomainTaskResult, DomainError>;
}

/// Decompose-then-dispatch handler for one domain.
pub struct DomainHandler {
    name: String,
    decomposer: TaskDecomposer,
    dispatcher: Arc<TacticalDispatcher>,
}

impl DomainHandler {
    pub fn new(decomposer: TaskDecomposer, dispatcher: Arc<TacticalDispatcher>) -> Self {
        Self {
            name: DecompositionPromptTemplate::handler_name(decomposer.domain()),
            decomposer,
            dispatcher,
        }
    }
}

#[async_trait]
impl DomainLead for DomainHandler {
    fn name(&self) -> &str {
        &self.name
    }

    fn domain(&self) -> &str {
        self.decomposer.domain()
    }

    async fn execute_task(&self, task: &TaskDefinition) -> Result<DomainTaskResult, DomainError> {
        info!(handler = %self.name, task_id = %task.task_id, "Received task");

        let subtasks = self.decomposer.break_down(task).await?;
        info!(handler = %self.name, count = subtasks.len(), "Generated subtasks");

        let batch = self.dispatcher.execute_tasks(&subtasks).await?;
        Ok(DomainTaskResult::from_batch(task.task_id.clone(), batch))
    }
}
