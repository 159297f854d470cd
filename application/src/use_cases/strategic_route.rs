//! Strategic router (OLB).
//!
//! Routes each plan task, in list order, to the handler for its domain and
//! aggregates the outcome into a [`PlanExecutionResult`]. The router is the
//! only level that halts a pipeline: the first task whose handler does not
//! complete stops the plan, and later tasks stay pending.

use crate::use_cases::domain_handler::DomainLead;
use crate::use_cases::shared::is_cancelled;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use ube_domain::{DomainError, FailedTaskDetail, PlanExecutionResult, StrategicPlan};

pub struct StrategicRouter {
    handlers: HashMap<String, Arc<dyn DomainLead>>,
    cancellation_token: Option<CancellationToken>,
}

impl Default for StrategicRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl StrategicRouter {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
            cancellation_token: None,
        }
    }

    /// Register `handler` under its own domain name.
    pub fn with_handler(mut self, handler: Arc<dyn DomainLead>) -> Self {
        self.handlers.insert(handler.domain().to_string(), handler);
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = Some(token);
        self
    }

    pub fn domains(&self) -> Vec<&str> {
        let mut domains: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        domains.sort_unstable();
        domains
    }

    /// Execute `plan` task by task.
    ///
    /// `dependencies` are not consulted; list order is execution order. A
    /// task whose domain has no handler is recorded as failed and skipped.
    pub async fn execute_plan(&self, plan: &StrategicPlan) -> PlanExecutionResult {
        let started = Instant::now();
        info!(plan_id = %plan.plan_id, tasks = plan.tasks.len(), "Executing plan");

        let mut results = Vec::new();
        let mut failed = Vec::new();
        let mut cancelled = false;

        for task in &plan.tasks {
            if is_cancelled(&self.cancellation_token) {
                cancelled = true;
                break;
            }

            let Some(handler) = self.handlers.get(&task.domain) else {
                error!(task_id = %task.task_id, domain = %task.domain, "No Domain Lead found for domain");
                failed.push(FailedTaskDetail::new(
                    task.task_id.clone(),
                    task.domain.clone(),
                    format!("No Domain Lead found for domain: {}", task.domain),
                ));
                continue;
            };

            info!(task_id = %task.task_id, handler = handler.name(), "Routing task");
            match handler.execute_task(task).await {
                Ok(result) if result.is_completed() => results.push(result),
                Ok(result) => {
                    warn!(task_id = %task.task_id, "Task failed. Stopping plan execution.");
                    failed.push(FailedTaskDetail::new(
                        task.task_id.clone(),
                        task.domain.clone(),
                        result.failure_reason(),
                    ));
                    results.push(result);
                    break;
                }
                Err(DomainError::Cancelled) => {
                    cancelled = true;
                    break;
                }
                Err(e) => {
                    error!(task_id = %task.task_id, error = %e, "Error executing task");
                    failed.push(FailedTaskDetail::new(
                        task.task_id.clone(),
                        task.domain.clone(),
                        format!("Error executing task {}: {}", task.task_id, e),
                    ));
                    break;
                }
            }
        }

        if cancelled {
            warn!(plan_id = %plan.plan_id, "Plan cancelled");
        }

        let result = PlanExecutionResult::aggregate(
            plan,
            results,
            failed,
            started.elapsed().as_millis() as u64,
            cancelled,
        );
        info!(
            plan_id = %result.plan_id,
            status = %result.status,
            completed = result.completed,
            failed = result.failed,
            pending = result.pending,
            "Plan finished"
        );
        result
    }
}
