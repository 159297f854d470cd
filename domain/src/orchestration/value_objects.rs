//! Aggregated results reported up the hierarchy.

use serde::{Deserialize, Serialize};

use super::entities::{ExecutorReport, ReportStatus, StrategicPlan};

/// Aggregate of one tactical dispatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TacticalBatchResult {
    pub total_tasks: usize,
    pub completed: usize,
    pub failed: usize,
    pub pending: usize,
    pub reports: Vec<ExecutorReport>,
    pub execution_time_ms: u64,
    /// completed / total, 0.0 for an empty batch
    pub success_rate: f64,
}

impl TacticalBatchResult {
    pub fn from_reports(reports: Vec<ExecutorReport>, execution_time_ms: u64) -> Self {
        let count = |status: ReportStatus| reports.iter().filter(|r| r.status == status).count();
        let completed = count(ReportStatus::Completed);
        let failed = count(ReportStatus::Failed);
        let pending = count(ReportStatus::Pending);
        let total_tasks = reports.len();
        let success_rate = if total_tasks == 0 {
            0.0
        } else {
            completed as f64 / total_tasks as f64
        };

        Self {
            total_tasks,
            completed,
            failed,
            pending,
            reports,
            execution_time_ms,
            success_rate,
        }
    }

    pub fn empty() -> Self {
        Self::from_reports(Vec::new(), 0)
    }

    /// First failed report, in dispatch order.
    pub fn first_failure(&self) -> Option<&ExecutorReport> {
        self.reports.iter().find(|r| r.status == ReportStatus::Failed)
    }
}

/// What a domain handler reports for one plan task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainTaskResult {
    pub task_id: String,
    pub status: ReportStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tlb_result: Option<TacticalBatchResult>,
    pub summary: String,
}

impl DomainTaskResult {
    /// Derive the handler result from its batch: completed iff nothing failed.
    pub fn from_batch(task_id: impl Into<String>, batch: TacticalBatchResult) -> Self {
        let success = batch.failed == 0;
        let summary = format!(
            "Executed {} subtasks. Success: {}",
            batch.total_tasks, success
        );
        Self {
            task_id: task_id.into(),
            status: if success {
                ReportStatus::Completed
            } else {
                ReportStatus::Failed
            },
            tlb_result: Some(batch),
            summary,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == ReportStatus::Completed
    }

    /// Human-readable reason for a failed result.
    pub fn failure_reason(&self) -> String {
        let first = self.tlb_result.as_ref().and_then(|b| b.first_failure());
        match first {
            Some(report) => format!(
                "Subtask {} ({}) failed: {}",
                report.task_id,
                report.executor_name,
                report.error_message.as_deref().unwrap_or("unknown error")
            ),
            None => self.summary.clone(),
        }
    }
}

/// A failed plan task, with enough detail to identify the cause.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedTaskDetail {
    pub task_id: String,
    pub domain: String,
    pub error: String,
    pub status: ReportStatus,
}

impl FailedTaskDetail {
    pub fn new(task_id: impl Into<String>, domain: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            domain: domain.into(),
            error: error.into(),
            status: ReportStatus::Failed,
        }
    }
}

/// Overall status of a plan execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlanStatus {
    Completed,
    Failed,
    Cancelled,
}

impl std::fmt::Display for PlanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PlanStatus::Completed => "Completed",
            PlanStatus::Failed => "Failed",
            PlanStatus::Cancelled => "Cancelled",
        };
        write!(f, "{}", s)
    }
}

/// Final report of a strategic plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanExecutionResult {
    pub plan_id: String,
    pub status: PlanStatus,
    pub total_tasks: usize,
    pub completed: usize,
    pub failed: usize,
    pub pending: usize,
    pub results: Vec<DomainTaskResult>,
    pub failed_details: Vec<FailedTaskDetail>,
    pub execution_time_ms: u64,
}

impl PlanExecutionResult {
    /// Aggregate handler results and failures for `plan`.
    ///
    /// Tasks that were neither completed nor failed count as pending. A
    /// cancelled run is never reported as completed.
    pub fn aggregate(
        plan: &StrategicPlan,
        results: Vec<DomainTaskResult>,
        failed_details: Vec<FailedTaskDetail>,
        execution_time_ms: u64,
        cancelled: bool,
    ) -> Self {
        let total_tasks = plan.tasks.len();
        let completed = results.iter().filter(|r| r.is_completed()).count();
        let failed = failed_details.len();
        let pending = total_tasks.saturating_sub(completed + failed);

        let status = if cancelled {
            PlanStatus::Cancelled
        } else if failed == 0 && pending == 0 {
            PlanStatus::Completed
        } else {
            PlanStatus::Failed
        };

        Self {
            plan_id: plan.plan_id.clone(),
            status,
            total_tasks,
            completed,
            failed,
            pending,
            results,
            failed_details,
            execution_time_ms,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == PlanStatus::Completed
    }

    pub fn first_failure(&self) -> Option<&FailedTaskDetail> {
        self.failed_details.first()
    }
}
