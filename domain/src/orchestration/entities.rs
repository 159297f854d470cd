//! Orchestration entities: plans, tasks, subtasks and executor reports.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::core::error::DomainError;

/// Open key/value map used for outputs and metadata.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// A single task within a strategic plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskDefinition {
    /// Unique within a plan
    pub task_id: String,
    /// Domain tag used to route to a domain handler (e.g. "Development")
    pub domain: String,
    pub description: String,
    /// Task ids this one depends on; advisory only, ordering is list order
    #[serde(default)]
    pub dependencies: Vec<String>,
    /// Handler name the planner had in mind, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
}

impl TaskDefinition {
    pub fn new(
        task_id: impl Into<String>,
        domain: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            task_id: task_id.into(),
            domain: domain.into(),
            description: description.into(),
            dependencies: Vec::new(),
            assigned_to: None,
        }
    }

    pub fn with_dependency(mut self, task_id: impl Into<String>) -> Self {
        self.dependencies.push(task_id.into());
        self
    }

    pub fn assigned_to(mut self, handler: impl Into<String>) -> Self {
        self.assigned_to = Some(handler.into());
        self
    }
}

/// An ordered set of domain-tagged tasks. Immutable once submitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategicPlan {
    pub plan_id: String,
    #[serde(default)]
    pub target_domains: BTreeSet<String>,
    pub tasks: Vec<TaskDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(default)]
    pub metadata: Metadata,
}

impl StrategicPlan {
    pub fn new(plan_id: impl Into<String>, tasks: Vec<TaskDefinition>) -> Self {
        let target_domains = tasks.iter().map(|t| t.domain.clone()).collect();
        Self {
            plan_id: plan_id.into(),
            target_domains,
            tasks,
            context: None,
            metadata: Metadata::new(),
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Parse a plan from JSON.
    ///
    /// `target_domains` defaults to the set of task domains when omitted.
    /// Domains without a handler are not rejected here; the router reports
    /// them at execution time.
    pub fn from_json(json: &str) -> Result<Self, DomainError> {
        let mut plan: StrategicPlan =
            serde_json::from_str(json).map_err(|e| DomainError::InvalidPlan(e.to_string()))?;
        if plan.plan_id.trim().is_empty() {
            return Err(DomainError::InvalidPlan("plan_id cannot be empty".to_string()));
        }
        if plan.target_domains.is_empty() {
            plan.target_domains = plan.tasks.iter().map(|t| t.domain.clone()).collect();
        }
        Ok(plan)
    }
}

/// The standard executor kinds a domain handler can delegate to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutorKind {
    Coder,
    Tester,
    Writer,
    Research,
}

impl ExecutorKind {
    pub const ALL: [ExecutorKind; 4] = [
        ExecutorKind::Coder,
        ExecutorKind::Tester,
        ExecutorKind::Writer,
        ExecutorKind::Research,
    ];

    /// Executor type tag used in subtask specs
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutorKind::Coder => "coder",
            ExecutorKind::Tester => "tester",
            ExecutorKind::Writer => "writer",
            ExecutorKind::Research => "research",
        }
    }

    /// Agent name reported in executor reports and used as caller identity
    pub fn executor_name(&self) -> &'static str {
        match self {
            ExecutorKind::Coder => "CoderExecutor",
            ExecutorKind::Tester => "TesterExecutor",
            ExecutorKind::Writer => "WriterExecutor",
            ExecutorKind::Research => "ResearchExecutor",
        }
    }
}

impl std::fmt::Display for ExecutorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ExecutorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ExecutorKind::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown executor type: {}", s))
    }
}

/// An atomic subtask produced by decomposition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtaskSpec {
    pub task_id: String,
    pub description: String,
    /// Executor type tag; may name an executor that is not registered
    pub executor_type: String,
}

impl SubtaskSpec {
    pub fn new(
        task_id: impl Into<String>,
        description: impl Into<String>,
        executor_type: impl Into<String>,
    ) -> Self {
        Self {
            task_id: task_id.into(),
            description: description.into(),
            executor_type: executor_type.into(),
        }
    }
}

/// Status of a unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReportStatus {
    Completed,
    Failed,
    Pending,
}

impl ReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Completed => "Completed",
            ReportStatus::Failed => "Failed",
            ReportStatus::Pending => "Pending",
        }
    }
}

impl std::fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Structured output of one executor run.
///
/// Created fresh per execution and never mutated once returned; the
/// constructors keep `error_message` present exactly when the status is
/// `Failed`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutorReport {
    pub task_id: String,
    pub executor_name: String,
    pub status: ReportStatus,
    #[serde(default)]
    pub outputs: Metadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_time_ms: Option<u64>,
    #[serde(default)]
    pub metadata: Metadata,
}

impl ExecutorReport {
    fn base(task_id: &str, executor_name: &str, status: ReportStatus) -> Self {
        Self {
            task_id: task_id.to_string(),
            executor_name: executor_name.to_string(),
            status,
            outputs: Metadata::new(),
            error_message: None,
            execution_time_ms: None,
            metadata: Metadata::new(),
        }
    }

    pub fn completed(task_id: &str, executor_name: &str, artifact: impl Into<String>) -> Self {
        let mut report = Self::base(task_id, executor_name, ReportStatus::Completed);
        report
            .outputs
            .insert("artifact".to_string(), serde_json::Value::String(artifact.into()));
        report
    }

    pub fn failed(task_id: &str, executor_name: &str, error: impl Into<String>) -> Self {
        let mut report = Self::base(task_id, executor_name, ReportStatus::Failed);
        report.error_message = Some(error.into());
        report
    }

    pub fn pending(task_id: &str, executor_name: &str) -> Self {
        Self::base(task_id, executor_name, ReportStatus::Pending)
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn with_execution_time(mut self, ms: u64) -> Self {
        self.execution_time_ms = Some(ms);
        self
    }

    pub fn artifact(&self) -> Option<&str> {
        self.outputs.get("artifact").and_then(|v| v.as_str())
    }

    pub fn is_completed(&self) -> bool {
        self.status == ReportStatus::Completed
    }
}
