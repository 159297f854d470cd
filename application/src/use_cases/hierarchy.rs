//! Composition of the full router → handler → dispatcher → executor hierarchy.

use crate::config::ExecutionParams;
use crate::ports::audit_log::{AuditLog, NoAuditLog};
use crate::ports::chat_backend::ChatBackend;
use crate::ports::tool_executor::ToolExecutorPort;
use crate::use_cases::decompose_task::TaskDecomposer;
use crate::use_cases::domain_handler::DomainHandler;
use crate::use_cases::executor::{CachingExecutor, Executor, LoopExecutor};
use crate::use_cases::strategic_route::StrategicRouter;
use crate::use_cases::tactical_dispatch::TacticalDispatcher;
use crate::use_cases::tool_loop::ToolInvocationLoop;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use ube_domain::{Caller, ExecutorKind, ExecutorPromptTemplate};

/// Domains with a handler unless configured otherwise.
pub const STANDARD_DOMAINS: [&str; 3] = ["Development", "QA", "Documentation"];

/// Role every executor acts under when calling tools.
pub const EXECUTOR_ROLE: &str = "Executor";

/// Builds a [`StrategicRouter`] with one handler per domain, all sharing one
/// tactical dispatcher with an executor per [`ExecutorKind`].
pub struct HierarchyBuilder {
    backend: Arc<dyn ChatBackend>,
    tools: Arc<dyn ToolExecutorPort>,
    params: ExecutionParams,
    audit_log: Arc<dyn AuditLog>,
    domains: Vec<String>,
    cancellation_token: Option<CancellationToken>,
}

impl HierarchyBuilder {
    pub fn new(backend: Arc<dyn ChatBackend>, tools: Arc<dyn ToolExecutorPort>) -> Self {
        Self {
            backend,
            tools,
            params: ExecutionParams::default(),
            audit_log: Arc::new(NoAuditLog),
            domains: STANDARD_DOMAINS.iter().map(|d| d.to_string()).collect(),
            cancellation_token: None,
        }
    }

    pub fn with_params(mut self, params: ExecutionParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_audit_log(mut self, audit_log: Arc<dyn AuditLog>) -> Self {
        self.audit_log = audit_log;
        self
    }

    pub fn with_domains<I, S>(mut self, domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.domains = domains.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = Some(token);
        self
    }

    fn executor_loop(&self, kind: ExecutorKind) -> ToolInvocationLoop {
        let caller = Caller::new(kind.executor_name(), EXECUTOR_ROLE);
        let agent = ToolInvocationLoop::new(self.backend.clone(), self.tools.clone(), caller)
            .with_system_prompt(ExecutorPromptTemplate::instructions(kind))
            .with_audit_log(self.audit_log.clone())
            .with_params(&self.params);
        match &self.cancellation_token {
            Some(token) => agent.with_cancellation(token.clone()),
            None => agent,
        }
    }

    /// The dispatcher with every standard executor registered. Research
    /// answers are cached by description.
    pub fn build_dispatcher(&self) -> TacticalDispatcher {
        let mut dispatcher = TacticalDispatcher::new().with_parallel(self.params.parallel_subtasks);
        if let Some(token) = &self.cancellation_token {
            dispatcher = dispatcher.with_cancellation(token.clone());
        }

        for kind in ExecutorKind::ALL {
            let executor = LoopExecutor::new(kind, self.executor_loop(kind));
            let executor: Arc<dyn Executor> = match kind {
                ExecutorKind::Research => Arc::new(CachingExecutor::new(executor)),
                _ => Arc::new(executor),
            };
            dispatcher = dispatcher.with_executor(kind.as_str(), executor);
        }
        dispatcher
    }

    pub fn build(self) -> StrategicRouter {
        let dispatcher = Arc::new(self.build_dispatcher());
        let mut router = StrategicRouter::new();
        if let Some(token) = &self.cancellation_token {
            router = router.with_cancellation(token.clone());
        }

        for domain in &self.domains {
            let mut decomposer =
                TaskDecomposer::new(self.backend.clone(), domain.clone()).with_params(&self.params);
            if let Some(token) = &self.cancellation_token {
                decomposer = decomposer.with_cancellation(token.clone());
            }
            router = router.with_handler(Arc::new(DomainHandler::new(decomposer, dispatcher.clone())));
        }
        router
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{RecordingTools, ScriptedBackend, text};
    use ube_domain::{PlanStatus, ReportStatus, Role, StrategicPlan, TaskDefinition};

    #[test]
    fn test_builds_standard_domains_and_executors() {
        let backend = Arc::new(ScriptedBackend::texts(&[]));
        let tools = Arc::new(RecordingTools::new(&[]));
        let builder = HierarchyBuilder::new(backend, tools);

        let mut types: Vec<String> = builder
            .build_dispatcher()
            .executor_types()
            .map(str::to_string)
            .collect();
        types.sort();
        assert_eq!(types, vec!["coder", "research", "tester", "writer"]);

        let router = builder.build();
        assert_eq!(router.domains(), vec!["Development", "Documentation", "QA"]);
    }

    #[tokio::test]
    async fn test_development_plan_end_to_end() {
        let backend = Arc::new(ScriptedBackend::new(vec![
            text(
                r#"[{"description": "Write add(a, b)", "executor_type": "coder", "task_id": "t1_sub1"},
                    {"description": "Write a test for add", "executor_type": "tester", "task_id": "t1_sub2"}]"#,
            ),
            text("fn add(a: i32, b: i32) -> i32 { a + b }"),
            text("#[test] fn adds() { assert_eq!(add(1, 2), 3); }"),
        ]));
        let tools = Arc::new(RecordingTools::new(&[]));
        let router = HierarchyBuilder::new(backend.clone(), tools).build();

        let plan = StrategicPlan::new(
            "plan_001",
            vec![TaskDefinition::new("t1", "Development", "Create add(a,b) with a test")],
        );
        let result = router.execute_plan(&plan).await;

        assert_eq!(result.status, PlanStatus::Completed);
        assert_eq!((result.completed, result.failed, result.pending), (1, 0, 0));

        let batch = result.results[0].tlb_result.as_ref().unwrap();
        assert_eq!(batch.reports.len(), 2);
        assert_eq!(batch.reports[0].executor_name, "CoderExecutor");
        assert_eq!(batch.reports[1].executor_name, "TesterExecutor");
        assert!(batch.reports.iter().all(|r| r.status == ReportStatus::Completed));

        // executors run with their own instructions
        let calls = backend.calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[1].history[0].role, Role::System);
        assert!(calls[1].history[0].content_str().contains("CoderExecutor"));
        assert_eq!(calls[2].history[1].content_str(), "Write a test for add");
    }
}
