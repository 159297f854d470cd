//! Domain layer for ube
//!
//! This crate contains the core entities, value objects and pure policies of
//! the hierarchical orchestration engine. It has no dependencies on
//! infrastructure, async runtimes or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Hierarchy
//!
//! ```text
//! StrategicPlan ──▶ Strategic Router (OLB)
//!                     │  one TaskDefinition per domain lead
//!                     ▼
//!                   Domain Handler ──▶ Task Decomposer (SubtaskSpec list)
//!                     │
//!                     ▼
//!                   Tactical Dispatcher (TLB)
//!                     │  one SubtaskSpec per executor
//!                     ▼
//!                   Atomic Executor ──▶ Tool-Invocation Loop ──▶ Tools
//! ```
//!
//! Data flows downward; reports ([`ExecutorReport`], [`TacticalBatchResult`],
//! [`DomainTaskResult`], [`PlanExecutionResult`]) flow upward.
//!
//! ## Governance
//!
//! Tools carry an allow-list of caller roles, and file-mutation operations are
//! additionally gated by the [`PermissionFilter`] keyed on caller identity.

pub mod agent;
pub mod core;
pub mod governance;
pub mod orchestration;
pub mod prompt;
pub mod session;
pub mod tool;

// Re-export commonly used types
pub use agent::tool_strategy::{
    ESCALATION_MARKER, forced_tool, is_conversational_prompt, is_escalation,
};
pub use core::error::DomainError;
pub use governance::permission_filter::{PermissionDecision, PermissionDenial, PermissionFilter};
pub use orchestration::{
    decomposition::{DecompositionError, fallback_subtask, parse_subtasks, strip_code_fences},
    entities::{
        ExecutorKind, ExecutorReport, ReportStatus, StrategicPlan, SubtaskSpec, TaskDefinition,
    },
    value_objects::{
        DomainTaskResult, FailedTaskDetail, PlanExecutionResult, PlanStatus, TacticalBatchResult,
    },
};
pub use prompt::{DecompositionPromptTemplate, ExecutorPromptTemplate};
pub use session::{
    entities::{Message, Role},
    response::{Completion, ToolChoice},
};
pub use tool::{
    entities::{
        CALLER_ROLE_PARAM, Caller, ExportFormat, ParamDecl, ParamType, ToolArgs, ToolCall,
        ToolDefinition, ToolParameter,
    },
    value_objects::ToolError,
};
