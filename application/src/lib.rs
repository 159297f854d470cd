//! Application layer for ube
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use config::ExecutionParams;
pub use ports::{
    audit_log::{AuditEvent, AuditLog, NoAuditLog},
    chat_backend::{BackendError, ChatBackend},
    message_store::{MessageStore, StoreError},
    tool_executor::{ToolBody, ToolExecutorPort, ToolFuture},
    tool_schema::ToolSchemaPort,
};
pub use use_cases::decompose_task::TaskDecomposer;
pub use use_cases::domain_handler::{DomainHandler, DomainLead};
pub use use_cases::executor::{CachingExecutor, Executor, LoopExecutor};
pub use use_cases::hierarchy::{EXECUTOR_ROLE, HierarchyBuilder, STANDARD_DOMAINS};
pub use use_cases::strategic_route::StrategicRouter;
pub use use_cases::tactical_dispatch::TacticalDispatcher;
pub use use_cases::tool_loop::{
    InvocationError, MAX_DEPTH_SENTINEL, ToolInvocationLoop, TurnOutcome, TurnOutput,
};
