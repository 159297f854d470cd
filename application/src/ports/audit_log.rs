//! Port for the structured audit trail.
//!
//! Separate from `tracing`: tracing carries human-readable diagnostics, while
//! this port records who asked for which tool and what came back, in a form
//! that can be replayed or shipped elsewhere.

use serde_json::Value;

/// A tool call was requested by the model
pub const TOOL_CALL_REQUEST: &str = "TOOL_CALL_REQUEST";
/// A tool call produced a result (or a synthetic error result)
pub const TOOL_CALL_RESULT: &str = "TOOL_CALL_RESULT";
/// The agent produced its final answer for the turn
pub const FINAL_RESPONSE: &str = "FINAL_RESPONSE";

/// One audit record.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditEvent {
    pub agent_name: String,
    pub operation: &'static str,
    pub details: Value,
    pub session_id: Option<String>,
}

impl AuditEvent {
    pub fn new(agent_name: impl Into<String>, operation: &'static str, details: Value) -> Self {
        Self {
            agent_name: agent_name.into(),
            operation,
            details,
            session_id: None,
        }
    }

    pub fn with_session(mut self, session_id: Option<&str>) -> Self {
        self.session_id = session_id.map(str::to_string);
        self
    }
}

/// Port for writing audit events.
///
/// `log` is synchronous and non-fallible: an audit failure must never disturb
/// the turn that produced the event.
pub trait AuditLog: Send + Sync {
    fn log(&self, event: AuditEvent);
}

/// No-op implementation for tests and when auditing is disabled.
pub struct NoAuditLog;

impl AuditLog for NoAuditLog {
    fn log(&self, _event: AuditEvent) {}
}
