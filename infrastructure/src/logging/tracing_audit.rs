//! Audit events forwarded to `tracing` under the `ube::audit` target.

use tracing::info;
use ube_application::ports::audit_log::{AuditEvent, AuditLog};

/// Audit log that emits each event as an `info!` record. Used when no audit
/// file is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAuditLog;

impl AuditLog for TracingAuditLog {
    fn log(&self, event: AuditEvent) {
        info!(
            target: "ube::audit",
            agent = %event.agent_name,
            operation = event.operation,
            session_id = event.session_id.as_deref().unwrap_or("-"),
            details = %event.details,
            "audit"
        );
    }
}
