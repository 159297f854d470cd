//! Logging infrastructure: structured audit trail.
//!
//! Provides two implementations of the [`AuditLog`](ube_application::AuditLog)
//! port:
//! - [`JsonlAuditLog`]: one JSON object per line, appended to a file
//! - [`TracingAuditLog`]: audit events forwarded to `tracing`

mod jsonl_audit;
mod tracing_audit;

pub use jsonl_audit::JsonlAuditLog;
pub use tracing_audit::TracingAuditLog;
