//! Governance policies applied around sensitive tool calls.

pub mod permission_filter;

pub use permission_filter::{PermissionDecision, PermissionDenial, PermissionFilter};
