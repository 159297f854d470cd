//! Tool value objects

use thiserror::Error;

use crate::governance::permission_filter::PermissionDenial;

/// Errors raised while resolving or executing a tool.
///
/// These are returned by the registry unchanged; turning them into
/// conversation text is the invocation loop's job.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ToolError {
    #[error("Tool '{0}' not found")]
    NotFound(String),

    #[error("Tool '{0}' is already registered")]
    AlreadyRegistered(String),

    #[error(
        "Permission denied: role '{caller_role}' may not call '{tool}' (allowed roles: {allowed})",
        allowed = .allowed.join(", ")
    )]
    PermissionDenied {
        tool: String,
        caller_role: String,
        allowed: Vec<String>,
    },

    #[error(transparent)]
    Governance(#[from] PermissionDenial),

    #[error("Invalid arguments for '{tool}': {message}")]
    InvalidArguments { tool: String, message: String },

    #[error("Tool '{tool}' failed: {message}")]
    ExecutionFailed { tool: String, message: String },
}

impl ToolError {
    pub fn execution_failed(tool: impl Into<String>, message: impl Into<String>) -> Self {
        ToolError::ExecutionFailed {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Whether the call was refused by a role gate or the permission filter.
    pub fn is_permission_denied(&self) -> bool {
        matches!(
            self,
            ToolError::PermissionDenied { .. } | ToolError::Governance(_)
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ToolError::NotFound(_))
    }
}
