//! Shared utilities for use cases.
//!
//! Cancellation checks and the cancellable, time-bounded backend call used by
//! both the invocation loop and the decomposer.

use crate::ports::chat_backend::{BackendError, ChatBackend};
use crate::use_cases::tool_loop::InvocationError;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use ube_domain::{Completion, Message, ToolChoice, ToolDefinition};

/// Check if cancellation has been requested.
///
/// Returns `Err(InvocationError::Cancelled)` if the token exists and is cancelled.
pub(crate) fn check_cancelled(token: &Option<CancellationToken>) -> Result<(), InvocationError> {
    if let Some(token) = token
        && token.is_cancelled()
    {
        return Err(InvocationError::Cancelled);
    }
    Ok(())
}

pub(crate) fn is_cancelled(token: &Option<CancellationToken>) -> bool {
    token.as_ref().is_some_and(CancellationToken::is_cancelled)
}

/// Call the backend with an optional timeout, racing cancellation.
///
/// A timeout surfaces as [`BackendError::Timeout`]; cancellation wins over an
/// in-flight request and drops it.
pub(crate) async fn chat_cancellable(
    backend: &dyn ChatBackend,
    history: &[Message],
    tools: Option<&[ToolDefinition]>,
    tool_choice: Option<&ToolChoice>,
    timeout: Option<Duration>,
    cancellation_token: &Option<CancellationToken>,
) -> Result<Completion, InvocationError> {
    check_cancelled(cancellation_token)?;

    let request = async {
        let call = backend.chat(history, tools, tool_choice);
        match timeout {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(outcome) => outcome,
                Err(_) => Err(BackendError::Timeout(limit)),
            },
            None => call.await,
        }
    };

    match cancellation_token {
        Some(token) => tokio::select! {
            biased;
            _ = token.cancelled() => Err(InvocationError::Cancelled),
            outcome = request => outcome.map_err(InvocationError::from),
        },
        None => request.await.map_err(InvocationError::from),
    }
}
