//! Task decomposition use case.
//!
//! Asks the model to break a plan task into atomic subtasks, retrying with the
//! previous error appended to the prompt, and falling back to a single coder
//! subtask when every attempt fails.

use crate::config::ExecutionParams;
use crate::ports::chat_backend::ChatBackend;
use crate::use_cases::shared::chat_cancellable;
use crate::use_cases::tool_loop::InvocationError;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};
use ube_domain::{
    Completion, DecompositionPromptTemplate, DomainError, Message, SubtaskSpec, TaskDefinition,
    fallback_subtask, parse_subtasks,
};

pub struct TaskDecomposer {
    backend: Arc<dyn ChatBackend>,
    domain: String,
    max_retries: usize,
    timeout: Option<Duration>,
    cancellation_token: Option<CancellationToken>,
}

impl TaskDecomposer {
    pub fn new(backend: Arc<dyn ChatBackend>, domain: impl Into<String>) -> Self {
        let params = ExecutionParams::default();
        Self {
            backend,
            domain: domain.into(),
            max_retries: params.max_decomposition_retries,
            timeout: params.backend_timeout,
            cancellation_token: None,
        }
    }

    pub fn with_params(mut self, params: &ExecutionParams) -> Self {
        self.max_retries = params.max_decomposition_retries;
        self.timeout = params.backend_timeout;
        self
    }

    pub fn with_max_retries(mut self, retries: usize) -> Self {
        self.max_retries = retries;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = Some(token);
        self
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Break `task` down into subtasks.
    ///
    /// Each attempt is one backend call. Backend errors and unusable answers
    /// both count as failed attempts. Always returns at least one subtask;
    /// the only error is [`DomainError::Cancelled`].
    pub async fn break_down(&self, task: &TaskDefinition) -> Result<Vec<SubtaskSpec>, DomainError> {
        let system = DecompositionPromptTemplate::system(&self.domain);
        let mut prompt = DecompositionPromptTemplate::break_down(task, &self.domain);
        let mut last_error = String::new();

        for attempt in 1..=self.max_retries {
            let history = [Message::system(system.clone()), Message::user(prompt.clone())];
            let outcome = chat_cancellable(
                self.backend.as_ref(),
                &history,
                None,
                None,
                self.timeout,
                &self.cancellation_token,
            )
            .await;

            let failure = match outcome {
                Ok(Completion::Text { text }) => match parse_subtasks(&text, &task.task_id) {
                    Ok(subtasks) => {
                        debug!(task_id = %task.task_id, count = subtasks.len(), attempt, "Task decomposed");
                        return Ok(subtasks);
                    }
                    Err(e) => e.to_string(),
                },
                Ok(Completion::ToolCall { call }) => {
                    format!("expected a JSON array, got a call to '{}'", call.tool_name)
                }
                Err(InvocationError::Cancelled) => return Err(DomainError::Cancelled),
                Err(InvocationError::Backend(e)) => e.to_string(),
            };

            warn!(
                domain = %self.domain,
                task_id = %task.task_id,
                attempt,
                max_retries = self.max_retries,
                error = %failure,
                "Decomposition attempt failed"
            );
            prompt.push_str(&DecompositionPromptTemplate::retry_suffix(&failure));
            last_error = failure;
        }

        error!(
            domain = %self.domain,
            task_id = %task.task_id,
            error = %last_error,
            "All decomposition attempts failed, using fallback subtask"
        );
        Ok(vec![fallback_subtask(task)])
    }
}
