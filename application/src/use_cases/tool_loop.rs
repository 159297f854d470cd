//! Tool-invocation loop use case.
//!
//! Drives one agent turn: send the history to the backend, execute any tool
//! call it asks for, feed the result back, and stop at the first plain-text
//! answer or after `max_tool_call_depth` backend calls.

use crate::config::ExecutionParams;
use crate::ports::audit_log::{
    AuditEvent, AuditLog, FINAL_RESPONSE, NoAuditLog, TOOL_CALL_REQUEST, TOOL_CALL_RESULT,
};
use crate::ports::chat_backend::{BackendError, ChatBackend};
use crate::ports::message_store::MessageStore;
use crate::ports::tool_executor::ToolExecutorPort;
use crate::use_cases::shared::{chat_cancellable, check_cancelled};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use ube_domain::session::entities::latest_user_text;
use ube_domain::{
    Caller, Completion, Message, Role, ToolCall, ToolChoice, ToolDefinition, ToolError,
    forced_tool, is_conversational_prompt,
};

/// Returned when the depth bound is hit without a final answer.
pub const MAX_DEPTH_SENTINEL: &str = "Max tool call depth reached.";

/// Audit details keep at most this many characters of a tool result.
const RESULT_PREVIEW_CHARS: usize = 100;

/// Errors that escape the loop. Everything else becomes final text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvocationError {
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("Operation cancelled")]
    Cancelled,
}

impl InvocationError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, InvocationError::Cancelled)
    }
}

/// How a turn ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The model answered with text
    Answer,
    /// A tool failed; the text is the diagnostic
    ToolFailure,
    /// The backend answer could not be decoded; the text is the diagnostic
    Malformed,
    /// The depth bound was hit; the text is [`MAX_DEPTH_SENTINEL`]
    DepthExhausted,
}

impl TurnOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            TurnOutcome::Answer => "answer",
            TurnOutcome::ToolFailure => "tool_failure",
            TurnOutcome::Malformed => "malformed",
            TurnOutcome::DepthExhausted => "depth_exhausted",
        }
    }
}

/// Result of one turn: the final text and the history as it ended.
#[derive(Debug, Clone)]
pub struct TurnOutput {
    pub text: String,
    pub outcome: TurnOutcome,
    pub history: Vec<Message>,
}

impl TurnOutput {
    fn new(text: impl Into<String>, outcome: TurnOutcome, history: Vec<Message>) -> Self {
        Self {
            text: text.into(),
            outcome,
            history,
        }
    }
}

/// The bounded tool-invocation loop for one agent.
pub struct ToolInvocationLoop {
    backend: Arc<dyn ChatBackend>,
    tools: Arc<dyn ToolExecutorPort>,
    caller: Caller,
    system_prompt: Option<String>,
    audit_log: Arc<dyn AuditLog>,
    message_store: Option<Arc<dyn MessageStore>>,
    max_depth: usize,
    history_limit: usize,
    timeout: Option<Duration>,
    cancellation_token: Option<CancellationToken>,
}

impl ToolInvocationLoop {
    pub fn new(
        backend: Arc<dyn ChatBackend>,
        tools: Arc<dyn ToolExecutorPort>,
        caller: Caller,
    ) -> Self {
        let params = ExecutionParams::default();
        Self {
            backend,
            tools,
            caller,
            system_prompt: None,
            audit_log: Arc::new(NoAuditLog),
            message_store: None,
            max_depth: params.max_tool_call_depth,
            history_limit: params.history_limit,
            timeout: params.backend_timeout,
            cancellation_token: None,
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn with_audit_log(mut self, audit_log: Arc<dyn AuditLog>) -> Self {
        self.audit_log = audit_log;
        self
    }

    pub fn with_message_store(mut self, store: Arc<dyn MessageStore>) -> Self {
        self.message_store = Some(store);
        self
    }

    /// Apply depth, history limit and timeout from `params`.
    pub fn with_params(mut self, params: &ExecutionParams) -> Self {
        self.max_depth = params.max_tool_call_depth;
        self.history_limit = params.history_limit;
        self.timeout = params.backend_timeout;
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = Some(token);
        self
    }

    pub fn caller(&self) -> &Caller {
        &self.caller
    }

    fn session_id(&self) -> Option<&str> {
        self.message_store.as_ref().map(|s| s.session_id())
    }

    fn audit(&self, operation: &'static str, details: Value) {
        self.audit_log.log(
            AuditEvent::new(self.caller.name.clone(), operation, details)
                .with_session(self.session_id()),
        );
    }

    /// Run one turn over `prompt`, using and updating the message store.
    ///
    /// Store failures are logged and never abort the turn. Only a plain-text
    /// answer is persisted as the assistant's reply.
    pub async fn process(&self, prompt: &str) -> Result<TurnOutput, InvocationError> {
        let mut history = Vec::new();
        if let Some(system) = &self.system_prompt {
            history.push(Message::system(system.clone()));
        }

        if let Some(store) = &self.message_store {
            match store.get_history(self.history_limit).await {
                Ok(prior) => history.extend(prior),
                Err(e) => warn!(agent = %self.caller.name, error = %e, "Failed to load history"),
            }
            if let Err(e) = store.store_message(Role::User, prompt).await {
                warn!(agent = %self.caller.name, error = %e, "Failed to store user message");
            }
        }
        history.push(Message::user(prompt));

        let output = self.run(history).await?;

        if output.outcome == TurnOutcome::Answer
            && let Some(store) = &self.message_store
            && let Err(e) = store.store_message(Role::Assistant, &output.text).await
        {
            warn!(agent = %self.caller.name, error = %e, "Failed to store assistant message");
        }

        Ok(output)
    }

    /// Run the loop over an initial history.
    ///
    /// Tool strategy is decided once from the latest user message: greeting
    /// input hides tools, and a tool named verbatim in the input is forced on
    /// the first call only.
    pub async fn run(&self, initial_history: Vec<Message>) -> Result<TurnOutput, InvocationError> {
        let mut history = initial_history;
        let definitions = self.tools.definitions();
        let prompt = latest_user_text(&history).unwrap_or_default().to_string();

        let active_tools: Option<&[ToolDefinition]> =
            if definitions.is_empty() || is_conversational_prompt(&prompt) {
                debug!(agent = %self.caller.name, "Tools hidden for this turn");
                None
            } else {
                Some(definitions.as_slice())
            };

        let mut tool_choice = active_tools.map(|tools| {
            match forced_tool(&prompt, tools.iter().map(|d| d.name.as_str())) {
                Some(name) => {
                    info!(agent = %self.caller.name, tool = name, "Forcing requested tool");
                    ToolChoice::Force(name.to_string())
                }
                None => ToolChoice::Auto,
            }
        });

        for depth in 0..self.max_depth {
            let completion = chat_cancellable(
                self.backend.as_ref(),
                &history,
                active_tools,
                tool_choice.as_ref(),
                self.timeout,
                &self.cancellation_token,
            )
            .await;

            let call = match completion {
                Ok(Completion::Text { text }) => {
                    history.push(Message::assistant(text.clone()));
                    self.audit(FINAL_RESPONSE, json!({ "response": text }));
                    return Ok(TurnOutput::new(text, TurnOutcome::Answer, history));
                }
                Ok(Completion::ToolCall { call }) => call,
                Err(InvocationError::Backend(BackendError::MalformedCompletion(message))) => {
                    warn!(agent = %self.caller.name, %message, "Malformed completion");
                    let text = format!("Malformed completion: {}", message);
                    return Ok(TurnOutput::new(text, TurnOutcome::Malformed, history));
                }
                Err(e) => return Err(e),
            };

            debug!(agent = %self.caller.name, depth, tool = %call.tool_name, "Tool call requested");
            history.push(Message::assistant_tool_call(call.clone()));

            match self.execute_call(&call).await? {
                Ok(result) => history.push(Message::tool_result(call.id.clone(), result)),
                Err(diagnostic) => {
                    return Ok(TurnOutput::new(diagnostic, TurnOutcome::ToolFailure, history));
                }
            }

            tool_choice = active_tools.map(|_| ToolChoice::Auto);
        }

        warn!(agent = %self.caller.name, max_depth = self.max_depth, "Max tool call depth reached");
        Ok(TurnOutput::new(
            MAX_DEPTH_SENTINEL,
            TurnOutcome::DepthExhausted,
            history,
        ))
    }

    /// Execute one call. The inner `Err` is the diagnostic that ends the turn.
    async fn execute_call(
        &self,
        call: &ToolCall,
    ) -> Result<Result<String, String>, InvocationError> {
        self.audit(
            TOOL_CALL_REQUEST,
            json!({ "tool": call.tool_name, "arguments": call.arguments_json() }),
        );

        let outcome = self
            .tools
            .execute(&call.tool_name, &self.caller, call.arguments.clone())
            .await;

        // The tool ran to completion; drop its result if we were cancelled meanwhile.
        if let Err(cancelled) = check_cancelled(&self.cancellation_token) {
            info!(agent = %self.caller.name, tool = %call.tool_name, "Cancelled, discarding tool result");
            self.audit(
                TOOL_CALL_RESULT,
                json!({ "tool": call.tool_name, "call_id": call.id, "discarded": true }),
            );
            return Err(cancelled);
        }

        let content = match outcome {
            Ok(value) => stringify(value),
            Err(ToolError::NotFound(name)) => format!("Error: Tool '{}' not found.", name),
            Err(e) => {
                let diagnostic = format!("Tool execution failed: {}", e);
                warn!(agent = %self.caller.name, tool = %call.tool_name, error = %e, "Tool execution failed");
                self.audit(
                    TOOL_CALL_RESULT,
                    json!({ "tool": call.tool_name, "call_id": call.id, "error": e.to_string() }),
                );
                return Ok(Err(diagnostic));
            }
        };

        let preview: String = content.chars().take(RESULT_PREVIEW_CHARS).collect();
        self.audit(
            TOOL_CALL_RESULT,
            json!({ "tool": call.tool_name, "call_id": call.id, "result": preview }),
        );
        Ok(Ok(content))
    }
}

fn stringify(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::message_store::StoreError;
    use crate::testing::{
        RecordingAudit, RecordingTools, ScriptedBackend, Step, failure, text, tool_call,
    };
    use async_trait::async_trait;
    use std::sync::Mutex;

    fn caller() -> Caller {
        Caller::new("CoderExecutor", "Executor")
    }

    fn agent(backend: Arc<ScriptedBackend>, tools: Arc<RecordingTools>) -> ToolInvocationLoop {
        ToolInvocationLoop::new(backend, tools, caller())
    }

    #[tokio::test]
    async fn test_plain_text_is_returned_immediately() {
        let backend = Arc::new(ScriptedBackend::texts(&["fn add() {}"]));
        let tools = Arc::new(RecordingTools::new(&["get_context"]));

        let output = agent(backend.clone(), tools.clone())
            .process("Write add")
            .await
            .unwrap();

        assert_eq!(output.text, "fn add() {}");
        assert_eq!(output.outcome, TurnOutcome::Answer);
        assert_eq!(backend.call_count(), 1);
        assert!(tools.calls().is_empty());
        assert_eq!(output.history.last().unwrap().role, Role::Assistant);
    }

    #[tokio::test]
    async fn test_tool_call_then_answer_keeps_ordering_and_ids() {
        let backend = Arc::new(ScriptedBackend::new(vec![
            tool_call("call_1", "get_context", json!({"key": "goal"})),
            text("The goal is shipping"),
        ]));
        let tools = Arc::new(
            RecordingTools::new(&["get_context"]).with_result("get_context", Ok(json!("shipping"))),
        );

        let output = agent(backend.clone(), tools.clone())
            .run(vec![Message::user("What is the goal?")])
            .await
            .unwrap();

        assert_eq!(output.text, "The goal is shipping");
        let roles: Vec<Role> = output.history.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![Role::User, Role::Assistant, Role::Tool, Role::Assistant]
        );
        assert!(output.history[1].is_tool_call());
        assert_eq!(output.history[1].tool_calls[0].id, "call_1");
        assert_eq!(output.history[2].tool_call_id.as_deref(), Some("call_1"));
        assert_eq!(output.history[2].content_str(), "shipping");

        let calls = tools.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1, caller());
        assert_eq!(calls[0].2.get("key"), Some(&json!("goal")));

        // second backend call saw the tool result
        let recorded = backend.calls();
        assert_eq!(recorded[1].history.len(), 3);
    }

    #[tokio::test]
    async fn test_depth_bound_returns_sentinel_after_exactly_n_calls() {
        let steps = (0..10)
            .map(|i| tool_call(&format!("c{}", i), "get_context", json!({})))
            .collect();
        let backend = Arc::new(ScriptedBackend::new(steps));
        let tools = Arc::new(RecordingTools::new(&["get_context"]));

        let output = agent(backend.clone(), tools.clone())
            .with_max_depth(3)
            .run(vec![Message::user("loop forever")])
            .await
            .unwrap();

        assert_eq!(output.text, MAX_DEPTH_SENTINEL);
        assert_eq!(output.outcome, TurnOutcome::DepthExhausted);
        assert_eq!(backend.call_count(), 3);
        assert_eq!(tools.calls().len(), 3);
    }

    #[tokio::test]
    async fn test_greeting_hides_tools() {
        let backend = Arc::new(ScriptedBackend::texts(&["Hello!"]));
        let tools = Arc::new(RecordingTools::new(&["get_context"]));

        agent(backend.clone(), tools)
            .run(vec![Message::user("hi there")])
            .await
            .unwrap();

        let recorded = backend.calls();
        assert!(recorded[0].tool_names.is_none());
        assert!(recorded[0].tool_choice.is_none());
    }

    #[tokio::test]
    async fn test_named_tool_is_forced_then_reset_to_auto() {
        let backend = Arc::new(ScriptedBackend::new(vec![
            tool_call("c1", "get_context", json!({})),
            text("done"),
        ]));
        let tools = Arc::new(RecordingTools::new(&["add_context", "get_context"]));

        agent(backend.clone(), tools)
            .run(vec![Message::user("please call get_context now")])
            .await
            .unwrap();

        let recorded = backend.calls();
        assert_eq!(
            recorded[0].tool_choice,
            Some(ToolChoice::Force("get_context".to_string()))
        );
        assert_eq!(recorded[1].tool_choice, Some(ToolChoice::Auto));
        assert_eq!(
            recorded[0].tool_names.as_deref(),
            Some(&["add_context".to_string(), "get_context".to_string()][..])
        );
    }

    #[tokio::test]
    async fn test_unknown_tool_is_fed_back_and_loop_continues() {
        let backend = Arc::new(ScriptedBackend::new(vec![
            tool_call("c1", "launch_rockets", json!({})),
            text("Sorry, no such tool"),
        ]));
        let tools = Arc::new(RecordingTools::new(&["get_context"]));

        let output = agent(backend.clone(), tools)
            .run(vec![Message::user("do it")])
            .await
            .unwrap();

        assert_eq!(output.text, "Sorry, no such tool");
        assert_eq!(
            output.history[2].content_str(),
            "Error: Tool 'launch_rockets' not found."
        );
        assert_eq!(backend.call_count(), 2);
    }

    #[tokio::test]
    async fn test_permission_denied_becomes_final_text() {
        let denied = ToolError::PermissionDenied {
            tool: "write_file".to_string(),
            caller_role: "Executor".to_string(),
            allowed: vec!["Lead".to_string()],
        };
        let backend = Arc::new(ScriptedBackend::new(vec![
            tool_call("c1", "write_file", json!({})),
            text("unreachable"),
        ]));
        let tools = Arc::new(RecordingTools::new(&["write_file"]).with_result("write_file", Err(denied)));

        let output = agent(backend.clone(), tools)
            .run(vec![Message::user("save it")])
            .await
            .unwrap();

        assert!(output.text.starts_with("Tool execution failed:"));
        assert_eq!(output.outcome, TurnOutcome::ToolFailure);
        assert_eq!(backend.call_count(), 1);
    }

    #[tokio::test]
    async fn test_malformed_completion_is_final_text() {
        let backend = Arc::new(ScriptedBackend::new(vec![failure(
            BackendError::MalformedCompletion("no choices".to_string()),
        )]));
        let tools = Arc::new(RecordingTools::new(&[]));

        let output = agent(backend, tools).run(vec![Message::user("x")]).await.unwrap();
        assert_eq!(output.text, "Malformed completion: no choices");
        assert_eq!(output.outcome, TurnOutcome::Malformed);
    }

    #[tokio::test]
    async fn test_transport_error_propagates() {
        let backend = Arc::new(ScriptedBackend::new(vec![failure(BackendError::Transport(
            "connection refused".to_string(),
        ))]));
        let tools = Arc::new(RecordingTools::new(&[]));

        let err = agent(backend, tools).run(vec![Message::user("x")]).await.unwrap_err();
        assert!(matches!(err, InvocationError::Backend(BackendError::Transport(_))));
    }

    #[tokio::test]
    async fn test_timeout_is_distinct_error() {
        let backend = Arc::new(ScriptedBackend::new(vec![Step::Delayed(
            Duration::from_secs(5),
            Completion::text("late"),
        )]));
        let tools = Arc::new(RecordingTools::new(&[]));
        let limit = Duration::from_millis(20);

        let err = agent(backend, tools)
            .with_timeout(Some(limit))
            .run(vec![Message::user("x")])
            .await
            .unwrap_err();
        assert_eq!(err, InvocationError::Backend(BackendError::Timeout(limit)));
    }

    #[tokio::test]
    async fn test_cancelled_token_stops_before_backend_call() {
        let backend = Arc::new(ScriptedBackend::texts(&["never"]));
        let tools = Arc::new(RecordingTools::new(&[]));
        let token = CancellationToken::new();
        token.cancel();

        let err = agent(backend.clone(), tools)
            .with_cancellation(token)
            .run(vec![Message::user("x")])
            .await
            .unwrap_err();
        assert!(err.is_cancelled());
        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test]
    async fn test_audit_events_for_request_result_and_answer() {
        let backend = Arc::new(ScriptedBackend::new(vec![
            tool_call("c1", "get_context", json!({"key": "k"})),
            text("final"),
        ]));
        let tools = Arc::new(RecordingTools::new(&["get_context"]));
        let audit = Arc::new(RecordingAudit::default());

        agent(backend, tools)
            .with_audit_log(audit.clone())
            .run(vec![Message::user("go")])
            .await
            .unwrap();

        assert_eq!(
            audit.operations(),
            vec![TOOL_CALL_REQUEST, TOOL_CALL_RESULT, FINAL_RESPONSE]
        );
        assert!(audit.events().iter().all(|e| e.agent_name == "CoderExecutor"));
    }

    #[tokio::test]
    async fn test_tool_result_is_discarded_when_cancelled_mid_call() {
        let backend = Arc::new(ScriptedBackend::new(vec![
            tool_call("c1", "add_context", json!({"key": "k"})),
            text("should never be requested"),
        ]));
        let token = CancellationToken::new();
        let tools = Arc::new(RecordingTools::new(&["add_context"]).cancelling(token.clone()));
        let audit = Arc::new(RecordingAudit::default());

        let err = agent(backend.clone(), tools.clone())
            .with_cancellation(token)
            .with_audit_log(audit.clone())
            .run(vec![Message::user("store k")])
            .await
            .unwrap_err();

        assert_eq!(err, InvocationError::Cancelled);
        // the tool body ran to completion
        assert_eq!(tools.calls().len(), 1);
        // no follow-up call, so the result never reached the model
        assert_eq!(backend.call_count(), 1);
        assert!(
            backend.calls()[0]
                .history
                .iter()
                .all(|m| m.role != Role::Tool)
        );

        assert_eq!(audit.operations(), vec![TOOL_CALL_REQUEST, TOOL_CALL_RESULT]);
        let result = &audit.events()[1].details;
        assert_eq!(result["discarded"], json!(true));
        assert_eq!(result["call_id"], json!("c1"));
        assert!(result.get("result").is_none());
    }

    // ==================== process() with a message store ====================

    #[derive(Default)]
    struct VecStore {
        messages: Mutex<Vec<Message>>,
        fail_writes: bool,
    }

    #[async_trait]
    impl MessageStore for VecStore {
        fn session_id(&self) -> &str {
            "session-1"
        }

        async fn get_history(&self, limit: usize) -> Result<Vec<Message>, StoreError> {
            let messages = self.messages.lock().unwrap();
            let start = messages.len().saturating_sub(limit);
            Ok(messages[start..].to_vec())
        }

        async fn store_message(&self, role: Role, content: &str) -> Result<(), StoreError> {
            if self.fail_writes {
                return Err(StoreError::WriteFailed("read-only".to_string()));
            }
            self.messages
                .lock()
                .unwrap()
                .push(Message::with_role(role, content));
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_process_loads_and_stores_history() {
        let store = Arc::new(VecStore::default());
        store
            .messages
            .lock()
            .unwrap()
            .push(Message::assistant("earlier answer"));
        let backend = Arc::new(ScriptedBackend::texts(&["new answer"]));
        let tools = Arc::new(RecordingTools::new(&[]));

        let output = agent(backend.clone(), tools)
            .with_system_prompt("You are a coder")
            .with_message_store(store.clone())
            .process("next question")
            .await
            .unwrap();

        assert_eq!(output.text, "new answer");
        let sent = &backend.calls()[0].history;
        assert_eq!(sent[0].role, Role::System);
        assert_eq!(sent[1].content_str(), "earlier answer");
        assert_eq!(sent[2].content_str(), "next question");

        let stored: Vec<String> = store
            .messages
            .lock()
            .unwrap()
            .iter()
            .map(|m| m.content_str().to_string())
            .collect();
        assert_eq!(stored, vec!["earlier answer", "next question", "new answer"]);
    }

    #[tokio::test]
    async fn test_process_survives_store_failures() {
        let store = Arc::new(VecStore {
            fail_writes: true,
            ..Default::default()
        });
        let backend = Arc::new(ScriptedBackend::texts(&["still works"]));
        let tools = Arc::new(RecordingTools::new(&[]));

        let output = agent(backend, tools)
            .with_message_store(store)
            .process("hello world and more")
            .await
            .unwrap();
        assert_eq!(output.text, "still works");
    }
}
