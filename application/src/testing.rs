//! Test doubles shared by the use case tests.

use crate::ports::audit_log::{AuditEvent, AuditLog};
use crate::ports::chat_backend::{BackendError, ChatBackend};
use crate::ports::tool_executor::ToolExecutorPort;
use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use ube_domain::{
    Caller, Completion, ExportFormat, Message, ParamDecl, ToolArgs, ToolCall, ToolChoice,
    ToolDefinition, ToolError,
};

/// One recorded `chat` call
#[derive(Debug, Clone)]
pub(crate) struct RecordedChat {
    pub history: Vec<Message>,
    pub tool_names: Option<Vec<String>>,
    pub tool_choice: Option<ToolChoice>,
}

/// A scripted backend step
#[derive(Debug, Clone)]
pub(crate) enum Step {
    Reply(Result<Completion, BackendError>),
    /// Sleep before replying, for timeout and cancellation tests
    Delayed(Duration, Completion),
}

/// Backend that returns scripted completions in order
pub(crate) struct ScriptedBackend {
    steps: Mutex<VecDeque<Step>>,
    calls: Mutex<Vec<RecordedChat>>,
}

impl ScriptedBackend {
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            steps: Mutex::new(steps.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn texts(texts: &[&str]) -> Self {
        Self::new(texts.iter().map(|t| text(t)).collect())
    }

    pub fn calls(&self) -> Vec<RecordedChat> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

pub(crate) fn text(t: &str) -> Step {
    Step::Reply(Ok(Completion::text(t)))
}

pub(crate) fn tool_call(id: &str, name: &str, args: Value) -> Step {
    let mut call = ToolCall::new(id, name);
    if let Value::Object(map) = args {
        call.arguments = map;
    }
    Step::Reply(Ok(Completion::tool_call(call)))
}

pub(crate) fn failure(err: BackendError) -> Step {
    Step::Reply(Err(err))
}

#[async_trait]
impl ChatBackend for ScriptedBackend {
    async fn chat(
        &self,
        history: &[Message],
        tools: Option<&[ToolDefinition]>,
        tool_choice: Option<&ToolChoice>,
    ) -> Result<Completion, BackendError> {
        self.calls.lock().unwrap().push(RecordedChat {
            history: history.to_vec(),
            tool_names: tools.map(|t| t.iter().map(|d| d.name.clone()).collect()),
            tool_choice: tool_choice.cloned(),
        });
        let step = self
            .steps
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| text("(no more responses)"));
        match step {
            Step::Reply(reply) => reply,
            Step::Delayed(delay, completion) => {
                tokio::time::sleep(delay).await;
                Ok(completion)
            }
        }
    }
}

/// Tool executor that records calls and returns canned results
pub(crate) struct RecordingTools {
    definitions: Vec<ToolDefinition>,
    results: HashMap<String, Result<Value, ToolError>>,
    calls: Mutex<Vec<(String, Caller, ToolArgs)>>,
    cancel_on_execute: Option<CancellationToken>,
}

impl RecordingTools {
    pub fn new(names: &[&str]) -> Self {
        let definitions = names
            .iter()
            .map(|name| {
                ToolDefinition::from_signature(
                    *name,
                    format!("{} tool", name),
                    &[ParamDecl::new("key", "str").with_default()],
                )
            })
            .collect();
        Self {
            definitions,
            results: HashMap::new(),
            calls: Mutex::new(Vec::new()),
            cancel_on_execute: None,
        }
    }

    pub fn with_result(mut self, name: &str, result: Result<Value, ToolError>) -> Self {
        self.results.insert(name.to_string(), result);
        self
    }

    /// Cancel `token` from inside every tool body, as a Ctrl-C arriving mid-call would.
    pub fn cancelling(mut self, token: CancellationToken) -> Self {
        self.cancel_on_execute = Some(token);
        self
    }

    pub fn calls(&self) -> Vec<(String, Caller, ToolArgs)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ToolExecutorPort for RecordingTools {
    fn definitions(&self) -> Vec<ToolDefinition> {
        self.definitions.clone()
    }

    fn export(&self, _format: ExportFormat) -> Vec<Value> {
        self.definitions.iter().map(|d| json!(d.name)).collect()
    }

    async fn execute(
        &self,
        name: &str,
        caller: &Caller,
        args: ToolArgs,
    ) -> Result<Value, ToolError> {
        if !self.has_tool(name) {
            return Err(ToolError::NotFound(name.to_string()));
        }
        self.calls
            .lock()
            .unwrap()
            .push((name.to_string(), caller.clone(), args));
        if let Some(token) = &self.cancel_on_execute {
            token.cancel();
        }
        self.results
            .get(name)
            .cloned()
            .unwrap_or_else(|| Ok(json!("ok")))
    }
}

/// Audit log that keeps every event in memory
#[derive(Default)]
pub(crate) struct RecordingAudit {
    events: Mutex<Vec<AuditEvent>>,
}

impl RecordingAudit {
    pub fn operations(&self) -> Vec<&'static str> {
        self.events.lock().unwrap().iter().map(|e| e.operation).collect()
    }

    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl AuditLog for RecordingAudit {
    fn log(&self, event: AuditEvent) {
        self.events.lock().unwrap().push(event);
    }
}
