//! Chat-completions wire types for the OpenAI-compatible proxy.
//!
//! # Request
//!
//! ```json
//! {"model": "...", "messages": [...], "tools": [{"type": "function", ...}], "tool_choice": "auto"}
//! ```
//!
//! # Response
//!
//! The first choice's message is decoded into a [`Completion`]:
//! a `tool_calls` entry wins over content, and content in the legacy
//! `<call:id|name:{json}>` form is decoded as a tool call as well. A message
//! with neither content nor a tool call is malformed.

use super::error::{LiteLlmError, Result};
use crate::tools::JsonSchemaToolConverter;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use ube_application::ports::tool_schema::ToolSchemaPort;
use ube_domain::{
    Completion, ExportFormat, Message, ToolArgs, ToolCall, ToolChoice, ToolDefinition,
};

/// Chat completion request body
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<Value>,
}

/// One message in OpenAI chat format
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WireMessage {
    pub role: &'static str,
    /// `null` for assistant turns that only carry tool calls
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<WireToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl From<&Message> for WireMessage {
    fn from(message: &Message) -> Self {
        let tool_calls = (!message.tool_calls.is_empty())
            .then(|| message.tool_calls.iter().map(WireToolCall::from).collect());

        Self {
            role: message.role.as_str(),
            content: message.content.clone(),
            tool_calls,
            tool_call_id: message.tool_call_id.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireToolCall {
    pub id: String,
    #[serde(rename = "type", default = "function_kind")]
    pub kind: String,
    pub function: WireFunction,
}

fn function_kind() -> String {
    "function".to_string()
}

/// Function name plus arguments encoded as a JSON string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireFunction {
    pub name: String,
    #[serde(default)]
    pub arguments: String,
}

impl From<&ToolCall> for WireToolCall {
    fn from(call: &ToolCall) -> Self {
        Self {
            id: call.id.clone(),
            kind: function_kind(),
            function: WireFunction {
                name: call.tool_name.clone(),
                arguments: call.arguments_json(),
            },
        }
    }
}

/// Chat completion response body (only the fields we read)
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Option<Vec<Choice>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub message: Option<ResponseMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub tool_calls: Option<Vec<WireToolCall>>,
}

/// `"auto"` or `{"type": "function", "function": {"name": ...}}`
pub fn tool_choice_value(choice: &ToolChoice) -> Value {
    match choice {
        ToolChoice::Auto => json!("auto"),
        ToolChoice::Force(name) => json!({"type": "function", "function": {"name": name}}),
    }
}

/// Build the request body for one chat call. Tools and tool choice are only
/// sent when at least one tool is offered.
pub fn build_request(
    model: &str,
    history: &[Message],
    tools: Option<&[ToolDefinition]>,
    tool_choice: Option<&ToolChoice>,
) -> ChatRequest {
    let tools: Option<Vec<Value>> = tools.filter(|t| !t.is_empty()).map(|tools| {
        JsonSchemaToolConverter.all_tools_schema(tools, ExportFormat::OpenAiFunction)
    });
    let tool_choice = tools
        .as_ref()
        .and(tool_choice)
        .map(tool_choice_value);

    ChatRequest {
        model: model.to_string(),
        messages: history.iter().map(WireMessage::from).collect(),
        tools,
        tool_choice,
    }
}

/// Decode a response body into a [`Completion`].
pub fn parse_completion(body: &str) -> Result<Completion> {
    let response: ChatResponse = serde_json::from_str(body)
        .map_err(|e| LiteLlmError::MalformedResponse(format!("invalid JSON body: {}", e)))?;

    let message = response
        .choices
        .and_then(|choices| choices.into_iter().next())
        .ok_or_else(|| LiteLlmError::MalformedResponse("response has no choices".to_string()))?
        .message
        .ok_or_else(|| LiteLlmError::MalformedResponse("choice has no message".to_string()))?;

    if let Some(call) = message.tool_calls.and_then(|calls| calls.into_iter().next()) {
        if call.id.trim().is_empty() {
            return Err(LiteLlmError::MalformedResponse(format!(
                "tool call '{}' has an empty id",
                call.function.name
            )));
        }
        let arguments = decode_arguments(&call.function.name, &call.function.arguments)?;
        return Ok(Completion::tool_call(ToolCall {
            id: call.id,
            tool_name: call.function.name,
            arguments,
        }));
    }

    let content = message.content.ok_or_else(|| {
        LiteLlmError::MalformedResponse("message has neither content nor tool_calls".to_string())
    })?;
    match decode_legacy_call(&content) {
        Some(call) => Ok(Completion::tool_call(call?)),
        None => Ok(Completion::text(content)),
    }
}

/// Parse a tool call's argument string. An empty string means no arguments.
fn decode_arguments(tool: &str, raw: &str) -> Result<ToolArgs> {
    if raw.trim().is_empty() {
        return Ok(ToolArgs::new());
    }

    let invalid = |message: String| LiteLlmError::InvalidToolArguments {
        tool: tool.to_string(),
        message,
    };

    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(invalid(format!("expected a JSON object, got {}", other))),
        Err(e) => Err(invalid(e.to_string())),
    }
}

/// Decode `<call:id|name:{json}>`. Returns `None` when `text` is not in
/// that form at all.
pub fn decode_legacy_call(text: &str) -> Option<Result<ToolCall>> {
    let inner = text.trim().strip_prefix("<call:")?.strip_suffix('>')?;

    let malformed = |why: &str| {
        Some(Err(LiteLlmError::MalformedResponse(format!(
            "legacy tool call {}: {}",
            why, text
        ))))
    };

    let Some((id_and_name, raw_args)) = inner.split_once(':') else {
        return malformed("has no arguments");
    };
    let Some((id, name)) = id_and_name.split_once('|') else {
        return malformed("has no '|' between id and name");
    };
    if id.is_empty() || name.is_empty() {
        return malformed("has an empty id or name");
    }

    Some(decode_arguments(name, raw_args).map(|arguments| ToolCall {
        id: id.to_string(),
        tool_name: name.to_string(),
        arguments,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ube_domain::{ParamDecl, Role};

    fn body(message: Value) -> String {
        json!({"id": "chatcmpl-1", "choices": [{"index": 0, "message": message}]}).to_string()
    }

    #[test]
    fn test_request_translates_tool_turns() {
        let call = ToolCall::new("call_1", "get_context").with_arg("key", "lang");
        let history = vec![
            Message::system("You are CoderExecutor"),
            Message::user("What language?"),
            Message::assistant_tool_call(call),
            Message::tool_result("call_1", "rust"),
        ];
        let tools = vec![ToolDefinition::from_signature(
            "get_context",
            "Read context",
            &[ParamDecl::new("key", "str")],
        )];

        let request = build_request(
            "ube-default",
            &history,
            Some(tools.as_slice()),
            Some(&ToolChoice::Auto),
        );
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["model"], "ube-default");
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][2]["content"], Value::Null);
        assert_eq!(value["messages"][2]["tool_calls"][0]["id"], "call_1");
        assert_eq!(value["messages"][2]["tool_calls"][0]["type"], "function");
        assert_eq!(
            value["messages"][2]["tool_calls"][0]["function"]["arguments"],
            r#"{"key":"lang"}"#
        );
        assert_eq!(value["messages"][3]["role"], "tool");
        assert_eq!(value["messages"][3]["tool_call_id"], "call_1");
        assert_eq!(value["tools"][0]["function"]["name"], "get_context");
        assert_eq!(value["tool_choice"], "auto");
    }

    #[test]
    fn test_request_without_tools_omits_tool_fields() {
        let forced = ToolChoice::Force("write_file".to_string());
        let request = build_request("m", &[Message::user("hi")], Some(&[][..]), Some(&forced));
        let value = serde_json::to_value(&request).unwrap();

        assert!(value.get("tools").is_none());
        assert!(value.get("tool_choice").is_none());
    }

    #[test]
    fn test_forced_tool_choice() {
        assert_eq!(
            tool_choice_value(&ToolChoice::Force("write_file".to_string())),
            json!({"type": "function", "function": {"name": "write_file"}})
        );
    }

    #[test]
    fn test_parse_text_completion() {
        let completion = parse_completion(&body(json!({"role": "assistant", "content": "Done."})))
            .unwrap();
        assert_eq!(completion, Completion::text("Done."));
    }

    #[test]
    fn test_parse_structured_tool_call() {
        let completion = parse_completion(&body(json!({
            "role": "assistant",
            "content": null,
            "tool_calls": [
                {"id": "call_9", "type": "function", "function": {"name": "add_context", "arguments": "{\"key\":\"a\",\"value\":\"b\"}"}},
                {"id": "call_10", "type": "function", "function": {"name": "clear_context", "arguments": "{}"}}
            ]
        })))
        .unwrap();

        let call = completion.as_tool_call().unwrap();
        assert_eq!(call.id, "call_9");
        assert_eq!(call.tool_name, "add_context");
        assert_eq!(call.arguments["value"], "b");
    }

    #[test]
    fn test_parse_tool_call_with_bad_arguments_is_malformed() {
        let err = parse_completion(&body(json!({
            "tool_calls": [{"id": "c", "function": {"name": "get_context", "arguments": "{key:"}}]
        })))
        .unwrap_err();
        assert!(matches!(err, LiteLlmError::InvalidToolArguments { .. }));
    }

    #[test]
    fn test_parse_legacy_call_encoding() {
        let completion = parse_completion(&body(json!({
            "content": "<call:call_3|get_context:{\"key\": \"lang\"}>"
        })))
        .unwrap();

        let call = completion.as_tool_call().unwrap();
        assert_eq!(call.id, "call_3");
        assert_eq!(call.tool_name, "get_context");
        assert_eq!(call.arguments["key"], "lang");
    }

    #[test]
    fn test_legacy_decoding_edge_cases() {
        assert!(decode_legacy_call("plain answer").is_none());
        assert!(decode_legacy_call("<call:no-separator>").unwrap().is_err());
        assert!(decode_legacy_call("<call:id_only:{}>").unwrap().is_err());
        assert!(decode_legacy_call("<call:c1|tool:[1,2]>").unwrap().is_err());

        let no_args = decode_legacy_call("<call:c1|clear_context:{}>").unwrap().unwrap();
        assert!(no_args.arguments.is_empty());
    }

    #[test]
    fn test_missing_choices_or_message_is_malformed() {
        assert!(matches!(
            parse_completion(r#"{"choices": []}"#),
            Err(LiteLlmError::MalformedResponse(_))
        ));
        assert!(matches!(
            parse_completion(r#"{"error": "oops"}"#),
            Err(LiteLlmError::MalformedResponse(_))
        ));
        assert!(matches!(
            parse_completion(r#"{"choices": [{"finish_reason": "stop"}]}"#),
            Err(LiteLlmError::MalformedResponse(_))
        ));
        assert!(matches!(
            parse_completion("not json"),
            Err(LiteLlmError::MalformedResponse(_))
        ));

        for message in [
            json!({"role": "assistant", "content": null}),
            json!({"role": "assistant", "content": null, "tool_calls": []}),
            json!({}),
        ] {
            let err = parse_completion(&body(message.clone())).unwrap_err();
            assert_eq!(
                err,
                LiteLlmError::MalformedResponse(
                    "message has neither content nor tool_calls".to_string()
                ),
                "message: {}",
                message
            );
        }
    }

    #[test]
    fn test_empty_content_string_is_still_text() {
        let completion = parse_completion(&body(json!({"content": ""}))).unwrap();
        assert_eq!(completion, Completion::text(""));
    }

    #[test]
    fn test_structured_tool_call_with_empty_id_is_malformed() {
        let err = parse_completion(&body(json!({
            "tool_calls": [{"id": "", "type": "function", "function": {"name": "get_context", "arguments": "{}"}}]
        })))
        .unwrap_err();
        assert!(matches!(err, LiteLlmError::MalformedResponse(ref m) if m.contains("empty id")));
    }

    #[test]
    fn test_role_names_match_wire_format() {
        assert_eq!(WireMessage::from(&Message::with_role(Role::Assistant, "x")).role, "assistant");
    }
}
