//! Completion types returned by the model backend.
//!
//! The backend adapter decodes whatever wire encoding its provider uses into a
//! [`Completion`]; the invocation loop only ever branches on this enum.

use crate::tool::entities::ToolCall;
use serde::{Deserialize, Serialize};

/// One model completion: either a final text answer or a structured tool call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Completion {
    Text { text: String },
    ToolCall { call: ToolCall },
}

impl Completion {
    pub fn text(text: impl Into<String>) -> Self {
        Completion::Text { text: text.into() }
    }

    pub fn tool_call(call: ToolCall) -> Self {
        Completion::ToolCall { call }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Completion::Text { text } => Some(text),
            _ => None,
        }
    }

    pub fn as_tool_call(&self) -> Option<&ToolCall> {
        match self {
            Completion::ToolCall { call } => Some(call),
            _ => None,
        }
    }
}

/// Tool selection hint sent with a chat request.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolChoice {
    /// Let the model decide
    #[default]
    Auto,
    /// Require the named tool
    Force(String),
}

impl ToolChoice {
    pub fn forced_name(&self) -> Option<&str> {
        match self {
            ToolChoice::Force(name) => Some(name),
            ToolChoice::Auto => None,
        }
    }
}
