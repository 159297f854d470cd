//! Tool domain entities

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::value_objects::ToolError;

/// Name of the reserved parameter the registry injects with the caller's role.
///
/// A tool that declares this parameter receives the role at call time; it is
/// never part of the derived parameter schema.
pub const CALLER_ROLE_PARAM: &str = "caller_role";

/// Named arguments passed to a tool body.
pub type ToolArgs = serde_json::Map<String, serde_json::Value>;

/// Semantic parameter type exposed in tool schemas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    String,
    Integer,
    Number,
    Boolean,
    Array,
    Object,
}

impl ParamType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamType::String => "string",
            ParamType::Integer => "integer",
            ParamType::Number => "number",
            ParamType::Boolean => "boolean",
            ParamType::Array => "array",
            ParamType::Object => "object",
        }
    }

    /// Map a declared type name to its semantic type.
    ///
    /// Accepts Rust spellings (`i64`, `Vec<String>`, `HashMap<..>`), the
    /// JSON Schema names and the common scripting spellings (`int`, `list`,
    /// `dict`). `Option<T>` maps to `T`. Unknown names fall back to `string`.
    pub fn from_declared(declared: &str) -> Self {
        let mut t = declared.trim();
        while let Some(inner) = t
            .strip_prefix("Option<")
            .and_then(|rest| rest.strip_suffix('>'))
        {
            t = inner.trim();
        }
        let t = t.trim_start_matches('&').trim();
        let lower = t.to_ascii_lowercase();

        if lower.starts_with("vec<")
            || lower.starts_with("list")
            || lower.starts_with('[')
            || lower.starts_with("array")
            || lower.starts_with("tuple")
            || lower.starts_with("hashset<")
            || lower.starts_with("btreeset<")
        {
            return ParamType::Array;
        }
        if lower.starts_with("hashmap<")
            || lower.starts_with("btreemap<")
            || lower.starts_with("map<")
            || lower.starts_with("dict")
        {
            return ParamType::Object;
        }

        match lower.as_str() {
            "int" | "integer" | "i8" | "i16" | "i32" | "i64" | "i128" | "isize" | "u8" | "u16"
            | "u32" | "u64" | "u128" | "usize" => ParamType::Integer,
            "float" | "number" | "f32" | "f64" => ParamType::Number,
            "bool" | "boolean" => ParamType::Boolean,
            "object" | "map" | "value" | "serde_json::value" | "json" => ParamType::Object,
            _ => ParamType::String,
        }
    }

    /// Whether a JSON value is acceptable for this type.
    pub fn accepts(&self, value: &serde_json::Value) -> bool {
        match self {
            ParamType::String => value.is_string(),
            ParamType::Integer => value.is_i64() || value.is_u64(),
            ParamType::Number => value.is_number(),
            ParamType::Boolean => value.is_boolean(),
            ParamType::Array => value.is_array(),
            ParamType::Object => value.is_object(),
        }
    }
}

impl std::fmt::Display for ParamType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One parameter of a tool body's declared signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamDecl {
    pub name: String,
    pub declared_type: String,
    pub has_default: bool,
    pub description: String,
}

impl ParamDecl {
    pub fn new(name: impl Into<String>, declared_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            declared_type: declared_type.into(),
            has_default: false,
            description: String::new(),
        }
    }

    /// Mark the parameter as having a default value (optional in the schema).
    pub fn with_default(mut self) -> Self {
        self.has_default = true;
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Parameter specification derived from a [`ParamDecl`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolParameter {
    pub name: String,
    pub description: String,
    pub param_type: ParamType,
    pub required: bool,
}

impl ToolParameter {
    pub fn from_decl(decl: &ParamDecl) -> Self {
        Self {
            name: decl.name.clone(),
            description: decl.description.clone(),
            param_type: ParamType::from_declared(&decl.declared_type),
            required: !decl.has_default,
        }
    }
}

/// Definition of a registered tool (metadata only, the body lives in the registry)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Unique name of the tool (e.g., "write_file")
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// Parameters derived from the body's signature
    pub parameters: Vec<ToolParameter>,
    /// Caller roles allowed to execute this tool; empty means unrestricted
    pub allowed_roles: BTreeSet<String>,
    /// Whether the body declares the reserved [`CALLER_ROLE_PARAM`]
    pub injects_caller_role: bool,
}

impl ToolDefinition {
    /// Build a definition from a declared signature.
    ///
    /// The reserved [`CALLER_ROLE_PARAM`] is excluded from the parameter
    /// schema and recorded as an injection instead.
    pub fn from_signature(
        name: impl Into<String>,
        description: impl Into<String>,
        signature: &[ParamDecl],
    ) -> Self {
        let mut injects_caller_role = false;
        let parameters = signature
            .iter()
            .filter(|decl| {
                if decl.name == CALLER_ROLE_PARAM {
                    injects_caller_role = true;
                    false
                } else {
                    true
                }
            })
            .map(ToolParameter::from_decl)
            .collect();

        Self {
            name: name.into(),
            description: description.into(),
            parameters,
            allowed_roles: BTreeSet::new(),
            injects_caller_role,
        }
    }

    pub fn with_allowed_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_roles = roles.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_restricted(&self) -> bool {
        !self.allowed_roles.is_empty()
    }

    /// Whether a caller with `role` may execute this tool.
    pub fn permits(&self, role: &str) -> bool {
        !self.is_restricted() || self.allowed_roles.contains(role)
    }

    pub fn parameter(&self, name: &str) -> Option<&ToolParameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    pub fn required_parameters(&self) -> impl Iterator<Item = &ToolParameter> {
        self.parameters.iter().filter(|p| p.required)
    }

    /// Check call arguments against the derived parameters.
    pub fn validate_arguments(&self, args: &ToolArgs) -> Result<(), ToolError> {
        for param in self.required_parameters() {
            if !args.contains_key(&param.name) {
                return Err(ToolError::InvalidArguments {
                    tool: self.name.clone(),
                    message: format!("missing required parameter '{}'", param.name),
                });
            }
        }

        for (key, value) in args {
            let Some(param) = self.parameter(key) else {
                return Err(ToolError::InvalidArguments {
                    tool: self.name.clone(),
                    message: format!("unknown parameter '{}'", key),
                });
            };
            if value.is_null() && !param.required {
                continue;
            }
            if !param.param_type.accepts(value) {
                return Err(ToolError::InvalidArguments {
                    tool: self.name.clone(),
                    message: format!("parameter '{}' must be of type {}", key, param.param_type),
                });
            }
        }

        Ok(())
    }
}

/// Identity of the agent invoking a tool.
///
/// `name` is matched by the permission filter, `role` by per-tool allow-lists.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Caller {
    pub name: String,
    pub role: String,
}

impl Caller {
    pub fn new(name: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            role: role.into(),
        }
    }
}

impl std::fmt::Display for Caller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.role)
    }
}

/// A structured tool-call request from the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Correlation id; the tool result must echo it
    pub id: String,
    pub tool_name: String,
    pub arguments: ToolArgs,
}

impl ToolCall {
    pub fn new(id: impl Into<String>, tool_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tool_name: tool_name.into(),
            arguments: ToolArgs::new(),
        }
    }

    pub fn with_arg(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.arguments.insert(key.into(), value.into());
        self
    }

    /// Arguments encoded as a JSON object string.
    pub fn arguments_json(&self) -> String {
        serde_json::Value::Object(self.arguments.clone()).to_string()
    }
}

/// Projection used when exporting tool definitions to a model-calling layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    /// `{name, description, parameters: <JSON Schema object>}`
    #[default]
    JsonSchema,
    /// `{type: "function", function: {name, description, parameters}}`
    OpenAiFunction,
    /// `{name, description, parameters: [{name, type, required}]}`
    Plain,
}
