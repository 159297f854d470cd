//! Tool schema converter.
//!
//! Default implementation of [`ToolSchemaPort`]: turns a [`ToolDefinition`]
//! into JSON Schema, OpenAI function-calling or plain form. The reserved
//! caller-role parameter never appears in any projection because it is not
//! part of the definition's parameters.

use serde_json::{Map, Value, json};
use ube_application::ports::tool_schema::ToolSchemaPort;
use ube_domain::{ExportFormat, ToolDefinition};

/// Default schema converter.
pub struct JsonSchemaToolConverter;

impl JsonSchemaToolConverter {
    /// `{"type": "object", "properties": {...}, "required": [...]}`
    pub fn parameters_schema(tool: &ToolDefinition) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();

        for param in &tool.parameters {
            let mut prop = Map::new();
            prop.insert("type".to_string(), json!(param.param_type.as_str()));
            if !param.description.is_empty() {
                prop.insert("description".to_string(), json!(param.description));
            }
            properties.insert(param.name.clone(), Value::Object(prop));

            if param.required {
                required.push(json!(param.name));
            }
        }

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}

impl ToolSchemaPort for JsonSchemaToolConverter {
    fn tool_to_schema(&self, tool: &ToolDefinition, format: ExportFormat) -> Value {
        match format {
            ExportFormat::JsonSchema => json!({
                "name": tool.name,
                "description": tool.description,
                "parameters": Self::parameters_schema(tool),
            }),
            ExportFormat::OpenAiFunction => json!({
                "type": "function",
                "function": {
                    "name": tool.name,
                    "description": tool.description,
                    "parameters": Self::parameters_schema(tool),
                }
            }),
            ExportFormat::Plain => {
                let parameters: Vec<Value> = tool
                    .parameters
                    .iter()
                    .map(|p| {
                        json!({
                            "name": p.name,
                            "type": p.param_type.as_str(),
                            "required": p.required,
                        })
                    })
                    .collect();
                json!({
                    "name": tool.name,
                    "description": tool.description,
                    "parameters": parameters,
                })
            }
        }
    }
}
