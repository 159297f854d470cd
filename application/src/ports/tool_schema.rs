//! Tool schema conversion port.
//!
//! Separates "which tools exist" (registry) from "how to serialize them for a
//! given consumer" (infrastructure).

use ube_domain::{ExportFormat, ToolDefinition};

/// Port for converting tool definitions to an export format.
pub trait ToolSchemaPort: Send + Sync {
    /// Convert a single tool definition.
    fn tool_to_schema(&self, tool: &ToolDefinition, format: ExportFormat) -> serde_json::Value;

    /// Convert all tools (sorted by name).
    fn all_tools_schema(
        &self,
        tools: &[ToolDefinition],
        format: ExportFormat,
    ) -> Vec<serde_json::Value> {
        let mut sorted: Vec<&ToolDefinition> = tools.iter().collect();
        sorted.sort_by(|a, b| a.name.cmp(&b.name));
        sorted
            .into_iter()
            .map(|t| self.tool_to_schema(t, format))
            .collect()
    }
}
