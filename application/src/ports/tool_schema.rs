//! Tool schema conversion port.
//!
//! Separates "which tools to offer" (domain) from "how to serialize them for
//! the API" (infrastructure).

use sql_agent_domain::ToolDefinition;

/// Port for converting tool definitions to the completion API's format.
pub trait ToolSchemaPort: Send + Sync {
    /// Convert a single tool definition to the API's tool object.
    fn tool_to_schema(&self, tool: &ToolDefinition) -> serde_json::Value;

    /// Convert several definitions, keeping their order.
    fn tools_schema(&self, tools: &[ToolDefinition]) -> Vec<serde_json::Value> {
        tools.iter().map(|t| self.tool_to_schema(t)).collect()
    }
}
