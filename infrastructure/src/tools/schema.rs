//! JSON Schema tool converter.
//!
//! Default implementation of [`ToolSchemaPort`] producing the
//! `{"type": "function", "function": {...}}` objects accepted by
//! OpenAI-compatible chat completion endpoints.

use serde_json::{Map, Value, json};
use sql_agent_application::ports::tool_schema::ToolSchemaPort;
use sql_agent_domain::ToolDefinition;

/// Converts [`ToolDefinition`]s to function-tool JSON.
///
/// Handles param_type → JSON Schema type mapping:
/// - `"number"` → `"number"`
/// - `"integer"` → `"integer"`
/// - `"boolean"` → `"boolean"`
/// - anything else → `"string"`
pub struct JsonSchemaToolConverter;

impl ToolSchemaPort for JsonSchemaToolConverter {
    fn tool_to_schema(&self, tool: &ToolDefinition) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();

        for param in &tool.parameters {
            let schema_type = match param.param_type.as_str() {
                "number" => "number",
                "integer" => "integer",
                "boolean" => "boolean",
                _ => "string",
            };

            properties.insert(
                param.name.clone(),
                json!({
                    "type": schema_type,
                    "description": param.description,
                }),
            );

            if param.required {
                required.push(json!(param.name));
            }
        }

        json!({
            "type": "function",
            "function": {
                "name": tool.name,
                "description": tool.description,
                "parameters": {
                    "type": "object",
                    "properties": properties,
                    "required": required,
                }
            }
        })
    }
}
