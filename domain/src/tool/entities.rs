//! Tool domain entities

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Identifier correlating a tool invocation request with its result.
///
/// Assigned by the completion service for model-issued calls, or
/// synthesized locally for scaffolding calls (see [`InvocationId::synthetic`]).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvocationId(String);

impl InvocationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Build a locally-issued id such as `list_tables_0`.
    pub fn synthetic(tool_name: &str, sequence: usize) -> Self {
        Self(format!("{}_{}", tool_name, sequence))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for InvocationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for InvocationId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Definition of a tool that the completion service may ask to invoke
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Unique name of the tool (e.g., "run_query")
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// Parameter specifications
    pub parameters: Vec<ToolParameter>,
}

/// Parameter specification for a tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolParameter {
    /// Parameter name
    pub name: String,
    /// Parameter description
    pub description: String,
    /// Whether this parameter is required
    pub required: bool,
    /// Parameter type hint (e.g., "string", "integer")
    pub param_type: String,
}

impl ToolDefinition {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: Vec::new(),
        }
    }

    pub fn with_parameter(mut self, param: ToolParameter) -> Self {
        self.parameters.push(param);
        self
    }
}

impl ToolParameter {
    pub fn new(name: impl Into<String>, description: impl Into<String>, required: bool) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            required,
            param_type: "string".to_string(),
        }
    }

    pub fn with_type(mut self, param_type: impl Into<String>) -> Self {
        self.param_type = param_type.into();
        self
    }
}

/// Catalog of tools plus alias mappings for names models tend to invent.
#[derive(Debug, Clone, Default)]
pub struct ToolSpec {
    tools: HashMap<String, ToolDefinition>,
    /// Alias → canonical name mapping (e.g. "sql_db_query" → "run_query")
    aliases: HashMap<String, String>,
}

impl ToolSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, tool: ToolDefinition) -> Self {
        self.tools.insert(tool.name.clone(), tool);
        self
    }

    /// Register a single alias mapping (builder pattern)
    pub fn register_alias(mut self, alias: impl Into<String>, canonical: impl Into<String>) -> Self {
        self.aliases.insert(alias.into(), canonical.into());
        self
    }

    /// Resolve an alias to its canonical name (aliases only, not canonical names)
    pub fn resolve_alias(&self, name: &str) -> Option<&str> {
        self.aliases.get(name).map(|s| s.as_str())
    }

    /// Resolve a name: canonical names win over aliases, unknown names yield None.
    pub fn resolve<'a>(&'a self, name: &'a str) -> Option<&'a str> {
        if self.tools.contains_key(name) {
            Some(name)
        } else {
            self.resolve_alias(name)
        }
    }

    /// Get tool definition by canonical name or alias
    pub fn get_resolved(&self, name: &str) -> Option<&ToolDefinition> {
        self.resolve(name).and_then(|canonical| self.tools.get(canonical))
    }

    pub fn get(&self, name: &str) -> Option<&ToolDefinition> {
        self.tools.get(name)
    }

    pub fn all(&self) -> impl Iterator<Item = &ToolDefinition> {
        self.tools.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tools.keys().map(|s| s.as_str())
    }

    /// Definitions for the given names, in the order requested.
    ///
    /// Unknown names are skipped.
    pub fn select(&self, names: &[&str]) -> Vec<ToolDefinition> {
        names
            .iter()
            .filter_map(|n| self.get_resolved(n).cloned())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

/// A request to invoke a tool, as carried by an assistant message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocation {
    /// Correlation id; the matching tool result carries the same id
    pub id: InvocationId,
    /// Name of the tool to call
    pub tool_name: String,
    /// Arguments passed to the tool
    pub arguments: BTreeMap<String, serde_json::Value>,
}

impl ToolInvocation {
    pub fn new(id: impl Into<InvocationId>, tool_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tool_name: tool_name.into(),
            arguments: BTreeMap::new(),
        }
    }

    pub fn with_arg(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.arguments.insert(key.into(), value.into());
        self
    }

    /// Same call re-tagged with another id.
    pub fn with_id(mut self, id: InvocationId) -> Self {
        self.id = id;
        self
    }

    /// Get a string argument
    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.arguments.get(key).and_then(|v| v.as_str())
    }

    /// Get a required string argument or return an error message
    pub fn require_string(&self, key: &str) -> Result<&str, String> {
        self.get_string(key)
            .ok_or_else(|| format!("Missing required argument: {}", key))
    }
}

impl From<String> for InvocationId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sql_spec() -> ToolSpec {
        ToolSpec::new()
            .register(
                ToolDefinition::new("run_query", "Execute SQL")
                    .with_parameter(ToolParameter::new("query", "SQL text", true)),
            )
            .register(ToolDefinition::new("list_tables", "List tables"))
            .register_alias("sql_db_query", "run_query")
            .register_alias("sql_db_list_tables", "list_tables")
    }

    #[test]
    fn test_tool_definition() {
        let tool = ToolDefinition::new("get_schema", "Describe tables").with_parameter(
            ToolParameter::new("table_names", "Comma-separated tables", true).with_type("string"),
        );

        assert_eq!(tool.name, "get_schema");
        assert_eq!(tool.parameters.len(), 1);
        assert_eq!(tool.parameters[0].name, "table_names");
    }

    #[test]
    fn test_tool_spec_aliases() {
        let spec = sql_spec();

        assert_eq!(spec.resolve_alias("sql_db_query"), Some("run_query"));
        assert_eq!(spec.resolve_alias("run_query"), None);
        assert_eq!(spec.resolve("run_query"), Some("run_query"));
        assert_eq!(spec.resolve("sql_db_list_tables"), Some("list_tables"));
        assert_eq!(spec.resolve("drop_table"), None);

        assert_eq!(spec.get_resolved("sql_db_query").unwrap().name, "run_query");
        assert!(spec.get("sql_db_query").is_none());
    }

    #[test]
    fn test_select_keeps_requested_order() {
        let spec = sql_spec();
        let selected = spec.select(&["run_query", "missing", "sql_db_list_tables"]);
        let names: Vec<_> = selected.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["run_query", "list_tables"]);
    }

    #[test]
    fn test_invocation_accessors() {
        let call = ToolInvocation::new("call_1", "run_query")
            .with_arg("query", "SELECT 1");

        assert_eq!(call.id.as_str(), "call_1");
        assert_eq!(call.get_string("query"), Some("SELECT 1"));
        assert!(call.require_string("missing").is_err());

        let retagged = call.clone().with_id(InvocationId::new("call_0"));
        assert_eq!(retagged.id.as_str(), "call_0");
        assert_eq!(retagged.arguments, call.arguments);
    }

    #[test]
    fn test_synthetic_id() {
        assert_eq!(InvocationId::synthetic("list_tables", 1).as_str(), "list_tables_1");
    }
}
