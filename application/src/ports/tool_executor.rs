//! Tool Executor port
//!
//! Defines the interface for executing tools requested by the model.

use async_trait::async_trait;
use sql_agent_domain::{ToolDefinition, ToolInvocation, ToolResult, ToolSpec};

/// Port for tool execution
///
/// `execute` never fails: unknown tools, bad arguments and store errors all
/// come back as a failed [`ToolResult`].
#[async_trait]
pub trait ToolExecutorPort: Send + Sync {
    /// Get the specification of all available tools
    fn tool_spec(&self) -> &ToolSpec;

    /// Check if a tool (or alias) is available
    fn has_tool(&self, name: &str) -> bool {
        self.tool_spec().get_resolved(name).is_some()
    }

    /// Get the definition of a specific tool
    fn get_tool(&self, name: &str) -> Option<&ToolDefinition> {
        self.tool_spec().get_resolved(name)
    }

    /// Definitions for the named tools, in the given order
    fn definitions(&self, names: &[&str]) -> Vec<ToolDefinition> {
        self.tool_spec().select(names)
    }

    /// Get names of all available tools, sorted
    fn available_tools(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tool_spec().names().collect();
        names.sort_unstable();
        names
    }

    /// Execute a tool invocation
    async fn execute(&self, call: &ToolInvocation) -> ToolResult;
}
