//! Tool domain value objects — immutable result and error types
//!
//! Every tool execution produces a [`ToolResult`]. Failures are values, not
//! Rust errors: the orchestration graph feeds them back to the completion
//! service so the model can correct itself.

use serde::{Deserialize, Serialize};

/// Error that occurred during tool execution.
///
/// | Code | Description |
/// |------|-------------|
/// | `INVALID_ARGUMENT` | Missing/wrong parameters |
/// | `NOT_FOUND` | Unknown tool or table |
/// | `QUERY_FAILED` | The store rejected the statement |
/// | `EXECUTION_FAILED` | Any other store failure |
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolError {
    /// Error code (e.g., "NOT_FOUND", "QUERY_FAILED")
    pub code: String,
    /// Human-readable error message
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ToolError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::new("NOT_FOUND", format!("Error: {}", resource.into()))
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new("INVALID_ARGUMENT", format!("Error: {}", message.into()))
    }

    /// The store rejected the statement; keeps the store's message verbatim.
    pub fn query_failed(store_message: impl Into<String>) -> Self {
        Self::new("QUERY_FAILED", format!("Error: {}", store_message.into()))
    }

    pub fn execution_failed(message: impl Into<String>) -> Self {
        Self::new("EXECUTION_FAILED", format!("Error: {}", message.into()))
    }
}

impl std::fmt::Display for ToolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(details) = &self.details {
            write!(f, " ({})", details)?;
        }
        Ok(())
    }
}

impl std::error::Error for ToolError {}

/// Result of a tool execution, carrying output or error information.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    /// Canonical name of the tool that was executed
    pub tool_name: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ToolError>,
    #[serde(default)]
    pub metadata: ToolResultMetadata,
}

/// Structured metadata about tool execution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolResultMetadata {
    /// Duration of execution in milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    /// For `run_query`: number of rows returned
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_count: Option<usize>,
}

impl ToolResult {
    pub fn success(tool_name: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            success: true,
            output: Some(output.into()),
            error: None,
            metadata: ToolResultMetadata::default(),
        }
    }

    pub fn failure(tool_name: impl Into<String>, error: ToolError) -> Self {
        Self {
            tool_name: tool_name.into(),
            success: false,
            output: None,
            error: Some(error),
            metadata: ToolResultMetadata::default(),
        }
    }

    pub fn with_duration(mut self, duration_ms: u64) -> Self {
        self.metadata.duration_ms = Some(duration_ms);
        self
    }

    pub fn with_row_count(mut self, rows: usize) -> Self {
        self.metadata.row_count = Some(rows);
        self
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn output(&self) -> Option<&str> {
        self.output.as_deref()
    }

    pub fn error(&self) -> Option<&ToolError> {
        self.error.as_ref()
    }

    /// Text handed back to the completion service: output on success,
    /// the error message otherwise.
    pub fn content(&self) -> String {
        match (&self.output, &self.error) {
            (Some(output), _) if self.success => output.clone(),
            (_, Some(error)) => error.message.clone(),
            _ => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_failed_keeps_store_message() {
        let err = ToolError::query_failed("no such table: invoice");
        assert_eq!(err.code, "QUERY_FAILED");
        assert_eq!(err.message, "Error: no such table: invoice");
    }

    #[test]
    fn test_tool_result_success() {
        let result = ToolResult::success("run_query", "[(1,)]").with_row_count(1);

        assert!(result.is_success());
        assert_eq!(result.content(), "[(1,)]");
        assert_eq!(result.metadata.row_count, Some(1));
    }

    #[test]
    fn test_tool_result_failure_content_is_error_message() {
        let result = ToolResult::failure("run_query", ToolError::query_failed("syntax error"));

        assert!(!result.is_success());
        assert!(result.output().is_none());
        assert_eq!(result.content(), "Error: syntax error");
    }

    #[test]
    fn test_display_with_details() {
        let err = ToolError::not_found("table_names {'foo'} not found in database")
            .with_details("available: albums");
        assert_eq!(
            err.to_string(),
            "[NOT_FOUND] Error: table_names {'foo'} not found in database (available: albums)"
        );
    }
}
