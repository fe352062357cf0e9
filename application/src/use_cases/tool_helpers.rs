//! Shared helpers for tool-driving use cases.

use sql_agent_domain::ToolInvocation;
use sql_agent_domain::util::preview;

/// Short one-line preview of an invocation's arguments for logs.
///
/// Looks for the SQL tools' keys (`query`, `table_names`) first, then falls
/// back to the first string value found.
pub(crate) fn invocation_preview(call: &ToolInvocation) -> String {
    for key in ["query", "table_names"] {
        if let Some(s) = call.get_string(key) {
            return preview(s, 80);
        }
    }
    call.arguments
        .values()
        .find_map(|v| v.as_str())
        .map(|s| preview(s, 80))
        .unwrap_or_default()
}

/// Canonical tool name of an invocation, falling back to the name as given.
pub(crate) fn canonical_name<'a>(
    spec: &'a sql_agent_domain::ToolSpec,
    call: &'a ToolInvocation,
) -> &'a str {
    spec.resolve(&call.tool_name).unwrap_or(&call.tool_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::sql_tool_spec;

    #[test]
    fn test_query_key_preferred() {
        let call = ToolInvocation::new("c1", "run_query")
            .with_arg("other", "ignored")
            .with_arg("query", "SELECT 1");
        assert_eq!(invocation_preview(&call), "SELECT 1");
    }

    #[test]
    fn test_multiline_query_is_flattened() {
        let call = ToolInvocation::new("c1", "run_query").with_arg("query", "SELECT 1\nFROM t");
        assert_eq!(invocation_preview(&call), "SELECT 1 FROM t");
    }

    #[test]
    fn test_fallback_to_first_string() {
        let call = ToolInvocation::new("c1", "x").with_arg("foo", "bar");
        assert_eq!(invocation_preview(&call), "bar");
    }

    #[test]
    fn test_no_string_values() {
        let call = ToolInvocation::new("c1", "x").with_arg("count", 42);
        assert_eq!(invocation_preview(&call), "");
    }

    #[test]
    fn test_canonical_name_resolves_alias() {
        let spec = sql_tool_spec();
        let call = ToolInvocation::new("c1", "sql_db_query");
        assert_eq!(canonical_name(&spec, &call), "run_query");
        let unknown = ToolInvocation::new("c2", "nope");
        assert_eq!(canonical_name(&spec, &unknown), "nope");
    }
}
