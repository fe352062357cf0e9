//! Conversation messages
//!
//! A [`Message`] is one entry of the session transcript. Tool traffic is
//! modelled explicitly: an assistant [`Message::ToolRequest`] carries one or
//! more [`ToolInvocation`]s, and each is answered by a [`Message::ToolOutput`]
//! carrying the same [`InvocationId`].

use crate::tool::{InvocationId, ToolInvocation, ToolResult};
use serde::{Deserialize, Serialize};

/// A message in the conversation (Entity)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Message {
    /// Instruction prefix sent with a request. Never persisted by the graph.
    System { content: String },

    /// Text written by the user.
    User { content: String },

    /// Free-text answer from the model.
    Assistant { content: String },

    /// The model (or the graph's scaffolding) asks for tool invocations.
    ToolRequest {
        #[serde(default, skip_serializing_if = "String::is_empty")]
        content: String,
        invocations: Vec<ToolInvocation>,
        /// Set when this request is a correction of an earlier, still
        /// unresolved invocation with this id.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        amends: Option<InvocationId>,
    },

    /// Result of one invocation, correlated by id.
    ToolOutput {
        invocation_id: InvocationId,
        tool_name: String,
        content: String,
        #[serde(default)]
        is_error: bool,
    },
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self::System {
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::User {
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::Assistant {
            content: content.into(),
        }
    }

    pub fn tool_request(invocations: Vec<ToolInvocation>) -> Self {
        Self::ToolRequest {
            content: String::new(),
            invocations,
            amends: None,
        }
    }

    /// Correction of the pending invocation `pending`: the corrected call is
    /// re-tagged with the pending id so its result resolves the original request.
    pub fn correction(pending: &InvocationId, corrected: ToolInvocation) -> Self {
        Self::ToolRequest {
            content: String::new(),
            invocations: vec![corrected.with_id(pending.clone())],
            amends: Some(pending.clone()),
        }
    }

    /// Tool output message for `invocation`, built from a tool result.
    pub fn tool_output(invocation: &ToolInvocation, result: &ToolResult) -> Self {
        Self::ToolOutput {
            invocation_id: invocation.id.clone(),
            tool_name: result.tool_name.clone(),
            content: result.content(),
            is_error: !result.is_success(),
        }
    }

    /// Invocations requested by this message (empty for non-request messages).
    pub fn invocations(&self) -> &[ToolInvocation] {
        match self {
            Self::ToolRequest { invocations, .. } => invocations,
            _ => &[],
        }
    }

    pub fn has_invocations(&self) -> bool {
        !self.invocations().is_empty()
    }

    /// Text content of the message.
    pub fn text(&self) -> &str {
        match self {
            Self::System { content }
            | Self::User { content }
            | Self::Assistant { content }
            | Self::ToolRequest { content, .. }
            | Self::ToolOutput { content, .. } => content,
        }
    }

    /// Short label used when printing transcripts.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::System { .. } => "System",
            Self::User { .. } => "Human",
            Self::Assistant { .. } | Self::ToolRequest { .. } => "Ai",
            Self::ToolOutput { .. } => "Tool",
        }
    }

    pub fn is_system(&self) -> bool {
        matches!(self, Self::System { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::ToolError;

    #[test]
    fn test_tool_request_exposes_invocations() {
        let msg = Message::tool_request(vec![
            ToolInvocation::new("c1", "get_schema").with_arg("table_names", "albums"),
        ]);
        assert!(msg.has_invocations());
        assert_eq!(msg.invocations()[0].tool_name, "get_schema");
        assert_eq!(msg.kind(), "Ai");
        assert!(!Message::assistant("done").has_invocations());
    }

    #[test]
    fn test_correction_retags_with_pending_id() {
        let pending = InvocationId::new("draft_1");
        let corrected = ToolInvocation::new("check_9", "run_query").with_arg("query", "SELECT 2");
        let msg = Message::correction(&pending, corrected);

        match &msg {
            Message::ToolRequest {
                invocations,
                amends,
                ..
            } => {
                assert_eq!(invocations[0].id, pending);
                assert_eq!(amends.as_ref(), Some(&pending));
                assert_eq!(invocations[0].get_string("query"), Some("SELECT 2"));
            }
            other => panic!("expected ToolRequest, got {:?}", other),
        }
    }

    #[test]
    fn test_tool_output_from_failure() {
        let call = ToolInvocation::new("c1", "run_query").with_arg("query", "SELECT * FROM nope");
        let result = ToolResult::failure("run_query", ToolError::query_failed("no such table: nope"));
        let msg = Message::tool_output(&call, &result);

        assert_eq!(
            msg,
            Message::ToolOutput {
                invocation_id: InvocationId::new("c1"),
                tool_name: "run_query".to_string(),
                content: "Error: no such table: nope".to_string(),
                is_error: true,
            }
        );
    }

    #[test]
    fn test_serde_tagging() {
        let json = serde_json::to_value(Message::user("hi")).unwrap();
        assert_eq!(json["role"], "user");
        assert_eq!(json["content"], "hi");

        let request = Message::tool_request(vec![ToolInvocation::new("c1", "list_tables")]);
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["role"], "tool_request");
        assert!(json.get("amends").is_none());
        let back: Message = serde_json::from_value(json).unwrap();
        assert_eq!(back, request);
    }
}
