//! Conversation state shared by the orchestration graph's nodes.

use super::message::Message;
use crate::core::question::Question;
use crate::tool::{InvocationId, ToolInvocation};
use serde::{Deserialize, Serialize};

/// Append-only transcript of one question/answer session.
///
/// Messages can only be appended; nothing already recorded is rewritten.
/// Corrections of a draft tool call are appended as new requests tagged with
/// the pending id (see [`Message::correction`]), and
/// [`pending_invocations`](Self::pending_invocations) always reports the
/// latest version of each unresolved call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationState {
    messages: Vec<Message>,
    /// Number of model-driven query generation passes so far.
    #[serde(default)]
    generation_passes: usize,
}

impl ConversationState {
    /// Start a session with the question as the first user message.
    pub fn new(question: &Question) -> Self {
        Self {
            messages: vec![Message::user(question.content())],
            generation_passes: 0,
        }
    }

    /// Build a state from an existing transcript.
    pub fn from_messages(messages: Vec<Message>) -> Self {
        Self {
            messages,
            generation_passes: 0,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Append a message to the transcript.
    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn extend(&mut self, messages: impl IntoIterator<Item = Message>) {
        self.messages.extend(messages);
    }

    /// The original question, i.e. the first user message.
    pub fn question(&self) -> Option<&str> {
        self.messages.iter().find_map(|m| match m {
            Message::User { content } => Some(content.as_str()),
            _ => None,
        })
    }

    /// Invocations that have been requested but have no tool output yet.
    ///
    /// When a request was amended, the amending invocation replaces the
    /// draft at the draft's position.
    pub fn pending_invocations(&self) -> Vec<&ToolInvocation> {
        let mut pending: Vec<&ToolInvocation> = Vec::new();
        for message in &self.messages {
            match message {
                Message::ToolRequest { invocations, .. } => {
                    for invocation in invocations {
                        match pending.iter().position(|p| p.id == invocation.id) {
                            Some(pos) => pending[pos] = invocation,
                            None => pending.push(invocation),
                        }
                    }
                }
                Message::ToolOutput { invocation_id, .. } => {
                    pending.retain(|p| &p.id != invocation_id);
                }
                _ => {}
            }
        }
        pending
    }

    /// The most recently requested unresolved invocation.
    pub fn pending_invocation(&self) -> Option<&ToolInvocation> {
        self.pending_invocations().into_iter().last()
    }

    pub fn is_resolved(&self) -> bool {
        self.pending_invocations().is_empty()
    }

    /// Number of tool outputs recorded for `id`.
    pub fn output_count(&self, id: &InvocationId) -> usize {
        self.messages
            .iter()
            .filter(|m| matches!(m, Message::ToolOutput { invocation_id, .. } if invocation_id == id))
            .count()
    }

    /// The answer, when the session ended on a free-text assistant message.
    pub fn final_answer(&self) -> Option<&str> {
        match self.messages.last() {
            Some(Message::Assistant { content }) => Some(content),
            _ => None,
        }
    }

    pub fn generation_passes(&self) -> usize {
        self.generation_passes
    }

    pub fn record_generation_pass(&mut self) {
        self.generation_passes += 1;
    }

    /// Next free sequence number for locally-issued invocation ids.
    pub fn next_sequence(&self) -> usize {
        self.messages.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::{ToolError, ToolResult};

    fn question() -> Question {
        Question::new("How many artists are there?").unwrap()
    }

    fn run_query(id: &str, sql: &str) -> ToolInvocation {
        ToolInvocation::new(id, "run_query").with_arg("query", sql)
    }

    #[test]
    fn test_new_state_starts_with_question() {
        let state = ConversationState::new(&question());
        assert_eq!(state.len(), 1);
        assert_eq!(state.question(), Some("How many artists are there?"));
        assert!(state.is_resolved());
        assert!(state.final_answer().is_none());
    }

    #[test]
    fn test_pending_until_output_appended() {
        let mut state = ConversationState::new(&question());
        let call = run_query("c1", "SELECT COUNT(*) FROM artists");
        state.append(Message::tool_request(vec![call.clone()]));

        assert_eq!(state.pending_invocation().map(|c| c.id.as_str()), Some("c1"));

        state.append(Message::tool_output(&call, &ToolResult::success("run_query", "[(275,)]")));
        assert!(state.is_resolved());
        assert_eq!(state.output_count(&call.id), 1);
    }

    #[test]
    fn test_correction_replaces_draft_in_pending_set() {
        let mut state = ConversationState::new(&question());
        let draft = run_query("c1", "SELECT COUNT(*) FROM artist");
        state.append(Message::tool_request(vec![draft.clone()]));

        let corrected = run_query("other", "SELECT COUNT(*) FROM artists");
        state.append(Message::correction(&draft.id, corrected));

        let pending = state.pending_invocations();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, draft.id);
        assert_eq!(pending[0].get_string("query"), Some("SELECT COUNT(*) FROM artists"));
        assert_eq!(state.len(), 3);
    }

    #[test]
    fn test_error_output_resolves_invocation() {
        let mut state = ConversationState::new(&question());
        let call = run_query("c1", "SELECT * FROM nope");
        state.append(Message::tool_request(vec![call.clone()]));
        state.append(Message::tool_output(
            &call,
            &ToolResult::failure("run_query", ToolError::query_failed("no such table: nope")),
        ));

        assert!(state.is_resolved());
        assert_eq!(state.last().unwrap().text(), "Error: no such table: nope");
    }

    #[test]
    fn test_final_answer_only_on_assistant_text() {
        let mut state = ConversationState::new(&question());
        state.append(Message::assistant("There are 275 artists."));
        assert_eq!(state.final_answer(), Some("There are 275 artists."));

        state.append(Message::tool_request(vec![run_query("c2", "SELECT 1")]));
        assert!(state.final_answer().is_none());
    }

    #[test]
    fn test_generation_pass_counter() {
        let mut state = ConversationState::new(&question());
        state.record_generation_pass();
        state.record_generation_pass();
        assert_eq!(state.generation_passes(), 2);
    }
}
