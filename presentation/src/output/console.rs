//! Console output for conversation transcripts

use colored::Colorize;
use sql_agent_domain::{ConversationState, Message};

const RULE_WIDTH: usize = 80;

/// Formats messages and finished sessions for the terminal
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Pretty-print one message under a `==== Ai Message ====` rule.
    pub fn format_message(message: &Message) -> String {
        let mut output = Self::title(&format!("{} Message", message.kind()));
        output.push('\n');

        match message {
            Message::ToolRequest {
                content,
                invocations,
                amends,
            } => {
                if !content.is_empty() {
                    output.push_str(content);
                    output.push('\n');
                }
                if let Some(id) = amends {
                    output.push_str(&format!("{} {}\n", "Corrects:".dimmed(), id));
                }
                output.push_str(&format!("{}\n", "Tool Calls:".cyan()));
                for call in invocations {
                    output.push_str(&format!("  {} ({})\n", call.tool_name.bold(), call.id));
                    output.push_str(&format!(" Call ID: {}\n", call.id));
                    if !call.arguments.is_empty() {
                        output.push_str("  Args:\n");
                        for (key, value) in &call.arguments {
                            let shown = value
                                .as_str()
                                .map(str::to_string)
                                .unwrap_or_else(|| value.to_string());
                            output.push_str(&format!("    {}: {}\n", key, shown));
                        }
                    }
                }
            }
            Message::ToolOutput {
                tool_name,
                content,
                is_error,
                ..
            } => {
                output.push_str(&format!("Name: {}\n\n", tool_name));
                if *is_error {
                    output.push_str(&format!("{}\n", content.red()));
                } else {
                    output.push_str(content);
                    output.push('\n');
                }
            }
            other => {
                output.push_str(other.text());
                output.push('\n');
            }
        }

        output
    }

    /// The session's final answer, or a note that there is none.
    pub fn format_answer(state: &ConversationState) -> String {
        match state.final_answer() {
            Some(answer) => answer.to_string(),
            None => "(no answer)".yellow().to_string(),
        }
    }

    /// The transcript as pretty JSON.
    pub fn format_json(state: &ConversationState) -> String {
        serde_json::to_string_pretty(state.messages()).unwrap_or_else(|_| "[]".to_string())
    }

    fn title(title: &str) -> String {
        let padded = format!(" {} ", title);
        let side = RULE_WIDTH.saturating_sub(padded.len()) / 2;
        let left = "=".repeat(side);
        let right = if padded.len() % 2 == 1 {
            "=".repeat(side + 1)
        } else {
            left.clone()
        };
        format!("{}{}{}", left, padded.bold(), right)
    }
}
