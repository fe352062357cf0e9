//! Completion service port
//!
//! Defines the interface to the hosted text-generation model.

use async_trait::async_trait;
use sql_agent_domain::{Message, ToolDefinition};
use thiserror::Error;

/// Errors raised while talking to the completion service.
///
/// These are never handled inside the graph: they abort the current step
/// and end the session.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout")]
    Timeout,

    #[error("Other error: {0}")]
    Other(String),
}

/// How the model may use the tools offered with a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolChoice {
    /// The model decides whether to call a tool or answer in text.
    Auto,
    /// The model must call one of the offered tools.
    Required,
}

impl ToolChoice {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolChoice::Auto => "auto",
            ToolChoice::Required => "required",
        }
    }
}

/// Port for generating the next assistant message.
///
/// Implementations return either [`Message::Assistant`] (free text) or
/// [`Message::ToolRequest`] (one or more invocations of the offered tools).
/// Implementations live in the infrastructure layer; tests use scripted
/// doubles.
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Model identifier, for logs.
    fn model_name(&self) -> &str;

    /// Generate a response to `messages`, optionally offering `tools`.
    async fn generate(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
        choice: ToolChoice,
    ) -> Result<Message, ServiceError>;
}
