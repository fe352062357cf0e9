//! Domain layer for sql-agent
//!
//! This crate contains the value types the orchestration graph works on.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! - **Conversation**: an append-only transcript ([`ConversationState`]) of
//!   user text, model text, tool requests and tool outputs
//! - **Tools**: named, schema-bound database operations the model may ask for
//!   ([`ToolDefinition`], [`ToolInvocation`], [`ToolResult`])
//! - **SQL**: the store's [`Dialect`] and tabular [`QueryRows`]
//! - **Prompts**: dialect-parameterised instructions ([`SqlPromptTemplate`])

pub mod config;
pub mod conversation;
pub mod core;
pub mod prompt;
pub mod sql;
pub mod tool;
pub mod util;

// Re-export commonly used types
pub use config::{AgentMode, ConfigIssue, ConfigIssueCode, OutputFormat, Severity};
pub use conversation::{ConversationState, Message};
pub use core::{error::DomainError, question::Question};
pub use prompt::{DEFAULT_TOP_K, SqlPromptTemplate};
pub use sql::{Dialect, QueryRows, SqlValue};
pub use tool::{
    DefaultToolValidator, InvocationId, ToolDefinition, ToolError, ToolInvocation, ToolParameter,
    ToolResult, ToolResultMetadata, ToolSpec, ToolValidator,
};
