//! Application layer for sql-agent
//!
//! This crate contains the graph engine, use cases, port definitions and
//! application configuration. It depends only on the domain layer.

pub mod config;
pub mod graph;
pub mod ports;
pub mod tools;
pub mod use_cases;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used types
pub use config::GraphParams;
pub use graph::{CompilationError, CompiledGraph, GraphError, Next, Node, Snapshot, StateGraph};
pub use ports::{
    completion_service::{CompletionService, ServiceError, ToolChoice},
    conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger},
    progress::{GraphProgressNotifier, NoProgress},
    relational_store::{RelationalStore, StoreError},
    tool_executor::ToolExecutorPort,
    tool_schema::ToolSchemaPort,
};
pub use tools::SqlToolSet;
pub use use_cases::answer_question::{AnswerQuestionError, AnswerQuestionUseCase, StepStream};
pub use use_cases::run_react::{RunReactError, RunReactUseCase};
