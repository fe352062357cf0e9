//! Graph construction and execution errors.

use crate::ports::completion_service::ServiceError;
use thiserror::Error;

/// Errors detected by [`StateGraph::compile`](super::StateGraph::compile).
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CompilationError {
    #[error("No entry point set")]
    NoEntryPoint,

    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Node {0} has more than one outgoing edge")]
    DuplicateEdge(String),
}

/// Errors that stop a running graph.
#[derive(Error, Debug)]
pub enum GraphError {
    /// The completion service failed; not retried.
    #[error("Completion service error: {0}")]
    Service(#[from] ServiceError),

    /// A node could not do its work.
    #[error("Node {node} failed: {message}")]
    Node { node: String, message: String },

    /// A conditional edge routed to an unregistered node.
    #[error("Routed to unknown node: {0}")]
    UnknownNode(String),

    /// The query generation loop reached its configured maximum.
    #[error("Iteration limit of {limit} query generation passes reached")]
    IterationLimit { limit: usize },

    /// The engine ran more nodes than allowed in a single run.
    #[error("Recursion limit of {limit} steps reached")]
    RecursionLimit { limit: usize },
}

impl GraphError {
    pub fn node(node: impl Into<String>, message: impl Into<String>) -> Self {
        GraphError::Node {
            node: node.into(),
            message: message.into(),
        }
    }

    /// Whether the error came from a loop guard rather than a failure.
    pub fn is_limit(&self) -> bool {
        matches!(
            self,
            GraphError::IterationLimit { .. } | GraphError::RecursionLimit { .. }
        )
    }
}
