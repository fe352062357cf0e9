//! State graph builder: nodes, static edges and conditional edges.

use std::collections::HashMap;
use std::sync::Arc;

use super::compiled::{CompiledGraph, Edge, Router};
use super::error::CompilationError;
use super::next::{END, Next};
use super::node::Node;

/// Graph under construction.
///
/// Generic over state type `S`. Every node has at most one outgoing edge,
/// either static (`add_edge`) or conditional (`add_conditional_edges`). A node
/// without an outgoing edge ends the run.
pub struct StateGraph<S> {
    nodes: HashMap<String, Arc<dyn Node<S>>>,
    edges: HashMap<String, Edge<S>>,
    entry: Option<String>,
    duplicate_edge: Option<String>,
    recursion_limit: Option<usize>,
}

impl<S> Default for StateGraph<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<S> StateGraph<S>
where
    S: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            edges: HashMap::new(),
            entry: None,
            duplicate_edge: None,
            recursion_limit: None,
        }
    }

    /// Adds a node under its own id. Replaces a node with the same id.
    pub fn add_node(mut self, node: impl Node<S> + 'static) -> Self {
        self.nodes.insert(node.id().to_string(), Arc::new(node));
        self
    }

    /// Node that runs first.
    pub fn set_entry_point(mut self, id: impl Into<String>) -> Self {
        self.entry = Some(id.into());
        self
    }

    /// Unconditional edge `from → to`. `to` may be [`END`].
    pub fn add_edge(self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.insert_edge(from.into(), Edge::Static(to.into()))
    }

    /// Edge whose target is chosen by `router` from the state `from` produced.
    pub fn add_conditional_edges<F>(self, from: impl Into<String>, router: F) -> Self
    where
        F: Fn(&S) -> Next + Send + Sync + 'static,
    {
        let router: Router<S> = Box::new(router);
        self.insert_edge(from.into(), Edge::Conditional(router))
    }

    /// Maximum number of node executions per run. Unlimited by default.
    pub fn with_recursion_limit(mut self, limit: usize) -> Self {
        self.recursion_limit = Some(limit);
        self
    }

    fn insert_edge(mut self, from: String, edge: Edge<S>) -> Self {
        if self.edges.contains_key(&from) && self.duplicate_edge.is_none() {
            self.duplicate_edge = Some(from.clone());
        }
        self.edges.insert(from, edge);
        self
    }

    /// Validates the structure and freezes it.
    ///
    /// Fails when no entry point is set, when an edge starts at or points to
    /// an unknown node, or when a node was given two outgoing edges.
    pub fn compile(self) -> Result<CompiledGraph<S>, CompilationError> {
        let entry = self.entry.ok_or(CompilationError::NoEntryPoint)?;
        if !self.nodes.contains_key(&entry) {
            return Err(CompilationError::NodeNotFound(entry));
        }
        if let Some(from) = self.duplicate_edge {
            return Err(CompilationError::DuplicateEdge(from));
        }
        for (from, edge) in &self.edges {
            if !self.nodes.contains_key(from) {
                return Err(CompilationError::NodeNotFound(from.clone()));
            }
            if let Edge::Static(to) = edge
                && to != END
                && !self.nodes.contains_key(to)
            {
                return Err(CompilationError::NodeNotFound(to.clone()));
            }
        }
        Ok(CompiledGraph {
            nodes: self.nodes,
            edges: self.edges,
            entry,
            recursion_limit: self.recursion_limit,
        })
    }
}
