//! Routing decision produced by a conditional edge.

/// Name of the virtual terminal node, usable as a static edge target.
pub const END: &str = "__end__";

/// Where to go after a node has run.
///
/// - **Node(id)**: run the node with that id next.
/// - **End**: stop; the current state is the final result.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Next {
    Node(String),
    End,
}

impl Next {
    pub fn node(id: impl Into<String>) -> Self {
        Next::Node(id.into())
    }
}
