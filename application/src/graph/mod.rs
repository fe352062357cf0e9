//! Minimal state-graph engine.
//!
//! A graph is a set of [`Node`]s over a shared state `S`, connected by static
//! edges or by conditional edges whose router inspects the state after a node
//! ran. Build with [`StateGraph`], then [`compile`](StateGraph::compile) into a
//! [`CompiledGraph`] that can be run to completion
//! ([`invoke`](CompiledGraph::invoke)) or stepped lazily
//! ([`stream`](CompiledGraph::stream)).
//!
//! ```text
//! StateGraph::new()
//!   .add_node(a).add_node(b)
//!   .set_entry_point("a")
//!   .add_edge("a", "b")
//!   .add_conditional_edges("b", |s| if done(s) { Next::End } else { Next::node("a") })
//!   .compile()?  ──▶  CompiledGraph::stream(state) ──▶ Snapshot, Snapshot, ...
//! ```

mod compiled;
mod error;
mod next;
mod node;
mod state_graph;

pub use compiled::{CompiledGraph, Snapshot};
pub use error::{CompilationError, GraphError};
pub use next::{END, Next};
pub use node::Node;
pub use state_graph::StateGraph;
