//! Graph node trait: one step in a StateGraph.

use async_trait::async_trait;

use super::GraphError;

/// One step in a graph: state in, state out.
///
/// Routing is not the node's concern; edges registered on the
/// [`StateGraph`](super::StateGraph) decide what runs next.
#[async_trait]
pub trait Node<S>: Send + Sync
where
    S: Clone + Send + Sync + 'static,
{
    /// Node id (e.g. `"generate_query"`). Must be unique within a graph.
    fn id(&self) -> &str;

    /// Run the step. Errors abort the run.
    async fn run(&self, state: S) -> Result<S, GraphError>;
}
