//! Compiled graph: runs nodes from the entry point until END.

use std::collections::HashMap;
use std::sync::Arc;

use futures::StreamExt;
use futures::stream::{self, BoxStream};
use tracing::{debug, warn};

use super::error::GraphError;
use super::next::{END, Next};
use super::node::Node;
use crate::ports::progress::{GraphProgressNotifier, NoProgress};

pub(super) type Router<S> = Box<dyn Fn(&S) -> Next + Send + Sync>;

pub(super) enum Edge<S> {
    Static(String),
    Conditional(Router<S>),
}

/// State after one node ran.
#[derive(Debug, Clone)]
pub struct Snapshot<S> {
    /// Id of the node that produced `state`.
    pub node: String,
    /// 1-based count of nodes run so far.
    pub step: usize,
    pub state: S,
}

/// Immutable, validated graph. Built by [`StateGraph::compile`](super::StateGraph::compile).
pub struct CompiledGraph<S> {
    pub(super) nodes: HashMap<String, Arc<dyn Node<S>>>,
    pub(super) edges: HashMap<String, Edge<S>>,
    pub(super) entry: String,
    pub(super) recursion_limit: Option<usize>,
}

struct Cursor<S> {
    state: S,
    next: Option<String>,
    steps: usize,
}

impl<S> CompiledGraph<S>
where
    S: Clone + Send + Sync + 'static,
{
    pub fn entry_point(&self) -> &str {
        &self.entry
    }

    pub fn has_node(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Runs to completion and returns the final state.
    pub async fn invoke(&self, state: S) -> Result<S, GraphError> {
        let mut last = state.clone();
        let mut steps = self.stream(state);
        while let Some(snapshot) = steps.next().await {
            last = snapshot?.state;
        }
        Ok(last)
    }

    /// Lazily runs the graph, yielding one [`Snapshot`] per node.
    ///
    /// Nothing runs until the stream is polled. After an error the stream ends.
    pub fn stream(&self, state: S) -> BoxStream<'_, Result<Snapshot<S>, GraphError>> {
        self.stream_with_progress(state, &NoProgress)
    }

    /// Like [`stream`](Self::stream), reporting node start/completion to `progress`.
    pub fn stream_with_progress<'a>(
        &'a self,
        state: S,
        progress: &'a dyn GraphProgressNotifier,
    ) -> BoxStream<'a, Result<Snapshot<S>, GraphError>> {
        let start = Cursor {
            state,
            next: Some(self.entry.clone()),
            steps: 0,
        };

        stream::unfold(Some(start), move |cursor| async move {
            let Some(Cursor {
                state,
                next: Some(id),
                steps,
            }) = cursor
            else {
                return None;
            };

            if let Some(limit) = self.recursion_limit
                && steps >= limit
            {
                warn!(node = %id, limit, "Recursion limit reached");
                return Some((Err(GraphError::RecursionLimit { limit }), None));
            }

            let Some(node) = self.nodes.get(&id) else {
                return Some((Err(GraphError::UnknownNode(id)), None));
            };

            debug!(node = %id, step = steps + 1, "Running node");
            progress.on_node_start(&id);

            match node.run(state).await {
                Ok(state) => {
                    let step = steps + 1;
                    progress.on_node_complete(&id, step);
                    let next = self.next_after(&id, &state);
                    let snapshot = Snapshot {
                        node: id,
                        step,
                        state: state.clone(),
                    };
                    Some((Ok(snapshot), Some(Cursor { state, next, steps: step })))
                }
                Err(e) => {
                    progress.on_node_failed(&id, &e.to_string());
                    Some((Err(e), None))
                }
            }
        })
        .boxed()
    }

    fn next_after(&self, id: &str, state: &S) -> Option<String> {
        match self.edges.get(id)? {
            Edge::Static(to) if to == END => None,
            Edge::Static(to) => Some(to.clone()),
            Edge::Conditional(router) => match router(state) {
                Next::Node(to) if to != END => Some(to),
                _ => None,
            },
        }
    }
}
