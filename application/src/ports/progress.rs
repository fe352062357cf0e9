//! Progress notification port
//!
//! Reports graph execution node by node. Implementations live in the
//! presentation layer (spinners, plain logs).

/// Callback for progress updates while a graph runs.
pub trait GraphProgressNotifier: Send + Sync {
    /// Called before a node runs.
    fn on_node_start(&self, node: &str);

    /// Called after a node completed; `step` counts completed nodes from 1.
    fn on_node_complete(&self, node: &str, step: usize);

    /// Called when a node failed and the run stops.
    fn on_node_failed(&self, _node: &str, _error: &str) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl GraphProgressNotifier for NoProgress {
    fn on_node_start(&self, _node: &str) {}
    fn on_node_complete(&self, _node: &str, _step: usize) {}
}
