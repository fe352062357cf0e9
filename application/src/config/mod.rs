//! Application-level configuration.
//!
//! - [`GraphParams`]: loop control for the orchestration graph and the ReAct agent

pub mod graph_params;

pub use graph_params::GraphParams;
