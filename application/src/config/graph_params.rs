//! Graph parameters: loop control for the question-answering use cases.
//!
//! [`GraphParams`] groups the static knobs that bound the orchestration graph
//! and the ReAct loop. These are application-layer concerns, not domain policy.

use serde::{Deserialize, Serialize};
use sql_agent_domain::DEFAULT_TOP_K;

/// Loop control parameters.
///
/// | Field            | Used by                 | `0` means  |
/// |------------------|-------------------------|------------|
/// | `max_iterations` | AnswerQuestionUseCase   | unbounded  |
/// | `top_k`          | both (prompt wording)   | -          |
/// | `max_tool_turns` | RunReactUseCase         | unbounded  |
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphParams {
    /// Maximum number of query generation passes.
    pub max_iterations: usize,
    /// Row limit suggested to the model.
    pub top_k: usize,
    /// Maximum tool rounds in the ReAct loop.
    pub max_tool_turns: usize,
}

impl Default for GraphParams {
    fn default() -> Self {
        Self {
            max_iterations: 25,
            top_k: DEFAULT_TOP_K,
            max_tool_turns: 10,
        }
    }
}

impl GraphParams {
    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_max_tool_turns(mut self, max: usize) -> Self {
        self.max_tool_turns = max;
        self
    }

    /// The iteration guard, or `None` when unbounded.
    pub fn iteration_limit(&self) -> Option<usize> {
        (self.max_iterations > 0).then_some(self.max_iterations)
    }

    /// The tool turn guard, or `None` when unbounded.
    pub fn tool_turn_limit(&self) -> Option<usize> {
        (self.max_tool_turns > 0).then_some(self.max_tool_turns)
    }
}
