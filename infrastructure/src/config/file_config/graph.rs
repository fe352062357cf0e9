//! Graph configuration from TOML (`[graph]` section)

use serde::{Deserialize, Serialize};
use sql_agent_application::GraphParams;
use sql_agent_domain::{AgentMode, ConfigIssue, ConfigIssueCode};

/// Raw graph configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileGraphConfig {
    /// "graph" (orchestration graph) or "react" (prebuilt agent)
    pub mode: String,
    /// Query generation passes before giving up (0 = unbounded)
    pub max_iterations: usize,
    pub top_k: usize,
    /// Tool rounds in react mode (0 = unbounded)
    pub max_tool_turns: usize,
}

impl Default for FileGraphConfig {
    fn default() -> Self {
        let params = GraphParams::default();
        Self {
            mode: AgentMode::default().as_str().to_string(),
            max_iterations: params.max_iterations,
            top_k: params.top_k,
            max_tool_turns: params.max_tool_turns,
        }
    }
}

impl FileGraphConfig {
    /// Parse `mode`, falling back to the default with a warning.
    pub fn parse_mode(&self) -> (AgentMode, Vec<ConfigIssue>) {
        match self.mode.parse::<AgentMode>() {
            Ok(mode) => (mode, Vec::new()),
            Err(_) => (
                AgentMode::default(),
                vec![ConfigIssue::warning(
                    ConfigIssueCode::InvalidEnumValue {
                        field: "graph.mode".to_string(),
                        value: self.mode.clone(),
                        valid_values: vec!["graph".to_string(), "react".to_string()],
                    },
                    format!(
                        "graph.mode: unknown value '{}', falling back to 'graph'",
                        self.mode
                    ),
                )],
            ),
        }
    }

    pub fn to_graph_params(&self) -> GraphParams {
        GraphParams::default()
            .with_max_iterations(self.max_iterations)
            .with_top_k(self.top_k)
            .with_max_tool_turns(self.max_tool_turns)
    }
}
