//! Agent mode value object

use serde::{Deserialize, Serialize};

/// Which agent answers the question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentMode {
    /// Fixed orchestration graph: list tables, fetch schema, generate,
    /// check and run queries (default)
    #[default]
    Graph,
    /// Free-form tool loop over the whole tool catalog
    React,
}

impl AgentMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentMode::Graph => "graph",
            AgentMode::React => "react",
        }
    }
}

impl std::str::FromStr for AgentMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "graph" => Ok(AgentMode::Graph),
            "react" => Ok(AgentMode::React),
            other => Err(format!("unknown agent mode: {}", other)),
        }
    }
}

impl std::fmt::Display for AgentMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_modes() {
        assert_eq!("Graph".parse::<AgentMode>().unwrap(), AgentMode::Graph);
        assert_eq!("react".parse::<AgentMode>().unwrap(), AgentMode::React);
        assert!("swarm".parse::<AgentMode>().is_err());
    }
}
