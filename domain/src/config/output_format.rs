//! Output format value object

use serde::{Deserialize, Serialize};

/// How a finished (or in-progress) session is shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Every snapshot's newly appended messages, as they are produced
    Steps,
    /// Only the final answer (default)
    #[default]
    Answer,
    /// The final transcript as JSON
    Json,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Steps => "steps",
            OutputFormat::Answer => "answer",
            OutputFormat::Json => "json",
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "steps" | "full" => Ok(OutputFormat::Steps),
            "answer" => Ok(OutputFormat::Answer),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("unknown output format: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_answer() {
        assert_eq!(OutputFormat::default(), OutputFormat::Answer);
    }

    #[test]
    fn test_serialize_lowercase() {
        let json = serde_json::to_string(&OutputFormat::Steps).unwrap();
        assert_eq!(json, "\"steps\"");
    }

    #[test]
    fn test_parse_accepts_full_alias() {
        assert_eq!("full".parse::<OutputFormat>().unwrap(), OutputFormat::Steps);
        assert!("yaml".parse::<OutputFormat>().is_err());
    }
}
