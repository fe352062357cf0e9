//! Output configuration from TOML (`[output]` section)

use serde::{Deserialize, Serialize};
use sql_agent_domain::{ConfigIssue, ConfigIssueCode, OutputFormat};

/// Raw output configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOutputConfig {
    /// "steps", "answer" or "json"
    pub format: String,
    /// Enable colored terminal output
    pub color: bool,
}

impl Default for FileOutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default().as_str().to_string(),
            color: true,
        }
    }
}

impl FileOutputConfig {
    /// Parse `format`, falling back to the default with a warning.
    pub fn parse_format(&self) -> (OutputFormat, Vec<ConfigIssue>) {
        match self.format.parse::<OutputFormat>() {
            Ok(format) => (format, Vec::new()),
            Err(_) => (
                OutputFormat::default(),
                vec![ConfigIssue::warning(
                    ConfigIssueCode::InvalidEnumValue {
                        field: "output.format".to_string(),
                        value: self.format.clone(),
                        valid_values: vec![
                            "steps".to_string(),
                            "answer".to_string(),
                            "json".to_string(),
                        ],
                    },
                    format!(
                        "output.format: unknown value '{}', falling back to 'answer'",
                        self.format
                    ),
                )],
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_deserialize() {
        let toml_str = r#"
[output]
format = "json"
"#;
        let config: super::super::FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.output.parse_format().0, OutputFormat::Json);
    }

    #[test]
    fn test_full_is_alias_for_steps() {
        let config = FileOutputConfig {
            format: "full".to_string(),
            color: true,
        };
        assert_eq!(config.parse_format(), (OutputFormat::Steps, vec![]));
    }
}
