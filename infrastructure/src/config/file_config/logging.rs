//! Logging configuration from TOML (`[logging]` section)

use serde::{Deserialize, Serialize};

/// Raw logging configuration from TOML
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// JSONL transcript of every graph step.
    pub conversation_log: Option<String>,
    /// Diagnostic log file, written in addition to stderr.
    pub file: Option<String>,
}
