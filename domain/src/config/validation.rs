//! Configuration validation issues.
//!
//! Config loading never fails on a bad value: the offending field falls back
//! to its default and a [`ConfigIssue`] is reported so the CLI can warn.

/// Severity level of a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Fatal: the configuration cannot work at all.
    Error,
    /// Non-fatal: the configuration works but may not behave as expected.
    Warning,
}

/// Identifies a specific configuration issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigIssueCode {
    /// A string field holds a value outside its accepted set.
    InvalidEnumValue {
        field: String,
        value: String,
        valid_values: Vec<String>,
    },
    /// A required string field is empty.
    EmptyValue { field: String },
    /// A numeric field is outside its useful range.
    OutOfRange { field: String, value: String },
}

/// A detected issue in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigIssue {
    pub severity: Severity,
    pub code: ConfigIssueCode,
    pub message: String,
}

impl ConfigIssue {
    pub fn warning(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
        }
    }

    pub fn error(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors_set_severity() {
        let issue = ConfigIssue::warning(
            ConfigIssueCode::EmptyValue {
                field: "llm.model".to_string(),
            },
            "llm.model is empty",
        );
        assert_eq!(issue.severity, Severity::Warning);
        assert!(!issue.is_error());

        let issue = ConfigIssue::error(
            ConfigIssueCode::EmptyValue {
                field: "database.url".to_string(),
            },
            "database.url is empty",
        );
        assert!(issue.is_error());
    }
}
