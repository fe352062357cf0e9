//! Question value object

use super::error::DomainError;
use serde::{Deserialize, Serialize};

/// A natural-language question about the database (Value Object)
///
/// Becomes the first user message of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    content: String,
}

impl Question {
    /// Create a question, rejecting empty or whitespace-only content.
    pub fn new(content: impl Into<String>) -> Result<Self, DomainError> {
        let content = content.into();
        if content.trim().is_empty() {
            return Err(DomainError::InvalidQuestion(
                "question cannot be empty".to_string(),
            ));
        }
        Ok(Self {
            content: content.trim().to_string(),
        })
    }

    /// Get the question content
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Consume and return the inner content
    pub fn into_content(self) -> String {
        self.content
    }
}

impl std::fmt::Display for Question {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.content)
    }
}

impl std::str::FromStr for Question {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Question::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_question_creation() {
        let q = Question::new("Which sales agent made the most in sales in 2009?").unwrap();
        assert_eq!(
            q.content(),
            "Which sales agent made the most in sales in 2009?"
        );
    }

    #[test]
    fn test_question_is_trimmed() {
        let q: Question = "  How many albums?  ".parse().unwrap();
        assert_eq!(q.content(), "How many albums?");
    }

    #[test]
    fn test_empty_question_rejected() {
        assert!(matches!(
            Question::new(""),
            Err(DomainError::InvalidQuestion(_))
        ));
        assert!(Question::new("   \n").is_err());
    }
}
