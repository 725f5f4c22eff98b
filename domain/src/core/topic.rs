//! Topic value object

use serde::{Deserialize, Serialize};

/// The subject of a discussion (Value Object)
///
/// Rendered into every prompt through the `topic` placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    content: String,
}

impl Topic {
    /// Try to create a new topic, returning None if blank
    pub fn try_new(content: impl Into<String>) -> Option<Self> {
        let content = content.into();
        let trimmed = content.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self {
                content: trimmed.to_string(),
            })
        }
    }

    /// Get the topic text
    pub fn content(&self) -> &str {
        &self.content
    }
}

impl std::fmt::Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.content)
    }
}

impl std::str::FromStr for Topic {
    type Err = crate::core::error::DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Topic::try_new(s).ok_or_else(|| {
            crate::core::error::DomainError::InvalidTopic("topic cannot be empty".to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_creation() {
        let topic = Topic::try_new("  Will AI replace programmers? ").unwrap();
        assert_eq!(topic.content(), "Will AI replace programmers?");
    }

    #[test]
    fn test_try_new_empty() {
        assert!(Topic::try_new("").is_none());
        assert!(Topic::try_new("   ").is_none());
        assert!("\n".parse::<Topic>().is_err());
    }
}
