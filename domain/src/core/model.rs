//! Model value object identifying a backend model

use serde::{Deserialize, Serialize};

/// Identifier of a model served by an OpenAI-compatible backend (Value Object)
///
/// Backends expose arbitrary model ids (`gpt-4o`, `deepseek-chat`,
/// `qwen-max`, ...), so the identifier is kept verbatim. Surrounding
/// whitespace is stripped on construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Model(String);

impl Model {
    /// Create a model id, returning `None` for blank input
    pub fn try_new(id: impl AsRef<str>) -> Option<Self> {
        let id = id.as_ref().trim();
        if id.is_empty() {
            None
        } else {
            Some(Self(id.to_string()))
        }
    }

    /// Get the string identifier for this model
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse a comma-separated model list (`"gpt-4o, qwen-max,,"`), skipping blanks
    pub fn parse_list(list: &str) -> Vec<Model> {
        list.split(',').filter_map(Model::try_new).collect()
    }
}

impl std::fmt::Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Model {
    type Err = crate::core::error::DomainError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Model::try_new(s).ok_or_else(|| {
            crate::core::error::DomainError::InvalidModel("model id cannot be empty".to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_parse_trims() {
        let model: Model = "  gpt-4o ".parse().unwrap();
        assert_eq!(model.as_str(), "gpt-4o");
        assert_eq!(model.to_string(), "gpt-4o");
    }

    #[test]
    fn test_empty_model_rejected() {
        assert!("".parse::<Model>().is_err());
        assert!("   ".parse::<Model>().is_err());
    }

    #[test]
    fn test_parse_list_skips_blanks() {
        let models = Model::parse_list("gpt-4o, deepseek-chat,, ");
        assert_eq!(
            models,
            vec![
                Model::try_new("gpt-4o").unwrap(),
                Model::try_new("deepseek-chat").unwrap()
            ]
        );
    }

    #[test]
    fn test_serde_transparent() {
        let model = Model::try_new("qwen-max").unwrap();
        let json = serde_json::to_string(&model).unwrap();
        assert_eq!(json, "\"qwen-max\"");
        let back: Model = serde_json::from_str(&json).unwrap();
        assert_eq!(back, model);
    }
}
