//! Discussion settings from TOML (`[discussion]` section)

use roundtable_domain::{Model, Topic};
use serde::{Deserialize, Serialize};

pub const DEFAULT_INITIAL_ROUNDS: u32 = 3;

/// A model list, either as a TOML array or a comma-separated string
/// (the form the `MODELS` environment variable takes).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ModelList {
    List(Vec<String>),
    Csv(String),
}

impl ModelList {
    /// Raw entries, blanks included
    pub fn entries(&self) -> Vec<&str> {
        match self {
            ModelList::List(items) => items.iter().map(String::as_str).collect(),
            ModelList::Csv(csv) => csv.split(',').collect(),
        }
    }

    /// Parsed models, blanks skipped and duplicates dropped
    pub fn models(&self) -> Vec<Model> {
        let mut models: Vec<Model> = Vec::new();
        for model in self.entries().into_iter().filter_map(Model::try_new) {
            if !models.contains(&model) {
                models.push(model);
            }
        }
        models
    }
}

/// Raw discussion configuration
///
/// # Example
///
/// ```toml
/// [discussion]
/// models = ["gpt-4o", "deepseek-chat", "qwen-max"]
/// topic = "Is open-source AI safer?"
/// initial_rounds = 3
/// max_workers = 5
/// temperature_min = 0.4
/// temperature_max = 1.2
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileDiscussionConfig {
    /// Participants; when unset, models are discovered from the backend
    pub models: Option<ModelList>,
    pub topic: Option<String>,
    /// Rounds before the first decision; unset means ask (or the default)
    pub initial_rounds: Option<u32>,
    pub max_workers: usize,
    pub temperature_min: f64,
    pub temperature_max: f64,
}

impl Default for FileDiscussionConfig {
    fn default() -> Self {
        Self {
            models: None,
            topic: None,
            initial_rounds: None,
            max_workers: 5,
            temperature_min: 0.4,
            temperature_max: 1.2,
        }
    }
}

impl FileDiscussionConfig {
    /// Configured participants (empty when discovery should be used)
    pub fn models(&self) -> Vec<Model> {
        self.models.as_ref().map(ModelList::models).unwrap_or_default()
    }

    pub fn initial_rounds(&self) -> u32 {
        self.initial_rounds.unwrap_or(DEFAULT_INITIAL_ROUNDS)
    }

    pub fn topic(&self) -> Option<Topic> {
        self.topic.as_deref().and_then(Topic::try_new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_models_from_array_or_csv() {
        let config: super::super::FileConfig = toml::from_str(
            r#"
[discussion]
models = ["gpt-4o", "qwen-max"]
"#,
        )
        .unwrap();
        assert_eq!(config.discussion.models().len(), 2);

        let csv = ModelList::Csv("gpt-4o, qwen-max,,gpt-4o".to_string());
        let names: Vec<_> = csv.models().iter().map(|m| m.to_string()).collect();
        assert_eq!(names, vec!["gpt-4o", "qwen-max"]);
    }

    #[test]
    fn test_blank_topic_is_none() {
        let config = FileDiscussionConfig {
            topic: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(config.topic().is_none());
    }
}
