//! Raw TOML configuration data types
//!
//! These structs mirror the config file. Every section is `#[serde(default)]`
//! so partial files (and the flat environment overrides) merge cleanly.

mod api;
mod budget;
mod discussion;
mod output;
mod prompts;

pub use api::{DEFAULT_BASE_URL, FileApiConfig};
pub use budget::FileBudgetConfig;
pub use discussion::{DEFAULT_INITIAL_ROUNDS, FileDiscussionConfig, ModelList};
pub use output::FileOutputConfig;
pub use prompts::FilePromptsConfig;

use super::issue::{ConfigError, ConfigIssue, ConfigIssueCode};
use roundtable_application::DiscussionConfig;
use roundtable_domain::{PromptSet, SamplingRange};
use serde::{Deserialize, Serialize};

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Backend endpoint and credentials
    pub api: FileApiConfig,
    /// Participants, topic and round settings
    pub discussion: FileDiscussionConfig,
    /// Token ceiling and reply reservation
    pub budget: FileBudgetConfig,
    /// Transcript and log locations
    pub output: FileOutputConfig,
    /// Prompt template overrides
    pub prompts: FilePromptsConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if self.api.api_key().is_none() {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::MissingApiKey,
                "api.api_key is not set (use API_KEY or [api] api_key)",
            ));
        }

        if let Some(list) = &self.discussion.models
            && list.entries().iter().any(|e| e.trim().is_empty())
        {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::EmptyModelName {
                    field: "discussion.models".to_string(),
                },
                "discussion.models: blank entries are ignored",
            ));
        }

        if self.budget.max_tokens <= self.budget.response_tokens as usize {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::InvalidConstraint {
                    field: "budget.max_tokens".to_string(),
                },
                format!(
                    "budget.max_tokens ({}) must exceed budget.response_tokens ({})",
                    self.budget.max_tokens, self.budget.response_tokens
                ),
            ));
        }

        if let Err(e) = self.sampling() {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::InvalidConstraint {
                    field: "discussion.temperature_min".to_string(),
                },
                format!("discussion: {}", e),
            ));
        }

        if self.discussion.max_workers == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::InvalidConstraint {
                    field: "discussion.max_workers".to_string(),
                },
                "discussion.max_workers must be at least 1",
            ));
        }

        if self.discussion.initial_rounds == Some(0) {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::InvalidConstraint {
                    field: "discussion.initial_rounds".to_string(),
                },
                "discussion.initial_rounds must be at least 1",
            ));
        }

        issues.extend(self.prompts.validate());
        issues
    }

    fn sampling(&self) -> Result<SamplingRange, roundtable_domain::DomainError> {
        SamplingRange::new(
            self.discussion.temperature_min,
            self.discussion.temperature_max,
        )
    }

    /// Build the immutable session configuration.
    ///
    /// Fails with every error-severity issue at once; warnings are left to
    /// the caller to report.
    pub fn to_discussion_config(&self) -> Result<DiscussionConfig, ConfigError> {
        let errors: Vec<ConfigIssue> = self
            .validate()
            .into_iter()
            .filter(ConfigIssue::is_error)
            .collect();
        if !errors.is_empty() {
            return Err(ConfigError::Invalid(errors));
        }

        let prompts = PromptSet::from_overrides(&self.prompts.to_overrides())?;
        Ok(DiscussionConfig::new(prompts)
            .with_budget(self.budget.max_tokens, self.budget.response_tokens)
            .with_sampling(self.sampling()?)
            .with_max_workers(self.discussion.max_workers)
            .with_initial_rounds(self.discussion.initial_rounds())
            .with_request_timeout(self.api.request_timeout()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn with_key(mut config: FileConfig) -> FileConfig {
        config.api.api_key = Some("sk-test".to_string());
        config
    }

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[api]
base_url = "http://localhost:8000/v1"
api_key = "sk-local"
request_timeout_secs = 90

[discussion]
models = "gpt-4o,deepseek-chat"
topic = "Tabs or spaces?"
initial_rounds = 2

[budget]
max_tokens = 8000
response_tokens = 512

[output]
output_dir = "out"
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.api.base_url, "http://localhost:8000/v1");
        assert_eq!(config.api.request_timeout(), Some(Duration::from_secs(90)));
        assert_eq!(config.discussion.models().len(), 2);
        assert_eq!(config.discussion.topic().unwrap().content(), "Tabs or spaces?");
        assert_eq!(config.discussion.initial_rounds(), 2);
        assert_eq!(config.budget.max_tokens, 8000);
        assert_eq!(config.output.output_dir.to_string_lossy(), "out");
        // Defaults should apply
        assert_eq!(config.output.log_dir.to_string_lossy(), "log");
        assert_eq!(config.discussion.max_workers, 5);
        assert_eq!(config.budget.tiktoken_model, "gpt-4o");
    }

    #[test]
    fn test_default_config() {
        let config = FileConfig::default();
        assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
        assert!(config.api.api_key().is_none());
        assert!(config.discussion.models().is_empty());
        assert_eq!(config.discussion.initial_rounds, None);
        assert_eq!(config.discussion.initial_rounds(), 3);
        assert_eq!(config.discussion.temperature_min, 0.4);
        assert_eq!(config.discussion.temperature_max, 1.2);
        assert_eq!(config.budget.response_tokens, 2048);
    }

    #[test]
    fn test_validate_defaults_only_missing_key() {
        let issues = FileConfig::default().validate();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].code, ConfigIssueCode::MissingApiKey);

        assert!(with_key(FileConfig::default()).validate().is_empty());
    }

    #[test]
    fn test_validate_collects_all_issues() {
        let mut config = with_key(FileConfig::default());
        config.budget.max_tokens = 1000;
        config.budget.response_tokens = 1000;
        config.discussion.temperature_min = 1.5;
        config.discussion.temperature_max = 0.5;
        config.discussion.max_workers = 0;

        let issues = config.validate();
        assert_eq!(issues.len(), 3);
        assert!(issues.iter().all(ConfigIssue::is_error));
    }

    #[test]
    fn test_to_discussion_config() {
        let mut config = with_key(FileConfig::default());
        config.budget.max_tokens = 4000;
        config.budget.response_tokens = 500;
        config.discussion.max_workers = 2;
        config.api.request_timeout_secs = Some(0);

        let discussion = config.to_discussion_config().unwrap();
        assert_eq!(discussion.budget.ceiling(), 3500);
        assert_eq!(discussion.max_workers, 2);
        assert_eq!(discussion.sampling.min(), 0.4);
        assert!(discussion.request_timeout.is_none());
    }

    #[test]
    fn test_to_discussion_config_rejects_errors() {
        let err = FileConfig::default().to_discussion_config().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(ref issues) if issues.len() == 1));
    }
}
