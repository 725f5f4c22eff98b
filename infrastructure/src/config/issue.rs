//! Configuration validation issues and load errors

use roundtable_domain::{DomainError, TemplateError, TemplateKind};
use thiserror::Error;

/// Severity level of a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Fatal: a discussion cannot start with this configuration.
    Error,
    /// Non-fatal: the value is ignored or adjusted.
    Warning,
}

/// Identifies a specific configuration issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigIssueCode {
    MissingApiKey,
    EmptyModelName { field: String },
    InvalidConstraint { field: String },
    InvalidTemplate { kind: TemplateKind },
}

/// A detected issue in the merged configuration.
#[derive(Debug, Clone)]
pub struct ConfigIssue {
    pub severity: Severity,
    pub code: ConfigIssueCode,
    pub message: String,
}

impl ConfigIssue {
    pub fn error(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
        }
    }

    pub fn warning(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Errors that prevent building a session configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),

    #[error("Invalid configuration:\n{}", format_issues(.0))]
    Invalid(Vec<ConfigIssue>),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

fn format_issues(issues: &[ConfigIssue]) -> String {
    issues
        .iter()
        .map(|i| format!("  - {}", i.message))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_lists_every_issue() {
        let err = ConfigError::Invalid(vec![
            ConfigIssue::error(ConfigIssueCode::MissingApiKey, "api.api_key is not set"),
            ConfigIssue::error(
                ConfigIssueCode::InvalidConstraint {
                    field: "discussion.max_workers".to_string(),
                },
                "discussion.max_workers must be at least 1",
            ),
        ]);
        assert_eq!(
            err.to_string(),
            "Invalid configuration:\n  - api.api_key is not set\n  - discussion.max_workers must be at least 1"
        );
    }
}
