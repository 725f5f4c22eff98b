//! Prompt template overrides from TOML (`[prompts]` section)

use crate::config::issue::{ConfigIssue, ConfigIssueCode};
use roundtable_domain::{PromptOverrides, PromptTemplate, TemplateKind};
use serde::{Deserialize, Serialize};

/// Raw prompt overrides; unset kinds use the built-in templates
///
/// # Example
///
/// ```toml
/// [prompts]
/// summary = "You are {model_name}. Summarize your stance on {topic} in three bullets."
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FilePromptsConfig {
    pub system: Option<String>,
    pub first_round: Option<String>,
    pub discussion: Option<String>,
    pub human_guide: Option<String>,
    pub summary: Option<String>,
}

impl FilePromptsConfig {
    fn get(&self, kind: TemplateKind) -> Option<&str> {
        match kind {
            TemplateKind::System => self.system.as_deref(),
            TemplateKind::FirstRound => self.first_round.as_deref(),
            TemplateKind::Discussion => self.discussion.as_deref(),
            TemplateKind::HumanGuide => self.human_guide.as_deref(),
            TemplateKind::Summary => self.summary.as_deref(),
        }
    }

    pub fn to_overrides(&self) -> PromptOverrides {
        PromptOverrides {
            system: self.system.clone(),
            first_round: self.first_round.clone(),
            discussion: self.discussion.clone(),
            human_guide: self.human_guide.clone(),
            summary: self.summary.clone(),
        }
    }

    /// Parse every override, one issue per broken template.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        TemplateKind::ALL
            .into_iter()
            .filter_map(|kind| {
                let source = self.get(kind)?;
                PromptTemplate::parse(kind, source).err().map(|e| {
                    ConfigIssue::error(
                        ConfigIssueCode::InvalidTemplate { kind },
                        format!("prompts.{}: {}", kind, e),
                    )
                })
            })
            .collect()
    }
}
