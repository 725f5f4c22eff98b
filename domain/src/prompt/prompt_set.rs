//! The five templates a discussion renders from

use super::template::{Placeholder, PromptParams, PromptTemplate, TemplateError, TemplateKind};

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are taking part in a multi-model roundtable discussion.
Topic: \"{topic}\"
Participants: {participants}

Rules:
1. Speak as yourself, with your own position and perspective
2. Read the other participants' views carefully; you may agree, rebut or extend them
3. Back your views with clear logic and evidence
4. Avoid empty platitudes and give real analysis
5. Keep each contribution under 300 words";

pub const DEFAULT_FIRST_ROUND_PROMPT: &str = "# Agent
[Round {current_round}/{total_rounds} | {remaining} remaining]

You are {model_name}. Open the discussion with your view on \"{topic}\".
State your position, then give your core arguments and the evidence behind them.";

pub const DEFAULT_DISCUSSION_PROMPT: &str = "# Agent
[Round {current_round}/{total_rounds} | {remaining} remaining]

You are {model_name}. Here is what the other participants said in the previous round:
{others_text}

Take the discussion on \"{topic}\" further. You may:
- rebut points you disagree with and say why
- add angles the others missed
- push someone else's reasoning further
- revise or refine your own earlier position";

pub const DEFAULT_HUMAN_GUIDE_PROMPT: &str = "# Human
Guidance from the moderator:
{human_input}

Adjust the direction and focus of your contributions accordingly.";

pub const DEFAULT_SUMMARY_PROMPT: &str = "# Agent
[Final summary]

You are {model_name}. The discussion on \"{topic}\" is ending. Please summarize:
1. Your final position
2. The most valuable points raised, including other participants'
3. Disagreements that remain or questions still open";

/// Format the previous-round contributions of everyone but the viewer.
///
/// Each entry is `(author, content)`; entries appear in the order given.
pub fn format_others_text<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> String {
    entries
        .into_iter()
        .map(|(author, content)| format!("---\n[{author}]:\n{content}"))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Validated templates for every prompt a discussion sends
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptSet {
    system: PromptTemplate,
    first_round: PromptTemplate,
    discussion: PromptTemplate,
    human_guide: PromptTemplate,
    summary: PromptTemplate,
}

/// Optional template overrides, one per kind
#[derive(Debug, Clone, Default)]
pub struct PromptOverrides {
    pub system: Option<String>,
    pub first_round: Option<String>,
    pub discussion: Option<String>,
    pub human_guide: Option<String>,
    pub summary: Option<String>,
}

impl PromptSet {
    /// Parse overrides, falling back to the built-in template for each kind
    /// left unset. All templates are validated; the first error is returned.
    pub fn from_overrides(overrides: &PromptOverrides) -> Result<Self, TemplateError> {
        let pick = |kind, custom: &Option<String>, default: &str| {
            PromptTemplate::parse(kind, custom.as_deref().unwrap_or(default))
        };
        Ok(Self {
            system: pick(TemplateKind::System, &overrides.system, DEFAULT_SYSTEM_PROMPT)?,
            first_round: pick(
                TemplateKind::FirstRound,
                &overrides.first_round,
                DEFAULT_FIRST_ROUND_PROMPT,
            )?,
            discussion: pick(
                TemplateKind::Discussion,
                &overrides.discussion,
                DEFAULT_DISCUSSION_PROMPT,
            )?,
            human_guide: pick(
                TemplateKind::HumanGuide,
                &overrides.human_guide,
                DEFAULT_HUMAN_GUIDE_PROMPT,
            )?,
            summary: pick(TemplateKind::Summary, &overrides.summary, DEFAULT_SUMMARY_PROMPT)?,
        })
    }

    /// The built-in templates
    pub fn builtin() -> Result<Self, TemplateError> {
        Self::from_overrides(&PromptOverrides::default())
    }

    /// Render the directive for one participant
    pub fn system(
        &self,
        model_name: &str,
        topic: &str,
        participants: &str,
    ) -> Result<String, TemplateError> {
        self.system.render(
            &PromptParams::new()
                .with(Placeholder::ModelName, model_name)
                .with(Placeholder::Topic, topic)
                .with(Placeholder::Participants, participants),
        )
    }

    /// Whether the directive differs between participants
    pub fn system_is_personal(&self) -> bool {
        self.system
            .placeholders()
            .any(|p| p == Placeholder::ModelName)
    }

    pub fn first_round(
        &self,
        position: RoundPosition,
        model_name: &str,
        topic: &str,
    ) -> Result<String, TemplateError> {
        self.first_round.render(
            &position
                .params()
                .with(Placeholder::ModelName, model_name)
                .with(Placeholder::Topic, topic),
        )
    }

    pub fn discussion(
        &self,
        position: RoundPosition,
        model_name: &str,
        topic: &str,
        others_text: &str,
    ) -> Result<String, TemplateError> {
        self.discussion.render(
            &position
                .params()
                .with(Placeholder::ModelName, model_name)
                .with(Placeholder::Topic, topic)
                .with(Placeholder::OthersText, others_text),
        )
    }

    pub fn human_guide(&self, human_input: &str) -> Result<String, TemplateError> {
        self.human_guide
            .render(&PromptParams::new().with(Placeholder::HumanInput, human_input))
    }

    pub fn summary(&self, model_name: &str, topic: &str) -> Result<String, TemplateError> {
        self.summary.render(
            &PromptParams::new()
                .with(Placeholder::ModelName, model_name)
                .with(Placeholder::Topic, topic),
        )
    }
}

/// Where a round sits in the plan, for the round-header placeholders
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundPosition {
    pub current: u32,
    pub total: u32,
}

impl RoundPosition {
    pub fn new(current: u32, total: u32) -> Self {
        Self { current, total }
    }

    pub fn remaining(&self) -> u32 {
        self.total.saturating_sub(self.current)
    }

    fn params(&self) -> PromptParams {
        PromptParams::new()
            .with(Placeholder::CurrentRound, self.current)
            .with(Placeholder::TotalRounds, self.total)
            .with(Placeholder::Remaining, self.remaining())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_parse() {
        let set = PromptSet::builtin().unwrap();
        assert_eq!(set.discussion.placeholders().count(), 6);
        assert!(!set.system_is_personal());
    }

    #[test]
    fn test_system_prompt_may_name_the_participant() {
        let overrides = PromptOverrides {
            system: Some("You are {model_name}, discussing {topic} with {participants}".to_string()),
            ..Default::default()
        };
        let set = PromptSet::from_overrides(&overrides).unwrap();

        assert!(set.system_is_personal());
        assert_eq!(
            set.system("qwen-max", "tariffs", "gpt-4o, qwen-max").unwrap(),
            "You are qwen-max, discussing tariffs with gpt-4o, qwen-max"
        );
    }

    #[test]
    fn test_default_prompts_render() {
        let set = PromptSet::builtin().unwrap();

        let system = set.system("a", "Remote work", "a, b, c").unwrap();
        assert!(system.contains("Topic: \"Remote work\""));
        assert!(system.contains("Participants: a, b, c"));

        let first = set.first_round(RoundPosition::new(1, 3), "a", "Remote work").unwrap();
        assert!(first.starts_with("# Agent\n[Round 1/3 | 2 remaining]"));
        assert!(first.contains("You are a."));

        let guide = set.human_guide("focus on cost").unwrap();
        assert!(guide.contains("focus on cost"));
    }

    #[test]
    fn test_override_is_validated() {
        let overrides = PromptOverrides {
            summary: Some("Summarize {others_text}".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            PromptSet::from_overrides(&overrides),
            Err(TemplateError::UnknownPlaceholder {
                kind: TemplateKind::Summary,
                ..
            })
        ));
    }

    #[test]
    fn test_override_replaces_default() {
        let overrides = PromptOverrides {
            human_guide: Some("HUMAN: {human_input}".to_string()),
            ..Default::default()
        };
        let set = PromptSet::from_overrides(&overrides).unwrap();
        assert_eq!(set.human_guide("stop").unwrap(), "HUMAN: stop");
    }

    #[test]
    fn test_format_others_text() {
        let text = format_others_text([("b", "I disagree."), ("c", "Agreed.")]);
        assert_eq!(text, "---\n[b]:\nI disagree.\n\n---\n[c]:\nAgreed.");
        assert_eq!(format_others_text(Vec::<(&str, &str)>::new()), "");
    }

    #[test]
    fn test_round_position_remaining() {
        assert_eq!(RoundPosition::new(3, 3).remaining(), 0);
        assert_eq!(RoundPosition::new(4, 5).remaining(), 1);
    }
}
