//! Named-placeholder prompt templates
//!
//! Templates use `{name}` placeholders; `{{` and `}}` produce literal braces.
//! Each [`TemplateKind`] accepts a fixed set of placeholders, checked once at
//! parse time so rendering can never hit an unknown name.

use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

/// Which prompt a template renders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateKind {
    System,
    FirstRound,
    Discussion,
    HumanGuide,
    Summary,
}

impl TemplateKind {
    pub const ALL: [TemplateKind; 5] = [
        TemplateKind::System,
        TemplateKind::FirstRound,
        TemplateKind::Discussion,
        TemplateKind::HumanGuide,
        TemplateKind::Summary,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateKind::System => "system",
            TemplateKind::FirstRound => "first_round",
            TemplateKind::Discussion => "discussion",
            TemplateKind::HumanGuide => "human_guide",
            TemplateKind::Summary => "summary",
        }
    }

    /// Placeholders this kind may reference
    pub fn allowed(&self) -> &'static [Placeholder] {
        use Placeholder::*;
        match self {
            TemplateKind::System => &[ModelName, Topic, Participants],
            TemplateKind::FirstRound => &[CurrentRound, TotalRounds, Remaining, ModelName, Topic],
            TemplateKind::Discussion => &[
                CurrentRound,
                TotalRounds,
                Remaining,
                ModelName,
                Topic,
                OthersText,
            ],
            TemplateKind::HumanGuide => &[HumanInput],
            TemplateKind::Summary => &[ModelName, Topic],
        }
    }
}

impl std::fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A recognized placeholder name
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Placeholder {
    ModelName,
    Topic,
    Participants,
    CurrentRound,
    TotalRounds,
    Remaining,
    OthersText,
    HumanInput,
}

impl Placeholder {
    pub fn as_str(&self) -> &'static str {
        match self {
            Placeholder::ModelName => "model_name",
            Placeholder::Topic => "topic",
            Placeholder::Participants => "participants",
            Placeholder::CurrentRound => "current_round",
            Placeholder::TotalRounds => "total_rounds",
            Placeholder::Remaining => "remaining",
            Placeholder::OthersText => "others_text",
            Placeholder::HumanInput => "human_input",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "model_name" => Some(Placeholder::ModelName),
            "topic" => Some(Placeholder::Topic),
            "participants" => Some(Placeholder::Participants),
            "current_round" => Some(Placeholder::CurrentRound),
            "total_rounds" => Some(Placeholder::TotalRounds),
            "remaining" => Some(Placeholder::Remaining),
            "others_text" => Some(Placeholder::OthersText),
            "human_input" => Some(Placeholder::HumanInput),
            _ => None,
        }
    }
}

impl std::fmt::Display for Placeholder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("{kind} template: unknown placeholder {{{name}}}")]
    UnknownPlaceholder { kind: TemplateKind, name: String },

    #[error("{kind} template: unmatched '{brace}' at byte {position}")]
    UnmatchedBrace {
        kind: TemplateKind,
        brace: char,
        position: usize,
    },

    #[error("{kind} template: no value supplied for {{{placeholder}}}")]
    MissingParameter {
        kind: TemplateKind,
        placeholder: Placeholder,
    },
}

/// Values for a render call
#[derive(Debug, Clone, Default)]
pub struct PromptParams(BTreeMap<Placeholder, String>);

impl PromptParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, placeholder: Placeholder, value: impl ToString) -> Self {
        self.0.insert(placeholder, value.to_string());
        self
    }

    pub fn get(&self, placeholder: Placeholder) -> Option<&str> {
        self.0.get(&placeholder).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Slot(Placeholder),
}

/// A parsed, validated prompt template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    kind: TemplateKind,
    source: String,
    segments: Vec<Segment>,
}

impl PromptTemplate {
    pub fn parse(kind: TemplateKind, source: impl Into<String>) -> Result<Self, TemplateError> {
        let source = source.into();
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = source.char_indices().peekable();

        while let Some((pos, c)) = chars.next() {
            match c {
                '{' if matches!(chars.peek(), Some((_, '{'))) => {
                    chars.next();
                    literal.push('{');
                }
                '}' if matches!(chars.peek(), Some((_, '}'))) => {
                    chars.next();
                    literal.push('}');
                }
                '{' => {
                    let mut name = String::new();
                    let mut closed = false;
                    for (_, c) in chars.by_ref() {
                        if c == '}' {
                            closed = true;
                            break;
                        }
                        name.push(c);
                    }
                    if !closed {
                        return Err(TemplateError::UnmatchedBrace {
                            kind,
                            brace: '{',
                            position: pos,
                        });
                    }
                    let placeholder = Placeholder::from_name(name.trim())
                        .filter(|p| kind.allowed().contains(p))
                        .ok_or_else(|| TemplateError::UnknownPlaceholder {
                            kind,
                            name: name.clone(),
                        })?;
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Slot(placeholder));
                }
                '}' => {
                    return Err(TemplateError::UnmatchedBrace {
                        kind,
                        brace: '}',
                        position: pos,
                    });
                }
                _ => literal.push(c),
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self {
            kind,
            source,
            segments,
        })
    }

    pub fn kind(&self) -> TemplateKind {
        self.kind
    }

    /// The template text as configured
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Placeholders referenced by this template, in order of appearance
    pub fn placeholders(&self) -> impl Iterator<Item = Placeholder> + '_ {
        self.segments.iter().filter_map(|s| match s {
            Segment::Slot(p) => Some(*p),
            Segment::Literal(_) => None,
        })
    }

    pub fn render(&self, params: &PromptParams) -> Result<String, TemplateError> {
        let mut out = String::with_capacity(self.source.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Slot(placeholder) => {
                    let value =
                        params
                            .get(*placeholder)
                            .ok_or(TemplateError::MissingParameter {
                                kind: self.kind,
                                placeholder: *placeholder,
                            })?;
                    out.push_str(value);
                }
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_substitutes_placeholders() {
        let template = PromptTemplate::parse(
            TemplateKind::FirstRound,
            "[{current_round}/{total_rounds}, {remaining} left] {model_name} on {topic}",
        )
        .unwrap();
        let params = PromptParams::new()
            .with(Placeholder::CurrentRound, 1)
            .with(Placeholder::TotalRounds, 3)
            .with(Placeholder::Remaining, 2)
            .with(Placeholder::ModelName, "gpt-4o")
            .with(Placeholder::Topic, "AI safety");

        assert_eq!(
            template.render(&params).unwrap(),
            "[1/3, 2 left] gpt-4o on AI safety"
        );
    }

    #[test]
    fn test_escaped_braces() {
        let template =
            PromptTemplate::parse(TemplateKind::HumanGuide, "{{json}}: {human_input} }}").unwrap();
        let params = PromptParams::new().with(Placeholder::HumanInput, "x");
        assert_eq!(template.render(&params).unwrap(), "{json}: x }");
        assert_eq!(template.placeholders().count(), 1);
    }

    #[test]
    fn test_rejects_placeholder_not_allowed_for_kind() {
        let err = PromptTemplate::parse(TemplateKind::Summary, "Reply to {others_text}").unwrap_err();
        assert_eq!(
            err,
            TemplateError::UnknownPlaceholder {
                kind: TemplateKind::Summary,
                name: "others_text".to_string()
            }
        );
        assert!(PromptTemplate::parse(TemplateKind::HumanGuide, "{model_name}").is_err());
        assert!(PromptTemplate::parse(TemplateKind::System, "You are {model_name}").is_ok());

        assert!(PromptTemplate::parse(TemplateKind::Summary, "{bogus}").is_err());
    }

    #[test]
    fn test_rejects_unbalanced_braces() {
        assert!(matches!(
            PromptTemplate::parse(TemplateKind::Summary, "oops {topic"),
            Err(TemplateError::UnmatchedBrace { brace: '{', position: 5, .. })
        ));
        assert!(matches!(
            PromptTemplate::parse(TemplateKind::Summary, "oops }"),
            Err(TemplateError::UnmatchedBrace { brace: '}', .. })
        ));
    }

    #[test]
    fn test_render_requires_every_referenced_value() {
        let template = PromptTemplate::parse(TemplateKind::Summary, "{model_name}: {topic}").unwrap();
        let params = PromptParams::new().with(Placeholder::ModelName, "m");
        assert_eq!(
            template.render(&params).unwrap_err(),
            TemplateError::MissingParameter {
                kind: TemplateKind::Summary,
                placeholder: Placeholder::Topic
            }
        );
    }

    #[test]
    fn test_placeholder_names_round_trip() {
        for kind in TemplateKind::ALL {
            for placeholder in kind.allowed() {
                assert_eq!(Placeholder::from_name(placeholder.as_str()), Some(*placeholder));
            }
        }
    }
}
