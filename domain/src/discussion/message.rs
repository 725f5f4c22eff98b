//! Discussion message entity

use crate::core::model::Model;
use crate::token::TokenEstimator;
use serde::Serialize;
use std::sync::OnceLock;

/// Author recorded on the leading system directive
pub const SYSTEM_AUTHOR: &str = "system";

/// Author recorded on human-guide messages
pub const HUMAN_AUTHOR: &str = "human";

/// Role of a message in the shared history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// The session directive (first message of the history)
    System,
    /// Output produced by a participant
    Assistant,
    /// Out-of-band steering injected between rounds
    HumanGuide,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::Assistant => "assistant",
            Role::HumanGuide => "human_guide",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A message in the shared discussion history (Entity)
///
/// Messages are immutable once created. The token count is computed on first
/// request and cached, unless the backend already reported an authoritative
/// count for the response that produced the message.
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    role: Role,
    author: String,
    round: u32,
    content: String,
    #[serde(skip)]
    tokens: OnceLock<usize>,
}

impl Message {
    fn new(role: Role, author: impl Into<String>, round: u32, content: impl Into<String>) -> Self {
        Self {
            role,
            author: author.into(),
            round,
            content: content.into(),
            tokens: OnceLock::new(),
        }
    }

    /// The session directive. Tagged with round 0.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, SYSTEM_AUTHOR, 0, content)
    }

    /// A participant's contribution to `round`
    pub fn assistant(author: &Model, round: u32, content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, author.as_str(), round, content)
    }

    /// Human guidance injected after `round` completed
    pub fn human_guide(round: u32, content: impl Into<String>) -> Self {
        Self::new(Role::HumanGuide, HUMAN_AUTHOR, round, content)
    }

    /// Attach a token count reported by the backend.
    ///
    /// Only effective before the count was first estimated.
    pub fn with_reported_tokens(self, tokens: usize) -> Self {
        let _ = self.tokens.set(tokens);
        self
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn is_system(&self) -> bool {
        self.role == Role::System
    }

    /// Whether `model` authored this message
    pub fn is_authored_by(&self, model: &Model) -> bool {
        self.role == Role::Assistant && self.author == model.as_str()
    }

    /// Token count, estimated once and cached
    pub fn token_count(&self, estimator: &dyn TokenEstimator) -> usize {
        *self
            .tokens
            .get_or_init(|| estimator.count_message(&self.content))
    }

    /// Token count if already known (reported or previously estimated)
    pub fn cached_tokens(&self) -> Option<usize> {
        self.tokens.get().copied()
    }
}
