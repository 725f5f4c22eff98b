//! Round controller states and the human decision protocol

use serde::{Deserialize, Serialize};

/// States of a discussion session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscussionState {
    AwaitingFirstRound,
    RoundInProgress,
    RoundComplete,
    AwaitingHumanInput,
    Finished,
}

impl DiscussionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscussionState::AwaitingFirstRound => "awaiting_first_round",
            DiscussionState::RoundInProgress => "round_in_progress",
            DiscussionState::RoundComplete => "round_complete",
            DiscussionState::AwaitingHumanInput => "awaiting_human_input",
            DiscussionState::Finished => "finished",
        }
    }
}

impl std::fmt::Display for DiscussionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What the session asks the human when the planned rounds are used up
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecisionQuery {
    pub completed_rounds: u32,
    pub participants: Vec<String>,
    /// Estimated history size after the last round
    pub history_tokens: usize,
}

/// The human's answer to a [`DecisionQuery`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum HumanDecision {
    /// Run `extra_rounds` more rounds, optionally steering them first
    Continue {
        extra_rounds: u32,
        guidance: Option<String>,
    },
    /// Stop and request closing summaries
    Finish,
}

impl HumanDecision {
    pub fn continue_with(extra_rounds: u32, guidance: Option<String>) -> Self {
        // Blank guidance means none
        let guidance = guidance
            .map(|g| g.trim().to_string())
            .filter(|g| !g.is_empty());
        HumanDecision::Continue {
            extra_rounds,
            guidance,
        }
    }
}
