//! Domain layer for roundtable
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Discussion
//!
//! A discussion is a sequence of rounds in which every participant (a model
//! backend) contributes at most one message to a single shared [`History`].
//!
//! - **Round 1** states initial positions
//! - **Later rounds** respond to the other participants' previous contributions
//! - **Human guidance** may be injected between rounds
//! - **Summary** closes the discussion
//!
//! ## Token budget
//!
//! The history is kept under a token ceiling by evicting the oldest
//! non-system messages. The system directive is never evicted.

pub mod core;
pub mod discussion;
pub mod prompt;
pub mod token;

// Re-export commonly used types
pub use core::{error::DomainError, model::Model, topic::Topic};
pub use discussion::{
    chat::{ChatMessage, ChatRole},
    history::{History, HistoryError, HistoryView, TrimReport},
    message::{HUMAN_AUTHOR, Message, Role, SYSTEM_AUTHOR},
    participant::{Participant, Roster, SamplingRange},
    round::{Contribution, ContributionOutcome, Round, RoundKind, RoundPlan},
    state::{DecisionQuery, DiscussionState, HumanDecision},
    usage::TokenUsage,
};
pub use prompt::{
    PromptOverrides, PromptSet, PromptTemplate, RoundPosition, TemplateError, TemplateKind,
    format_others_text,
};
pub use token::{HeuristicEstimator, TokenEstimator};
