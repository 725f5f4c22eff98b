//! Human input port for steering a discussion between rounds.
//!
//! When the planned rounds are used up, the session parks in
//! `AwaitingHumanInput` and the driver asks this port what to do next.
//!
//! # Built-in Implementations
//!
//! - [`AutoFinish`] - Always returns [`HumanDecision::Finish`]
//! - [`ScriptedHumanInput`] - Replays a fixed list of decisions
//!
//! For interactive use, see `InteractiveHumanInput` in the presentation layer.

use async_trait::async_trait;
use roundtable_domain::{DecisionQuery, HumanDecision};
use std::collections::VecDeque;
use std::sync::Mutex;
use thiserror::Error;

/// Failures while collecting a decision (not the decision itself)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HumanInputError {
    #[error("Operation cancelled")]
    Cancelled,

    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Port for asking the human whether to continue the discussion.
#[async_trait]
pub trait HumanInputPort: Send + Sync {
    /// Called once each time the planned rounds are exhausted.
    ///
    /// May wait indefinitely.
    async fn request_decision(
        &self,
        query: &DecisionQuery,
    ) -> Result<HumanDecision, HumanInputError>;
}

/// Finish as soon as the planned rounds are done.
pub struct AutoFinish;

#[async_trait]
impl HumanInputPort for AutoFinish {
    async fn request_decision(
        &self,
        _query: &DecisionQuery,
    ) -> Result<HumanDecision, HumanInputError> {
        Ok(HumanDecision::Finish)
    }
}

/// Replays queued decisions in order, then finishes.
pub struct ScriptedHumanInput {
    decisions: Mutex<VecDeque<HumanDecision>>,
}

impl ScriptedHumanInput {
    pub fn new(decisions: impl IntoIterator<Item = HumanDecision>) -> Self {
        Self {
            decisions: Mutex::new(decisions.into_iter().collect()),
        }
    }
}

#[async_trait]
impl HumanInputPort for ScriptedHumanInput {
    async fn request_decision(
        &self,
        _query: &DecisionQuery,
    ) -> Result<HumanDecision, HumanInputError> {
        let mut decisions = self
            .decisions
            .lock()
            .map_err(|e| HumanInputError::IoError(e.to_string()))?;
        Ok(decisions.pop_front().unwrap_or(HumanDecision::Finish))
    }
}
