//! Run Discussion use case
//!
//! Drives a [`DiscussionSession`] from the first round to the closing summary,
//! asking the human input port whenever the planned rounds run out.

use crate::config::DiscussionConfig;
use crate::ports::backend_gateway::BackendGateway;
use crate::ports::human_input::{HumanInputError, HumanInputPort};
use crate::ports::progress::{NoProgress, ProgressNotifier};
use crate::ports::transcript::{SessionHeader, TranscriptSink};
use crate::use_cases::discussion::{DiscussionError, DiscussionSession};
use roundtable_domain::{
    DiscussionState, HumanDecision, Model, Roster, Round, TokenEstimator, TokenUsage, Topic,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Errors that end a discussion run early
#[derive(Error, Debug)]
pub enum RunDiscussionError {
    #[error(transparent)]
    Discussion(#[from] DiscussionError),

    #[error("Human input failed: {0}")]
    HumanInput(#[from] HumanInputError),
}

/// Input for the RunDiscussion use case
#[derive(Debug, Clone)]
pub struct RunDiscussionInput {
    pub topic: Topic,
    pub roster: Roster,
}

impl RunDiscussionInput {
    pub fn new(topic: Topic, roster: Roster) -> Self {
        Self { topic, roster }
    }
}

/// Final state of a finished discussion
#[derive(Debug, Clone)]
pub struct DiscussionReport {
    pub topic: Topic,
    pub participants: Vec<Model>,
    pub rounds: Vec<Round>,
    pub summary: Option<Round>,
    pub usage: TokenUsage,
    /// Estimated history size at the end
    pub history_tokens: usize,
}

impl DiscussionReport {
    pub fn completed_rounds(&self) -> usize {
        self.rounds.len()
    }
}

/// Use case for running a discussion end to end
pub struct RunDiscussionUseCase<G: BackendGateway + ?Sized + 'static> {
    gateway: Arc<G>,
    estimator: Arc<dyn TokenEstimator>,
    config: DiscussionConfig,
}

impl<G: BackendGateway + ?Sized + 'static> RunDiscussionUseCase<G> {
    pub fn new(
        gateway: Arc<G>,
        estimator: Arc<dyn TokenEstimator>,
        config: DiscussionConfig,
    ) -> Self {
        Self {
            gateway,
            estimator,
            config,
        }
    }

    /// Execute the use case with default (no-op) progress
    pub async fn execute(
        &self,
        input: RunDiscussionInput,
        human: &dyn HumanInputPort,
        transcript: &dyn TranscriptSink,
    ) -> Result<DiscussionReport, RunDiscussionError> {
        self.execute_with_progress(input, human, transcript, &NoProgress)
            .await
    }

    /// Execute the use case with progress callbacks
    pub async fn execute_with_progress(
        &self,
        input: RunDiscussionInput,
        human: &dyn HumanInputPort,
        transcript: &dyn TranscriptSink,
        progress: &dyn ProgressNotifier,
    ) -> Result<DiscussionReport, RunDiscussionError> {
        let mut session = DiscussionSession::new(
            self.config.clone(),
            input.topic,
            input.roster,
            Arc::clone(&self.gateway),
            Arc::clone(&self.estimator),
        )?;

        info!(
            "Starting discussion on \"{}\" with {} participants ({} planned rounds)",
            session.topic(),
            session.roster().len(),
            session.plan().total()
        );
        transcript.on_session_start(&SessionHeader {
            topic: session.topic().clone(),
            participants: session.roster().models().cloned().collect(),
            max_tokens: self.config.budget.max_tokens,
            planned_rounds: session.plan().total(),
        });

        loop {
            match session.state() {
                DiscussionState::AwaitingFirstRound | DiscussionState::RoundComplete => {
                    let outcome = session.run_round(progress).await?;
                    if !outcome.trimmed.is_noop() {
                        transcript.on_trim(&outcome.trimmed);
                    }
                    transcript.on_round_complete(&outcome.round, &outcome.usage);
                }
                DiscussionState::AwaitingHumanInput => {
                    let query = session.decision_query()?;
                    match human.request_decision(&query).await? {
                        HumanDecision::Continue {
                            extra_rounds,
                            guidance,
                        } => session.continue_with(extra_rounds, guidance)?,
                        HumanDecision::Finish => {
                            let outcome = session.finish(progress).await?;
                            if !outcome.trimmed.is_noop() {
                                transcript.on_trim(&outcome.trimmed);
                            }
                            transcript.on_summary(&outcome.round, &outcome.usage);
                        }
                    }
                }
                DiscussionState::Finished => break,
                state @ DiscussionState::RoundInProgress => {
                    return Err(DiscussionError::InvalidTransition {
                        state,
                        action: "drive the discussion",
                    }
                    .into());
                }
            }
        }

        Ok(DiscussionReport {
            topic: session.topic().clone(),
            participants: session.roster().models().cloned().collect(),
            rounds: session.rounds().to_vec(),
            summary: session.summary().cloned(),
            usage: session.usage(),
            history_tokens: session.history().total_tokens(),
        })
    }
}
