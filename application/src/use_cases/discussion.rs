//! Discussion session: the round controller
//!
//! Owns the shared [`History`] and drives it through the round state machine:
//!
//! ```text
//! AwaitingFirstRound ─run_round─▶ RoundInProgress ─▶ RoundComplete ─run_round─▶ ...
//!                                                        │ (planned rounds used up)
//!                                                        ▼
//!                        continue_with ◀──────── AwaitingHumanInput
//!                                                        │ finish
//!                                                        ▼
//!                                                     Finished
//! ```
//!
//! A round in which every participant fails leaves the history untouched and
//! puts the session back in the state it started from.

use crate::config::DiscussionConfig;
use crate::ports::backend_gateway::BackendGateway;
use crate::ports::progress::ProgressNotifier;
use crate::use_cases::dispatch::{DispatchOutcome, DispatchPool};
use roundtable_domain::{
    ChatMessage, ChatRole, Contribution, DecisionQuery, DiscussionState, DomainError, History,
    HistoryError, Message, Participant, Roster, Round, RoundKind, RoundPlan, RoundPosition,
    TemplateError, TokenEstimator, TokenUsage, Topic, TrimReport, format_others_text,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors surfaced by the round controller
#[derive(Error, Debug)]
pub enum DiscussionError {
    #[error("All participants failed in round {round}")]
    AllParticipantsFailed {
        round: u32,
        /// `(participant, reason)` in participant order
        failures: Vec<(String, String)>,
    },

    #[error(transparent)]
    BudgetExceeded(#[from] HistoryError),

    #[error("Cannot {action} while {state}")]
    InvalidTransition {
        state: DiscussionState,
        action: &'static str,
    },

    #[error("Invalid decision: {0}")]
    InvalidDecision(String),

    #[error("Template error: {0}")]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// A round that completed, with what it changed
#[derive(Debug, Clone)]
pub struct RoundOutcome {
    pub round: Round,
    /// Messages evicted after the round's replies were appended
    pub trimmed: TrimReport,
    /// Cumulative usage after the round
    pub usage: TokenUsage,
}

#[derive(Debug, Clone)]
struct PendingGuidance {
    raw: String,
    rendered: String,
}

/// One multi-round discussion among a fixed roster
pub struct DiscussionSession<G: BackendGateway + ?Sized + 'static> {
    config: DiscussionConfig,
    topic: Topic,
    roster: Roster,
    history: History,
    /// Per-participant directives, in roster order, when the system prompt
    /// names its reader
    directives: Option<Vec<String>>,
    plan: RoundPlan,
    state: DiscussionState,
    rounds: Vec<Round>,
    summary: Option<Round>,
    pending_guidance: Option<PendingGuidance>,
    usage: TokenUsage,
    pool: DispatchPool<G>,
}

impl<G: BackendGateway + ?Sized + 'static> DiscussionSession<G> {
    /// Render the system directive and seed the history with it.
    ///
    /// A directive that names its reader is rendered once per participant;
    /// the history then stores the most expensive rendering, so budgeting
    /// covers every participant's copy.
    ///
    /// Fails with [`DiscussionError::BudgetExceeded`] when the directive alone
    /// does not fit the history ceiling.
    pub fn new(
        config: DiscussionConfig,
        topic: Topic,
        roster: Roster,
        gateway: Arc<G>,
        estimator: Arc<dyn TokenEstimator>,
    ) -> Result<Self, DiscussionError> {
        let plan = RoundPlan::new(config.initial_rounds)?;
        let participants = roster.names_joined(", ");
        let rendered = roster
            .iter()
            .map(|p| config.prompts.system(p.name(), topic.content(), &participants))
            .collect::<Result<Vec<_>, _>>()?;
        let directive = rendered
            .iter()
            .max_by_key(|text| estimator.count_text(text))
            .cloned()
            .unwrap_or_default();
        let directives = config.prompts.system_is_personal().then_some(rendered);
        let history = History::with_system(
            Message::system(directive),
            estimator,
            config.budget.ceiling(),
        )?;
        let pool = DispatchPool::new(gateway, config.max_workers, config.budget.response_tokens)
            .with_request_timeout(config.request_timeout);

        debug!(
            "Session ready: {} participants, ceiling {} tokens, directive {} tokens",
            roster.len(),
            config.budget.ceiling(),
            history.total_tokens()
        );

        Ok(Self {
            config,
            topic,
            roster,
            history,
            directives,
            plan,
            state: DiscussionState::AwaitingFirstRound,
            rounds: Vec::new(),
            summary: None,
            pending_guidance: None,
            usage: TokenUsage::default(),
            pool,
        })
    }

    pub fn state(&self) -> DiscussionState {
        self.state
    }

    pub fn topic(&self) -> &Topic {
        &self.topic
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn plan(&self) -> RoundPlan {
        self.plan
    }

    /// Completed discussion rounds, oldest first (the summary is separate)
    pub fn rounds(&self) -> &[Round] {
        &self.rounds
    }

    pub fn summary(&self) -> Option<&Round> {
        self.summary.as_ref()
    }

    /// Cumulative usage over every call so far
    pub fn usage(&self) -> TokenUsage {
        self.usage
    }

    pub fn config(&self) -> &DiscussionConfig {
        &self.config
    }

    /// Run the next planned round.
    ///
    /// Valid from `AwaitingFirstRound`, or from `RoundComplete` while planned
    /// rounds remain. When this round uses up the plan, the session parks in
    /// `AwaitingHumanInput`.
    pub async fn run_round(
        &mut self,
        progress: &dyn ProgressNotifier,
    ) -> Result<RoundOutcome, DiscussionError> {
        let prior = self.state;
        let ready = match prior {
            DiscussionState::AwaitingFirstRound => true,
            DiscussionState::RoundComplete => !self.plan.is_exhausted(),
            _ => false,
        };
        if !ready {
            return Err(DiscussionError::InvalidTransition {
                state: prior,
                action: "run a round",
            });
        }

        let index = self.plan.next_index();
        let total = self.plan.total();
        let kind = if index == 1 {
            RoundKind::Opening
        } else {
            RoundKind::Discussion
        };
        let guide = self
            .pending_guidance
            .as_ref()
            .map(|g| Message::human_guide(self.plan.completed(), g.rendered.clone()));

        let (contributions, trimmed) = self
            .dispatch_and_commit(kind, RoundPosition::new(index, total), guide, prior, progress)
            .await?;

        self.plan.advance();
        let round = Round {
            index,
            total_rounds: total,
            kind,
            guidance: self.pending_guidance.take().map(|g| g.raw),
            contributions,
        };
        info!(
            "{} complete: {}/{} replied, history {} tokens",
            round.label(),
            round.success_count(),
            self.roster.len(),
            self.history.total_tokens()
        );
        self.rounds.push(round.clone());

        self.state = if self.plan.is_exhausted() {
            DiscussionState::AwaitingHumanInput
        } else {
            DiscussionState::RoundComplete
        };

        Ok(RoundOutcome {
            round,
            trimmed,
            usage: self.usage,
        })
    }

    /// The question put to the human while parked
    pub fn decision_query(&self) -> Result<DecisionQuery, DiscussionError> {
        self.expect_state(DiscussionState::AwaitingHumanInput, "ask for a decision")?;
        Ok(DecisionQuery {
            completed_rounds: self.plan.completed(),
            participants: self.roster.iter().map(|p| p.name().to_string()).collect(),
            history_tokens: self.history.total_tokens(),
        })
    }

    /// Extend the plan by `extra_rounds` and queue optional guidance.
    ///
    /// The guidance is appended to the history, tagged with the last completed
    /// round, just before the next round's replies.
    pub fn continue_with(
        &mut self,
        extra_rounds: u32,
        guidance: Option<String>,
    ) -> Result<(), DiscussionError> {
        self.expect_state(DiscussionState::AwaitingHumanInput, "continue")?;
        if extra_rounds == 0 {
            return Err(DiscussionError::InvalidDecision(
                "extra rounds must be at least 1".to_string(),
            ));
        }
        let plan = self.plan.extended(extra_rounds).ok_or_else(|| {
            DiscussionError::InvalidDecision(format!(
                "cannot add {} rounds to a plan of {}",
                extra_rounds,
                self.plan.total()
            ))
        })?;

        let pending = match guidance
            .map(|g| g.trim().to_string())
            .filter(|g| !g.is_empty())
        {
            Some(raw) => Some(PendingGuidance {
                rendered: self.config.prompts.human_guide(&raw)?,
                raw,
            }),
            None => None,
        };

        self.plan = plan;
        info!(
            "Extending discussion by {} round(s) to {}{}",
            extra_rounds,
            self.plan.total(),
            if pending.is_some() {
                " with human guidance"
            } else {
                ""
            }
        );
        self.pending_guidance = pending;
        self.state = DiscussionState::RoundComplete;
        Ok(())
    }

    /// Ask every participant for a closing summary and finish the session.
    ///
    /// If no participant answers, the session stays in `AwaitingHumanInput`.
    pub async fn finish(
        &mut self,
        progress: &dyn ProgressNotifier,
    ) -> Result<RoundOutcome, DiscussionError> {
        let prior = self.state;
        self.expect_state(DiscussionState::AwaitingHumanInput, "finish")?;

        let index = self.plan.next_index();
        let total = self.plan.total();
        info!("Requesting final summaries");

        let (contributions, trimmed) = self
            .dispatch_and_commit(
                RoundKind::Summary,
                RoundPosition::new(index, total),
                None,
                prior,
                progress,
            )
            .await?;

        let round = Round {
            index,
            total_rounds: total,
            kind: RoundKind::Summary,
            guidance: None,
            contributions,
        };
        info!(
            "Discussion finished after {} round(s); usage: {}",
            self.plan.completed(),
            self.usage
        );
        self.summary = Some(round.clone());
        self.state = DiscussionState::Finished;

        Ok(RoundOutcome {
            round,
            trimmed,
            usage: self.usage,
        })
    }

    fn expect_state(
        &self,
        expected: DiscussionState,
        action: &'static str,
    ) -> Result<(), DiscussionError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(DiscussionError::InvalidTransition {
                state: self.state,
                action,
            })
        }
    }

    /// Render, dispatch, and merge one round's replies into the history.
    ///
    /// On total failure, restores `prior` and leaves the history as it was.
    async fn dispatch_and_commit(
        &mut self,
        kind: RoundKind,
        position: RoundPosition,
        guide: Option<Message>,
        prior: DiscussionState,
        progress: &dyn ProgressNotifier,
    ) -> Result<(Vec<Contribution>, TrimReport), DiscussionError> {
        let requests = self.build_requests(kind, position, guide.as_ref())?;
        let prompt_estimates: Vec<u64> = requests
            .iter()
            .map(|messages| self.estimate_request(messages) as u64)
            .collect();

        self.state = DiscussionState::RoundInProgress;
        debug!(
            "Dispatching {:?} round {} to {} participants",
            kind,
            position.current,
            self.roster.len()
        );
        progress.on_round_start(kind, position.current, position.total, self.roster.len());
        let outcomes = self.pool.dispatch(&self.roster, requests, progress).await;
        progress.on_round_complete(kind, position.current);

        if !outcomes.iter().any(DispatchOutcome::is_success) {
            self.state = prior;
            let failures: Vec<(String, String)> = outcomes
                .into_iter()
                .map(|o| {
                    let reason = o.result.err().map(|e| e.to_string()).unwrap_or_default();
                    (o.model.to_string(), reason)
                })
                .collect();
            warn!(
                "Round {} failed for all {} participants",
                position.current,
                failures.len()
            );
            return Err(DiscussionError::AllParticipantsFailed {
                round: position.current,
                failures,
            });
        }

        self.state = DiscussionState::RoundComplete;
        if let Some(guide) = guide {
            self.history.append(guide);
        }
        let contributions = self.commit(position.current, outcomes, prompt_estimates);
        let trimmed = self.history.enforce_budget(self.config.budget.ceiling())?;
        if !trimmed.is_noop() {
            debug!(
                "Trimmed {} message(s) from history: {} -> {} tokens",
                trimmed.removed.len(),
                trimmed.tokens_before,
                trimmed.tokens_after
            );
        }

        Ok((contributions, trimmed))
    }

    /// Per-participant message lists: the shared history as that participant
    /// sees it, pending guidance, then the round prompt.
    ///
    /// In a discussion round the previous round's peer replies are quoted by
    /// the prompt, so the view leaves them out. Every request is fitted to the
    /// history ceiling.
    fn build_requests(
        &self,
        kind: RoundKind,
        position: RoundPosition,
        guide: Option<&Message>,
    ) -> Result<Vec<Vec<ChatMessage>>, DiscussionError> {
        let prompts = &self.config.prompts;
        let topic = self.topic.content();
        let previous = self.rounds.last();

        self.roster
            .iter()
            .enumerate()
            .map(|(slot, participant)| -> Result<Vec<ChatMessage>, DiscussionError> {
                let mut view = self.history.view_for(participant.model());
                if let Some(directive) = self.directives.as_ref().and_then(|d| d.get(slot)) {
                    view = view.with_directive(directive);
                }
                let prompt = match kind {
                    RoundKind::Opening => prompts.first_round(position, participant.name(), topic)?,
                    RoundKind::Discussion => {
                        let others = match previous {
                            Some(round) => {
                                view = view.omit_peers_from(round.index);
                                format_others_text(
                                    round
                                        .contributions
                                        .iter()
                                        .filter(|c| &c.model != participant.model())
                                        .filter_map(|c| {
                                            c.message().map(|m| (c.model.as_str(), m.content()))
                                        }),
                                )
                            }
                            None => String::new(),
                        };
                        prompts.discussion(position, participant.name(), topic, &others)?
                    }
                    RoundKind::Summary => prompts.summary(participant.name(), topic)?,
                };

                let mut messages = view.messages();
                let conversation_end = messages.len();
                if let Some(guide) = guide {
                    messages.push(ChatMessage::user(guide.content()));
                }
                messages.push(ChatMessage::user(prompt));
                self.fit_request(participant, &mut messages, conversation_end)?;
                Ok(messages)
            })
            .collect()
    }

    /// Drop the oldest conversation turns (`messages[..conversation_end]`)
    /// until the request fits the ceiling. The directive, guidance and round
    /// prompt are never dropped.
    fn fit_request(
        &self,
        participant: &Participant,
        messages: &mut Vec<ChatMessage>,
        mut conversation_end: usize,
    ) -> Result<(), HistoryError> {
        let ceiling = self.config.budget.ceiling();
        let estimator = self.history.estimator();
        let mut required = self.estimate_request(messages);
        let mut dropped = 0;

        while required > ceiling {
            let Some(index) = messages[..conversation_end]
                .iter()
                .position(|m| m.role != ChatRole::System)
            else {
                return Err(HistoryError::BudgetExceeded { required, ceiling });
            };
            let removed = messages.remove(index);
            required -= estimator.count_message(&removed.content);
            conversation_end -= 1;
            dropped += 1;
        }

        if dropped > 0 {
            debug!(
                "Dropped {} older turn(s) from {}'s request to fit {} tokens",
                dropped,
                participant.name(),
                ceiling
            );
        }
        Ok(())
    }

    fn estimate_request(&self, messages: &[ChatMessage]) -> usize {
        let estimator = self.history.estimator();
        estimator.conversation_overhead()
            + messages
                .iter()
                .map(|m| estimator.count_message(&m.content))
                .sum::<usize>()
    }

    /// Append successful replies in participant order and account usage.
    ///
    /// Backend-reported usage wins; otherwise both sides are estimated.
    fn commit(
        &mut self,
        round: u32,
        outcomes: Vec<DispatchOutcome>,
        prompt_estimates: Vec<u64>,
    ) -> Vec<Contribution> {
        let mut contributions = Vec::with_capacity(outcomes.len());

        for (outcome, prompt_estimate) in outcomes.into_iter().zip(prompt_estimates) {
            match outcome.result {
                Ok(completion) => {
                    let message = Message::assistant(&outcome.model, round, completion.content);
                    let message = match completion.usage {
                        Some(usage) => {
                            self.usage += usage;
                            message.with_reported_tokens(usage.completion_tokens as usize)
                        }
                        None => {
                            let completion_tokens =
                                message.token_count(self.history.estimator().as_ref()) as u64;
                            self.usage += TokenUsage::new(prompt_estimate, completion_tokens);
                            message
                        }
                    };
                    self.history.append(message.clone());
                    contributions.push(Contribution::replied(outcome.model, message));
                }
                Err(e) => {
                    contributions.push(Contribution::failed(outcome.model, e.to_string()));
                }
            }
        }

        contributions
    }
}
