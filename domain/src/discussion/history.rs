//! Shared conversation history with token-budget enforcement.
//!
//! The history is append-only from the caller's point of view; the only
//! removal path is [`History::enforce_budget`], which evicts the oldest
//! non-system messages first (FIFO) until the estimated size fits the
//! ceiling. The leading system directive is never evicted.

use crate::core::model::Model;
use crate::discussion::chat::ChatMessage;
use crate::discussion::message::{Message, Role};
use crate::token::TokenEstimator;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised while maintaining the history budget
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HistoryError {
    #[error(
        "Token budget exceeded: {required} tokens remain with nothing left to evict (ceiling {ceiling})"
    )]
    BudgetExceeded { required: usize, ceiling: usize },
}

/// Result of a budget enforcement pass
#[derive(Debug, Clone, Default)]
pub struct TrimReport {
    /// Evicted messages, oldest first
    pub removed: Vec<Message>,
    pub tokens_before: usize,
    pub tokens_after: usize,
}

impl TrimReport {
    pub fn is_noop(&self) -> bool {
        self.removed.is_empty()
    }
}

/// The single ordered conversation shared by all participants (Entity)
///
/// Keeps a running total of per-message token counts. Each message is counted
/// once when appended (the count is cached in the message), and subtracted
/// when evicted; the history is never rescanned.
pub struct History {
    messages: Vec<Message>,
    message_tokens: usize,
    estimator: Arc<dyn TokenEstimator>,
}

impl History {
    pub fn new(estimator: Arc<dyn TokenEstimator>) -> Self {
        Self {
            messages: Vec::new(),
            message_tokens: 0,
            estimator,
        }
    }

    /// Start a history with its system directive.
    ///
    /// Fails with [`HistoryError::BudgetExceeded`] when the directive alone
    /// does not fit the ceiling, since it could never be evicted.
    pub fn with_system(
        directive: Message,
        estimator: Arc<dyn TokenEstimator>,
        ceiling: usize,
    ) -> Result<Self, HistoryError> {
        let mut history = Self::new(estimator);
        history.append(directive);
        let required = history.total_tokens();
        if required > ceiling {
            return Err(HistoryError::BudgetExceeded { required, ceiling });
        }
        Ok(history)
    }

    /// Append a message and return the new estimated total
    pub fn append(&mut self, message: Message) -> usize {
        self.message_tokens += message.token_count(self.estimator.as_ref());
        self.messages.push(message);
        self.total_tokens()
    }

    /// Estimated size of the whole conversation
    pub fn total_tokens(&self) -> usize {
        if self.messages.is_empty() {
            0
        } else {
            self.estimator.conversation_overhead() + self.message_tokens
        }
    }

    /// Evict oldest non-system messages until the total fits `ceiling`.
    pub fn enforce_budget(&mut self, ceiling: usize) -> Result<TrimReport, HistoryError> {
        let tokens_before = self.total_tokens();
        let mut removed = Vec::new();

        while self.total_tokens() > ceiling {
            let Some(index) = self.messages.iter().position(|m| !m.is_system()) else {
                return Err(HistoryError::BudgetExceeded {
                    required: self.total_tokens(),
                    ceiling,
                });
            };
            let message = self.messages.remove(index);
            self.message_tokens -= message.token_count(self.estimator.as_ref());
            removed.push(message);
        }

        Ok(TrimReport {
            removed,
            tokens_before,
            tokens_after: self.total_tokens(),
        })
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// The leading system directive, if present
    pub fn system_message(&self) -> Option<&Message> {
        self.messages.first().filter(|m| m.is_system())
    }

    pub fn estimator(&self) -> &Arc<dyn TokenEstimator> {
        &self.estimator
    }

    /// Messages tagged with `round`, in history order
    pub fn messages_in_round(&self, round: u32) -> impl Iterator<Item = &Message> {
        self.messages
            .iter()
            .filter(move |m| m.round() == round && !m.is_system())
    }

    /// The history as seen by one participant. See [`HistoryView`].
    pub fn view_for<'a>(&'a self, viewer: &'a Model) -> HistoryView<'a> {
        HistoryView {
            history: self,
            viewer,
            directive: None,
            peers_omitted_from: None,
        }
    }
}

/// One participant's rendering of the shared history.
///
/// The participant's own contributions become `assistant` turns; peers'
/// contributions and human guidance become `user` turns, peers prefixed
/// with their name.
#[derive(Clone, Copy)]
pub struct HistoryView<'a> {
    history: &'a History,
    viewer: &'a Model,
    directive: Option<&'a str>,
    peers_omitted_from: Option<u32>,
}

impl<'a> HistoryView<'a> {
    /// Show `text` in place of the stored system directive
    pub fn with_directive(mut self, text: &'a str) -> Self {
        self.directive = Some(text);
        self
    }

    /// Leave out peers' contributions from `round`; they reach the viewer
    /// another way (the discussion prompt quotes them).
    pub fn omit_peers_from(mut self, round: u32) -> Self {
        self.peers_omitted_from = Some(round);
        self
    }

    pub fn messages(&self) -> Vec<ChatMessage> {
        self.history
            .messages
            .iter()
            .filter_map(|m| match m.role() {
                Role::System => Some(ChatMessage::system(self.directive.unwrap_or(m.content()))),
                Role::Assistant if m.is_authored_by(self.viewer) => {
                    Some(ChatMessage::assistant(m.content()))
                }
                Role::Assistant if self.peers_omitted_from == Some(m.round()) => None,
                Role::Assistant => Some(ChatMessage::user(format!(
                    "[{}]:\n{}",
                    m.author(),
                    m.content()
                ))),
                Role::HumanGuide => Some(ChatMessage::user(m.content())),
            })
            .collect()
    }
}

impl std::fmt::Debug for History {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("History")
            .field("messages", &self.messages.len())
            .field("total_tokens", &self.total_tokens())
            .field("estimator", &self.estimator.name())
            .finish()
    }
}
