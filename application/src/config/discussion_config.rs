//! Discussion parameters - immutable for the life of a session.
//!
//! [`DiscussionConfig`] is built once at startup (the infrastructure loader
//! merges files and environment into it) and handed to the session by value.

use roundtable_domain::{PromptSet, SamplingRange};
use std::time::Duration;

/// Token limits for the shared history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BudgetConfig {
    /// Maximum estimated size of a request, history plus reply
    pub max_tokens: usize,
    /// Cap on each generated reply
    pub response_tokens: u32,
}

impl BudgetConfig {
    /// The history ceiling: room is kept for the reply.
    pub fn ceiling(&self) -> usize {
        self.max_tokens.saturating_sub(self.response_tokens as usize)
    }
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            max_tokens: 32_000,
            response_tokens: 2048,
        }
    }
}

/// Session-wide settings for the round controller and dispatch pool.
#[derive(Debug, Clone)]
pub struct DiscussionConfig {
    pub budget: BudgetConfig,
    /// Temperature range each participant draws from per call
    pub sampling: SamplingRange,
    /// Concurrent backend calls allowed within a round
    pub max_workers: usize,
    /// Rounds planned before the first human decision
    pub initial_rounds: u32,
    /// Per-call limit; `None` waits indefinitely
    pub request_timeout: Option<Duration>,
    pub prompts: PromptSet,
}

impl DiscussionConfig {
    pub fn new(prompts: PromptSet) -> Self {
        Self {
            budget: BudgetConfig::default(),
            sampling: SamplingRange::default(),
            max_workers: 5,
            initial_rounds: 3,
            request_timeout: None,
            prompts,
        }
    }

    // ==================== Builder Methods ====================

    pub fn with_budget(mut self, max_tokens: usize, response_tokens: u32) -> Self {
        self.budget = BudgetConfig {
            max_tokens,
            response_tokens,
        };
        self
    }

    pub fn with_sampling(mut self, sampling: SamplingRange) -> Self {
        self.sampling = sampling;
        self
    }

    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers;
        self
    }

    pub fn with_initial_rounds(mut self, rounds: u32) -> Self {
        self.initial_rounds = rounds;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DiscussionConfig::new(PromptSet::builtin().unwrap());
        assert_eq!(config.budget.max_tokens, 32_000);
        assert_eq!(config.budget.response_tokens, 2048);
        assert_eq!(config.budget.ceiling(), 32_000 - 2048);
        assert_eq!(config.max_workers, 5);
        assert_eq!(config.initial_rounds, 3);
        assert!(config.request_timeout.is_none());
    }

    #[test]
    fn test_builder() {
        let config = DiscussionConfig::new(PromptSet::builtin().unwrap())
            .with_budget(100, 20)
            .with_max_workers(2)
            .with_initial_rounds(1)
            .with_request_timeout(Some(Duration::from_secs(30)));
        assert_eq!(config.budget.ceiling(), 80);
        assert_eq!(config.max_workers, 2);
        assert_eq!(config.initial_rounds, 1);
        assert_eq!(config.request_timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_ceiling_saturates() {
        let budget = BudgetConfig {
            max_tokens: 10,
            response_tokens: 50,
        };
        assert_eq!(budget.ceiling(), 0);
    }
}
