//! Rounds: the plan cursor and per-round contribution records

use crate::core::error::DomainError;
use crate::core::model::Model;
use crate::discussion::message::Message;
use serde::Serialize;

/// Which prompt a round was rendered from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundKind {
    /// Round 1: every participant states an initial position
    Opening,
    /// Rounds 2..: participants respond to each other
    Discussion,
    /// Closing summary requested when the discussion finishes
    Summary,
}

/// Tracks how many rounds ran and how many are planned.
///
/// The plan can only grow; extensions come from human decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RoundPlan {
    completed: u32,
    total: u32,
}

impl RoundPlan {
    pub fn new(total: u32) -> Result<Self, DomainError> {
        if total == 0 {
            return Err(DomainError::InvalidRoundCount);
        }
        Ok(Self {
            completed: 0,
            total,
        })
    }

    pub fn completed(&self) -> u32 {
        self.completed
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    /// Index of the round that would run next (1-based)
    pub fn next_index(&self) -> u32 {
        self.completed.saturating_add(1)
    }

    /// Rounds left after `index` finishes
    pub fn remaining_after(&self, index: u32) -> u32 {
        self.total.saturating_sub(index)
    }

    pub fn is_exhausted(&self) -> bool {
        self.completed >= self.total
    }

    pub fn advance(&mut self) {
        self.completed += 1;
    }

    /// The plan grown by `extra` rounds, or `None` if the total would overflow
    pub fn extended(self, extra: u32) -> Option<Self> {
        Some(Self {
            total: self.total.checked_add(extra)?,
            ..self
        })
    }
}

/// What a participant produced for one round
#[derive(Debug, Clone)]
pub enum ContributionOutcome {
    Replied(Message),
    Failed(String),
}

/// One participant's slot in a round
#[derive(Debug, Clone)]
pub struct Contribution {
    pub model: Model,
    pub outcome: ContributionOutcome,
}

impl Contribution {
    pub fn replied(model: Model, message: Message) -> Self {
        Self {
            model,
            outcome: ContributionOutcome::Replied(message),
        }
    }

    pub fn failed(model: Model, reason: impl Into<String>) -> Self {
        Self {
            model,
            outcome: ContributionOutcome::Failed(reason.into()),
        }
    }

    pub fn message(&self) -> Option<&Message> {
        match &self.outcome {
            ContributionOutcome::Replied(message) => Some(message),
            ContributionOutcome::Failed(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&str> {
        match &self.outcome {
            ContributionOutcome::Replied(_) => None,
            ContributionOutcome::Failed(reason) => Some(reason),
        }
    }
}

/// A completed round, with contributions in participant order
#[derive(Debug, Clone)]
pub struct Round {
    pub index: u32,
    pub total_rounds: u32,
    pub kind: RoundKind,
    /// Human guidance injected right before this round, if any
    pub guidance: Option<String>,
    pub contributions: Vec<Contribution>,
}

impl Round {
    /// Messages that made it into the history, in participant order
    pub fn replies(&self) -> impl Iterator<Item = &Message> {
        self.contributions.iter().filter_map(Contribution::message)
    }

    pub fn reply_from(&self, model: &Model) -> Option<&Message> {
        self.contributions
            .iter()
            .find(|c| &c.model == model)
            .and_then(Contribution::message)
    }

    pub fn success_count(&self) -> usize {
        self.replies().count()
    }

    pub fn failures(&self) -> impl Iterator<Item = (&Model, &str)> {
        self.contributions
            .iter()
            .filter_map(|c| c.failure().map(|reason| (&c.model, reason)))
    }

    pub fn label(&self) -> String {
        match self.kind {
            RoundKind::Summary => "Final summary".to_string(),
            _ if self.guidance.is_some() => format!(
                "Round {}/{} (with human guidance)",
                self.index, self.total_rounds
            ),
            _ => format!("Round {}/{}", self.index, self.total_rounds),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(id: &str) -> Model {
        Model::try_new(id).unwrap()
    }

    #[test]
    fn test_round_plan_progression() {
        assert_eq!(RoundPlan::new(0), Err(DomainError::InvalidRoundCount));

        let mut plan = RoundPlan::new(3).unwrap();
        assert_eq!(plan.next_index(), 1);
        assert_eq!(plan.remaining_after(1), 2);

        plan.advance();
        plan.advance();
        plan.advance();
        assert!(plan.is_exhausted());
        assert_eq!(plan.remaining_after(3), 0);

        plan = plan.extended(2).unwrap();
        assert!(!plan.is_exhausted());
        assert_eq!(plan.next_index(), 4);
        assert_eq!(plan.total(), 5);
    }

    #[test]
    fn test_round_plan_extension_overflow() {
        let plan = RoundPlan::new(3).unwrap();
        assert_eq!(plan.extended(u32::MAX), None);
        assert_eq!(plan.extended(u32::MAX - 3).map(|p| p.total()), Some(u32::MAX));
    }

    #[test]
    fn test_round_accessors() {
        let a = model("a");
        let b = model("b");
        let round = Round {
            index: 2,
            total_rounds: 3,
            kind: RoundKind::Discussion,
            guidance: None,
            contributions: vec![
                Contribution::replied(a.clone(), Message::assistant(&a, 2, "hello")),
                Contribution::failed(b.clone(), "timeout"),
            ],
        };

        assert_eq!(round.success_count(), 1);
        assert_eq!(round.reply_from(&a).map(Message::content), Some("hello"));
        assert!(round.reply_from(&b).is_none());
        assert_eq!(round.failures().collect::<Vec<_>>(), vec![(&b, "timeout")]);
        assert_eq!(round.label(), "Round 2/3");
    }

    #[test]
    fn test_round_labels() {
        let mut round = Round {
            index: 4,
            total_rounds: 5,
            kind: RoundKind::Discussion,
            guidance: Some("focus on cost".to_string()),
            contributions: Vec::new(),
        };
        assert_eq!(round.label(), "Round 4/5 (with human guidance)");
        round.kind = RoundKind::Summary;
        assert_eq!(round.label(), "Final summary");
    }
}
