//! Participants and the shared roster

use crate::core::error::DomainError;
use crate::core::model::Model;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Closed interval a participant's temperature is drawn from on every call
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplingRange {
    min: f64,
    max: f64,
}

impl SamplingRange {
    pub fn new(min: f64, max: f64) -> Result<Self, DomainError> {
        if !min.is_finite() || !max.is_finite() || min < 0.0 || min > max {
            return Err(DomainError::InvalidSamplingRange { min, max });
        }
        Ok(Self { min, max })
    }

    /// A degenerate range that always yields `value`
    pub fn fixed(value: f64) -> Result<Self, DomainError> {
        Self::new(value, value)
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    /// Map a uniform sample in `[0, 1]` onto the range.
    pub fn at(&self, fraction: f64) -> f64 {
        let fraction = if fraction.is_nan() {
            0.0
        } else {
            fraction.clamp(0.0, 1.0)
        };
        self.min + (self.max - self.min) * fraction
    }

    pub fn contains(&self, value: f64) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

impl Default for SamplingRange {
    fn default() -> Self {
        Self { min: 0.4, max: 1.2 }
    }
}

impl std::fmt::Display for SamplingRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}..={:.2}", self.min, self.max)
    }
}

/// One model backend taking part in the discussion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    model: Model,
    sampling: SamplingRange,
}

impl Participant {
    pub fn new(model: Model, sampling: SamplingRange) -> Self {
        Self { model, sampling }
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn name(&self) -> &str {
        self.model.as_str()
    }

    pub fn sampling(&self) -> SamplingRange {
        self.sampling
    }
}

/// Ordered, immutable participant list shared with the dispatch pool.
///
/// Cloning is cheap; all clones point at the same list. The list is never
/// empty and never names the same model twice.
#[derive(Debug, Clone)]
pub struct Roster(Arc<[Participant]>);

impl Roster {
    pub fn new(participants: Vec<Participant>) -> Result<Self, DomainError> {
        if participants.is_empty() {
            return Err(DomainError::NoParticipants);
        }
        for (i, p) in participants.iter().enumerate() {
            if participants[..i].iter().any(|q| q.model == p.model) {
                return Err(DomainError::DuplicateParticipant(p.name().to_string()));
            }
        }
        Ok(Self(participants.into()))
    }

    /// Build a roster where every model shares one sampling range
    pub fn from_models(
        models: impl IntoIterator<Item = Model>,
        sampling: SamplingRange,
    ) -> Result<Self, DomainError> {
        Self::new(
            models
                .into_iter()
                .map(|m| Participant::new(m, sampling))
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Participant> {
        self.0.iter()
    }

    pub fn models(&self) -> impl Iterator<Item = &Model> {
        self.0.iter().map(Participant::model)
    }

    /// Participant names joined for prompt rendering
    pub fn names_joined(&self, separator: &str) -> String {
        self.0
            .iter()
            .map(Participant::name)
            .collect::<Vec<_>>()
            .join(separator)
    }
}

impl<'a> IntoIterator for &'a Roster {
    type Item = &'a Participant;
    type IntoIter = std::slice::Iter<'a, Participant>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn models(ids: &[&str]) -> Vec<Model> {
        ids.iter().map(|id| Model::try_new(id).unwrap()).collect()
    }

    #[test]
    fn test_sampling_range_validation() {
        assert!(SamplingRange::new(0.4, 1.2).is_ok());
        assert!(SamplingRange::fixed(0.7).is_ok());
        assert_eq!(
            SamplingRange::new(1.5, 0.5),
            Err(DomainError::InvalidSamplingRange { min: 1.5, max: 0.5 })
        );
        assert!(SamplingRange::new(-0.1, 0.5).is_err());
        assert!(SamplingRange::new(0.1, f64::INFINITY).is_err());
    }

    #[test]
    fn test_sampling_range_at() {
        let range = SamplingRange::new(0.4, 1.2).unwrap();
        assert_eq!(range.at(0.0), 0.4);
        assert!((range.at(0.5) - 0.8).abs() < 1e-9);
        assert!((range.at(1.0) - 1.2).abs() < 1e-9);
        assert_eq!(range.at(-3.0), 0.4);
        assert!((range.at(7.0) - 1.2).abs() < 1e-9);
        assert_eq!(range.at(f64::NAN), 0.4);
        assert!(range.contains(range.at(0.33)));
    }

    #[test]
    fn test_roster_rejects_empty_and_duplicates() {
        assert_eq!(
            Roster::from_models(Vec::new(), SamplingRange::default()).unwrap_err(),
            DomainError::NoParticipants
        );
        assert_eq!(
            Roster::from_models(models(&["a", "b", "a"]), SamplingRange::default()).unwrap_err(),
            DomainError::DuplicateParticipant("a".to_string())
        );
    }

    #[test]
    fn test_roster_preserves_order_and_shares_storage() {
        let roster = Roster::from_models(models(&["gpt-4o", "claude", "qwen"]), SamplingRange::default())
            .unwrap();
        let clone = roster.clone();

        assert_eq!(roster.len(), 3);
        assert_eq!(roster.names_joined(", "), "gpt-4o, claude, qwen");
        let order: Vec<_> = roster.models().map(Model::as_str).collect();
        assert_eq!(order, vec!["gpt-4o", "claude", "qwen"]);
        assert!(Arc::ptr_eq(&roster.0, &clone.0));
    }
}
