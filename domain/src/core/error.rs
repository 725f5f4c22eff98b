//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("No participants configured for the discussion")]
    NoParticipants,

    #[error("Duplicate participant: {0}")]
    DuplicateParticipant(String),

    #[error("Invalid topic: {0}")]
    InvalidTopic(String),

    #[error("Invalid model: {0}")]
    InvalidModel(String),

    #[error("Invalid sampling range: {min}..={max}")]
    InvalidSamplingRange { min: f64, max: f64 },

    #[error("Round count must be at least 1")]
    InvalidRoundCount,
}
