//! Token estimation domain
//!
//! - [`TokenEstimator`] - pure text → token count contract used by the history budget
//! - [`HeuristicEstimator`] - deterministic chars-per-token approximation

mod estimator;

pub use estimator::{HeuristicEstimator, TokenEstimator};
