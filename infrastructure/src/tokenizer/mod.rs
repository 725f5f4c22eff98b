//! Local tokenizers backing the history budget

mod tiktoken;

pub use tiktoken::{TiktokenEstimator, TokenizerError};
