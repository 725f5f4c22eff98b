//! BPE token estimator built on `tiktoken-rs`
//!
//! Counts follow the chat-completion accounting: every message costs its
//! encoded content plus a fixed per-message overhead, and every request adds
//! a fixed priming overhead.

use roundtable_domain::TokenEstimator;
use thiserror::Error;
use tiktoken_rs::CoreBPE;
use tracing::{debug, warn};

const MESSAGE_OVERHEAD: usize = 4;
const CONVERSATION_OVERHEAD: usize = 2;
const FALLBACK_ENCODING: &str = "cl100k_base";

#[derive(Error, Debug)]
#[error("Failed to load tokenizer {encoding}: {message}")]
pub struct TokenizerError {
    pub encoding: String,
    pub message: String,
}

/// Token estimator for a reference model's BPE encoding
pub struct TiktokenEstimator {
    bpe: CoreBPE,
    name: String,
    fallback: bool,
}

impl TiktokenEstimator {
    /// Estimator for `model`, falling back to `cl100k_base` when the model
    /// has no known encoding.
    pub fn for_model(model: &str) -> Result<Self, TokenizerError> {
        match tiktoken_rs::get_bpe_from_model(model) {
            Ok(bpe) => {
                debug!("Using tiktoken encoding for {}", model);
                Ok(Self {
                    bpe,
                    name: model.to_string(),
                    fallback: false,
                })
            }
            Err(e) => {
                warn!(
                    "No tiktoken encoding for '{}' ({}), falling back to {}",
                    model, e, FALLBACK_ENCODING
                );
                let mut estimator = Self::cl100k()?;
                estimator.fallback = true;
                Ok(estimator)
            }
        }
    }

    /// Estimator using the `cl100k_base` encoding directly
    pub fn cl100k() -> Result<Self, TokenizerError> {
        let bpe = tiktoken_rs::cl100k_base().map_err(|e| TokenizerError {
            encoding: FALLBACK_ENCODING.to_string(),
            message: e.to_string(),
        })?;
        Ok(Self {
            bpe,
            name: FALLBACK_ENCODING.to_string(),
            fallback: false,
        })
    }

    /// Whether the requested model was unknown and `cl100k_base` is in use
    pub fn is_fallback(&self) -> bool {
        self.fallback
    }
}

impl std::fmt::Debug for TiktokenEstimator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TiktokenEstimator")
            .field("name", &self.name)
            .field("fallback", &self.fallback)
            .finish()
    }
}

impl TokenEstimator for TiktokenEstimator {
    fn name(&self) -> &str {
        &self.name
    }

    fn count_text(&self, text: &str) -> usize {
        self.bpe.encode_with_special_tokens(text).len()
    }

    fn message_overhead(&self) -> usize {
        MESSAGE_OVERHEAD
    }

    fn conversation_overhead(&self) -> usize {
        CONVERSATION_OVERHEAD
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_model() {
        let estimator = TiktokenEstimator::for_model("gpt-4").unwrap();
        assert!(!estimator.is_fallback());
        assert_eq!(estimator.name(), "gpt-4");
    }

    #[test]
    fn test_unknown_model_falls_back() {
        let estimator = TiktokenEstimator::for_model("deepseek-chat-v9").unwrap();
        assert!(estimator.is_fallback());
        assert_eq!(estimator.name(), "cl100k_base");
    }

    #[test]
    fn test_counts_include_overheads() {
        let estimator = TiktokenEstimator::cl100k().unwrap();
        assert_eq!(estimator.count_text(""), 0);
        let text = estimator.count_text("hello world");
        assert!(text > 0);
        assert_eq!(estimator.count_message("hello world"), text + 4);
        assert_eq!(estimator.conversation_overhead(), 2);
    }
}
