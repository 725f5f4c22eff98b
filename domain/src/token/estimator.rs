//! Token estimator contract and the built-in heuristic estimator.

/// Estimates how many tokens a piece of text occupies in a model's context.
///
/// Implementations must be pure: the same input always yields the same count.
/// The history caches per-message results, so estimators are not expected to
/// memoize.
///
/// Counts are approximations of each backend's real tokenizer; backend-reported
/// usage takes precedence wherever it exists.
pub trait TokenEstimator: Send + Sync {
    /// Name of the reference model or encoding (for logs)
    fn name(&self) -> &str;

    /// Tokens in a bare piece of text
    fn count_text(&self, text: &str) -> usize;

    /// Fixed cost added per message (role markers, separators)
    fn message_overhead(&self) -> usize {
        0
    }

    /// Fixed cost added once per conversation (reply priming)
    fn conversation_overhead(&self) -> usize {
        0
    }

    /// Tokens for one message with the given content
    fn count_message(&self, content: &str) -> usize {
        self.message_overhead() + self.count_text(content)
    }
}

/// Character-count approximation: `ceil(bytes / chars_per_token)`.
///
/// Used when no tokenizer is available for the reference model, and in tests
/// where exact, hand-computable counts are needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeuristicEstimator {
    chars_per_token: usize,
}

impl HeuristicEstimator {
    pub fn new(chars_per_token: usize) -> Self {
        Self {
            chars_per_token: chars_per_token.max(1),
        }
    }

    pub fn chars_per_token(&self) -> usize {
        self.chars_per_token
    }
}

impl Default for HeuristicEstimator {
    fn default() -> Self {
        Self::new(4)
    }
}

impl TokenEstimator for HeuristicEstimator {
    fn name(&self) -> &str {
        "heuristic"
    }

    fn count_text(&self, text: &str) -> usize {
        text.len().div_ceil(self.chars_per_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heuristic_estimate() {
        let est = HeuristicEstimator::new(4);
        assert_eq!(est.count_text("twelve chars"), 3);
        assert_eq!(est.count_text("thirteen char"), 4);
        assert_eq!(est.count_text(""), 0);
    }

    #[test]
    fn test_zero_chars_per_token_clamped() {
        let est = HeuristicEstimator::new(0);
        assert_eq!(est.chars_per_token(), 1);
        assert_eq!(est.count_text("abc"), 3);
    }

    #[test]
    fn test_count_message_adds_overhead() {
        struct Overhead;
        impl TokenEstimator for Overhead {
            fn name(&self) -> &str {
                "overhead"
            }
            fn count_text(&self, text: &str) -> usize {
                text.split_whitespace().count()
            }
            fn message_overhead(&self) -> usize {
                4
            }
        }

        assert_eq!(Overhead.count_message("one two three"), 7);
        assert_eq!(Overhead.conversation_overhead(), 0);
    }

    #[test]
    fn test_estimation_is_idempotent() {
        let est = HeuristicEstimator::default();
        let text = "The quick brown fox jumps over the lazy dog.";
        assert_eq!(est.count_message(text), est.count_message(text));
    }
}
