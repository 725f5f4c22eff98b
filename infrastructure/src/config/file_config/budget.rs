//! Token budget settings from TOML (`[budget]` section)

use serde::{Deserialize, Serialize};

/// Raw token budget configuration
///
/// # Example
///
/// ```toml
/// [budget]
/// max_tokens = 32000
/// response_tokens = 2048
/// tiktoken_model = "gpt-4o"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileBudgetConfig {
    /// Ceiling on an estimated request, history plus reply
    pub max_tokens: usize,
    /// Cap on each generated reply
    pub response_tokens: u32,
    /// Model whose tokenizer approximates every participant's
    pub tiktoken_model: String,
}

impl Default for FileBudgetConfig {
    fn default() -> Self {
        Self {
            max_tokens: 32_000,
            response_tokens: 2048,
            tiktoken_model: "gpt-4o".to_string(),
        }
    }
}
