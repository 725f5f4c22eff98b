//! Backend connection settings from TOML (`[api]` section)

use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Raw backend configuration
///
/// # Example
///
/// ```toml
/// [api]
/// base_url = "https://api.deepseek.com/v1"
/// api_key = "sk-..."
/// request_timeout_secs = 120
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileApiConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    /// Per-call limit in seconds; unset or 0 waits indefinitely
    pub request_timeout_secs: Option<u64>,
}

impl Default for FileApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            request_timeout_secs: None,
        }
    }
}

impl FileApiConfig {
    /// The API key, if set and not blank
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}
