//! Configuration loading for roundtable
//!
//! Merges built-in defaults, TOML files and environment variables into a
//! [`FileConfig`], then validates and converts it into the application's
//! [`DiscussionConfig`](roundtable_application::DiscussionConfig).
//!
//! Priority (highest to lowest):
//!
//! 1. Environment variables (`API_KEY`, `MODELS`, ..., `.env` included)
//! 2. `--config <path>` specified file
//! 3. Project root: `./roundtable.toml` or `./.roundtable.toml`
//! 4. Global: `$XDG_CONFIG_HOME/roundtable/config.toml`
//! 5. Default values

mod file_config;
mod issue;
mod loader;

pub use file_config::{
    DEFAULT_BASE_URL, DEFAULT_INITIAL_ROUNDS, FileApiConfig, FileBudgetConfig, FileConfig, FileDiscussionConfig,
    FileOutputConfig, FilePromptsConfig, ModelList,
};
pub use issue::{ConfigError, ConfigIssue, ConfigIssueCode, Severity};
pub use loader::{ConfigLoader, ENV_KEYS};
