//! Configuration loader with multi-source merging

use super::file_config::FileConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};
use tracing::debug;

const PROJECT_FILES: [&str; 2] = ["roundtable.toml", ".roundtable.toml"];

/// Environment variables read as overrides, highest priority
pub const ENV_KEYS: [&str; 19] = [
    "BASE_API",
    "API_KEY",
    "REQUEST_TIMEOUT_SECS",
    "MODELS",
    "TOPIC",
    "INITIAL_ROUNDS",
    "MAX_WORKERS",
    "TEMPERATURE_MIN",
    "TEMPERATURE_MAX",
    "MAX_TOKENS",
    "RESPONSE_TOKENS",
    "TIKTOKEN_MODEL",
    "OUTPUT_DIR",
    "LOG_DIR",
    "SYSTEM_PROMPT",
    "FIRST_ROUND_PROMPT",
    "DISCUSSION_PROMPT",
    "HUMAN_GUIDE_PROMPT",
    "SUMMARY_PROMPT",
];

/// Dotted config path for a flat environment variable name
fn env_key_path(key: &str) -> &'static str {
    match key.to_ascii_uppercase().as_str() {
        "BASE_API" => "api.base_url",
        "API_KEY" => "api.api_key",
        "REQUEST_TIMEOUT_SECS" => "api.request_timeout_secs",
        "MODELS" => "discussion.models",
        "TOPIC" => "discussion.topic",
        "INITIAL_ROUNDS" => "discussion.initial_rounds",
        "MAX_WORKERS" => "discussion.max_workers",
        "TEMPERATURE_MIN" => "discussion.temperature_min",
        "TEMPERATURE_MAX" => "discussion.temperature_max",
        "MAX_TOKENS" => "budget.max_tokens",
        "RESPONSE_TOKENS" => "budget.response_tokens",
        "TIKTOKEN_MODEL" => "budget.tiktoken_model",
        "OUTPUT_DIR" => "output.output_dir",
        "LOG_DIR" => "output.log_dir",
        "SYSTEM_PROMPT" => "prompts.system",
        "FIRST_ROUND_PROMPT" => "prompts.first_round",
        "DISCUSSION_PROMPT" => "prompts.discussion",
        "HUMAN_GUIDE_PROMPT" => "prompts.human_guide",
        "SUMMARY_PROMPT" => "prompts.summary",
        _ => "unmapped",
    }
}

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables ([`ENV_KEYS`])
    /// 2. Explicit config path (if provided)
    /// 3. Project root: `./roundtable.toml` or `./.roundtable.toml`
    /// 4. Global: `$XDG_CONFIG_HOME/roundtable/config.toml`
    /// 5. Default values
    pub fn load(config_path: Option<&Path>) -> Result<FileConfig, Box<figment::Error>> {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            debug!("Merging global config {}", global_path.display());
            figment = figment.merge(Toml::file(&global_path));
        }

        if let Some(path) = Self::project_config_path() {
            debug!("Merging project config {}", path.display());
            figment = figment.merge(Toml::file(&path));
        }

        if let Some(path) = config_path {
            debug!("Merging explicit config {}", path.display());
            figment = figment.merge(Toml::file(path));
        }

        Self::with_env(figment).extract().map_err(Box::new)
    }

    /// Defaults plus environment, skipping every config file (for --no-config)
    pub fn load_env_only() -> Result<FileConfig, Box<figment::Error>> {
        Self::with_env(Figment::new().merge(Serialized::defaults(FileConfig::default())))
            .extract()
            .map_err(Box::new)
    }

    /// Load `.env` from the working directory (or a parent) into the process
    /// environment. Variables already set are kept.
    pub fn load_dotenv() -> Option<PathBuf> {
        dotenvy::dotenv().ok()
    }

    fn with_env(figment: Figment) -> Figment {
        figment.merge(
            Env::raw()
                .only(&ENV_KEYS)
                .map(|key| env_key_path(key.as_str()).into()),
        )
    }

    /// Get the global config file path
    ///
    /// Returns `$XDG_CONFIG_HOME/roundtable/config.toml` if set,
    /// otherwise the platform config directory equivalent.
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("roundtable").join("config.toml"))
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path() -> Option<PathBuf> {
        PROJECT_FILES
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }

    /// Print the config file locations being used (for --show-config)
    pub fn print_config_sources(config_path: Option<&Path>) {
        println!("Configuration sources (in priority order):");

        let set: Vec<&str> = ENV_KEYS
            .iter()
            .copied()
            .filter(|key| std::env::var_os(key).is_some())
            .collect();
        if set.is_empty() {
            println!("  [     ] Env:     none of {} set", ENV_KEYS.join(", "));
        } else {
            println!("  [FOUND] Env:     {}", set.join(", "));
        }

        if let Some(path) = config_path {
            let mark = if path.exists() { "FOUND" } else { "MISSING" };
            println!("  [{:<5}] Explicit: {}", mark, path.display());
        }

        if let Some(path) = Self::project_config_path() {
            println!("  [FOUND] Project: {}", path.display());
        } else {
            println!("  [     ] Project: ./roundtable.toml or ./.roundtable.toml");
        }

        if let Some(path) = Self::global_config_path() {
            if path.exists() {
                println!("  [FOUND] Global:  {}", path.display());
            } else {
                println!("  [     ] Global:  {}", path.display());
            }
        }

        println!("  [FOUND] Default: built-in defaults");
    }
}
