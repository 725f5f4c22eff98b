//! Output locations from TOML (`[output]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOutputConfig {
    /// Directory for Markdown transcripts
    pub output_dir: PathBuf,
    /// Directory for per-session debug logs
    pub log_dir: PathBuf,
}

impl Default for FileOutputConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("discussions"),
            log_dir: PathBuf::from("log"),
        }
    }
}
