//! Infrastructure layer for roundtable
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, plus configuration file loading.

pub mod config;
pub mod openai;
pub mod tokenizer;
pub mod transcript;

// Re-export commonly used types
pub use config::{ConfigError, ConfigIssue, ConfigLoader, FileConfig, Severity};
pub use openai::{
    error::{OpenAiError, Result},
    gateway::{OpenAiConfig, OpenAiGateway},
};
pub use tokenizer::{TiktokenEstimator, TokenizerError};
pub use transcript::MarkdownTranscript;
