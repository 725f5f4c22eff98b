//! Presentation layer for roundtable
//!
//! This crate contains the CLI definition, console rendering, progress
//! reporters, and interactive prompts.

pub mod cli;
pub mod interaction;
pub mod output;
pub mod progress;

// Re-export commonly used types
pub use cli::commands::Cli;
pub use interaction::InteractiveHumanInput;
pub use output::console::ConsoleRenderer;
pub use progress::reporter::{ProgressReporter, SimpleProgress};
