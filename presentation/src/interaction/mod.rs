//! Interactive terminal prompts

pub mod human_input;

pub use human_input::{InteractiveHumanInput, parse_selection};
