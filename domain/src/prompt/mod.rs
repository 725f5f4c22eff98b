//! Prompt domain
//!
//! Named-placeholder templates for each prompt a discussion sends, and the
//! built-in defaults.

mod prompt_set;
mod template;

pub use prompt_set::{
    DEFAULT_DISCUSSION_PROMPT, DEFAULT_FIRST_ROUND_PROMPT, DEFAULT_HUMAN_GUIDE_PROMPT,
    DEFAULT_SUMMARY_PROMPT, DEFAULT_SYSTEM_PROMPT, PromptOverrides, PromptSet, RoundPosition,
    format_others_text,
};
pub use template::{Placeholder, PromptParams, PromptTemplate, TemplateError, TemplateKind};
