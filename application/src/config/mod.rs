//! Application-level configuration.
//!
//! - [`DiscussionConfig`] - round, dispatch and budget parameters for a session
//! - [`BudgetConfig`] - token ceiling and reply reservation

pub mod discussion_config;

pub use discussion_config::{BudgetConfig, DiscussionConfig};
