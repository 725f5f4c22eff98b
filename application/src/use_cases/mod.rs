//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod discussion;
pub mod dispatch;
pub mod run_discussion;
