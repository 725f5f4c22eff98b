//! Progress reporters for the dispatch pool

pub mod reporter;
