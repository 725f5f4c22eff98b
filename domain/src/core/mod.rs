//! Core domain concepts shared across all subdomains.
//!
//! - [`model::Model`] - identifier of a backend model taking part in a discussion
//! - [`topic::Topic`] - a validated discussion topic
//! - [`error::DomainError`] - domain-level errors

pub mod error;
pub mod model;
pub mod string;
pub mod topic;
