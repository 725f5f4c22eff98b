//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure and presentation adapters
//! must implement.

pub mod backend_gateway;
pub mod human_input;
pub mod progress;
pub mod transcript;
