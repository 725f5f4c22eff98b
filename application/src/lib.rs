//! Application layer for roundtable
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types
pub use config::{BudgetConfig, DiscussionConfig};
pub use ports::{
    backend_gateway::{BackendGateway, Completion, CompletionRequest, GatewayError},
    human_input::{AutoFinish, HumanInputError, HumanInputPort, ScriptedHumanInput},
    progress::{NoProgress, ProgressNotifier},
    transcript::{FanOutTranscript, NoTranscript, SessionHeader, TranscriptSink},
};
pub use use_cases::discussion::{DiscussionError, DiscussionSession, RoundOutcome};
pub use use_cases::dispatch::{DispatchOutcome, DispatchPool};
pub use use_cases::run_discussion::{
    DiscussionReport, RunDiscussionError, RunDiscussionInput, RunDiscussionUseCase,
};
