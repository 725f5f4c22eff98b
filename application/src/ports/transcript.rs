//! Port for receiving the discussion transcript as it grows.
//!
//! Sinks get every completed round (and the closing summary) together with
//! the cumulative token usage. The core never writes files or the terminal
//! itself. Methods are synchronous and non-fallible; a sink that fails to
//! persist should log and carry on.

use roundtable_domain::{Model, Round, TokenUsage, Topic, TrimReport};

/// What a sink learns when the session starts
#[derive(Debug, Clone)]
pub struct SessionHeader {
    pub topic: Topic,
    pub participants: Vec<Model>,
    pub max_tokens: usize,
    pub planned_rounds: u32,
}

pub trait TranscriptSink: Send + Sync {
    fn on_session_start(&self, _header: &SessionHeader) {}

    /// A discussion round finished and its replies are in the history.
    fn on_round_complete(&self, round: &Round, usage: &TokenUsage);

    /// Closing summaries were collected; the session is finished.
    fn on_summary(&self, round: &Round, usage: &TokenUsage);

    /// Messages were evicted to keep the history under budget.
    fn on_trim(&self, _report: &TrimReport) {}
}

/// No-op sink for tests and headless runs.
pub struct NoTranscript;

impl TranscriptSink for NoTranscript {
    fn on_round_complete(&self, _round: &Round, _usage: &TokenUsage) {}
    fn on_summary(&self, _round: &Round, _usage: &TokenUsage) {}
}

/// Forwards every event to each inner sink in order.
pub struct FanOutTranscript {
    sinks: Vec<Box<dyn TranscriptSink>>,
}

impl FanOutTranscript {
    pub fn new(sinks: Vec<Box<dyn TranscriptSink>>) -> Self {
        Self { sinks }
    }
}

impl TranscriptSink for FanOutTranscript {
    fn on_session_start(&self, header: &SessionHeader) {
        for sink in &self.sinks {
            sink.on_session_start(header);
        }
    }

    fn on_round_complete(&self, round: &Round, usage: &TokenUsage) {
        for sink in &self.sinks {
            sink.on_round_complete(round, usage);
        }
    }

    fn on_summary(&self, round: &Round, usage: &TokenUsage) {
        for sink in &self.sinks {
            sink.on_summary(round, usage);
        }
    }

    fn on_trim(&self, report: &TrimReport) {
        for sink in &self.sinks {
            sink.on_trim(report);
        }
    }
}
