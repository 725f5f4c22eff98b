//! Progress notification port
//!
//! Defines the interface for reporting progress while a round is dispatched.

use roundtable_domain::{Model, RoundKind};

/// Callback for progress updates during a discussion
///
/// Implementations live in the presentation layer.
pub trait ProgressNotifier: Send + Sync {
    /// Called when a round's requests are about to be dispatched
    fn on_round_start(&self, kind: RoundKind, index: u32, total: u32, participants: usize);

    /// Called as each participant's call finishes, in completion order
    fn on_participant_complete(&self, model: &Model, success: bool);

    /// Called once every participant of the round has finished
    fn on_round_complete(&self, kind: RoundKind, index: u32);
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl ProgressNotifier for NoProgress {
    fn on_round_start(&self, _kind: RoundKind, _index: u32, _total: u32, _participants: usize) {}
    fn on_participant_complete(&self, _model: &Model, _success: bool) {}
    fn on_round_complete(&self, _kind: RoundKind, _index: u32) {}
}
