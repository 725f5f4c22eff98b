//! Discussion domain
//!
//! - [`message::Message`] - one immutable entry of the shared conversation
//! - [`history::History`] - the append-only, token-budgeted conversation
//! - [`participant::Roster`] - the fixed, shared list of participants
//! - [`round::Round`] - per-round contributions and the round cursor
//! - [`state::DiscussionState`] - the round controller's states

pub mod chat;
pub mod history;
pub mod message;
pub mod participant;
pub mod round;
pub mod state;
pub mod usage;
