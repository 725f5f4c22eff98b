//! Transcript persistence

mod markdown;

pub use markdown::MarkdownTranscript;
