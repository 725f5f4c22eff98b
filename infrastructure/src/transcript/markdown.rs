//! Markdown transcript writer.
//!
//! The transcript is buffered in memory and the whole file is rewritten after
//! every round, so an interrupted session still leaves a readable record.

use chrono::{DateTime, Local};
use roundtable_application::{SessionHeader, TranscriptSink};
use roundtable_domain::core::string::sanitize_file_stem;
use roundtable_domain::{Round, RoundKind, TokenUsage};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info, warn};

const MAX_STEM_CHARS: usize = 50;

/// Markdown transcript sink writing `<dir>/<YYYYMMDD_HHMMSS>_<topic>.md`.
pub struct MarkdownTranscript {
    path: PathBuf,
    started_at: DateTime<Local>,
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    lines: Vec<String>,
    participants: usize,
}

impl MarkdownTranscript {
    /// Prepare a transcript for `topic` under `output_dir`.
    ///
    /// Creates the directory; the file itself appears at session start.
    pub fn create(output_dir: impl AsRef<Path>, topic: &str) -> std::io::Result<Self> {
        Self::create_at(output_dir, topic, Local::now())
    }

    pub fn create_at(
        output_dir: impl AsRef<Path>,
        topic: &str,
        started_at: DateTime<Local>,
    ) -> std::io::Result<Self> {
        let output_dir = output_dir.as_ref();
        std::fs::create_dir_all(output_dir)?;

        let file_name = format!(
            "{}_{}.md",
            started_at.format("%Y%m%d_%H%M%S"),
            sanitize_file_stem(topic, MAX_STEM_CHARS)
        );
        let path = output_dir.join(file_name);
        info!("Transcript will be written to {}", path.display());

        Ok(Self {
            path,
            started_at,
            state: Mutex::new(State::default()),
        })
    }

    /// Get the path to the transcript file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn with_state(&self, f: impl FnOnce(&mut State)) {
        let Ok(mut state) = self.state.lock() else {
            warn!("Transcript state poisoned; skipping update");
            return;
        };
        f(&mut state);
        self.save(&state.lines);
    }

    fn save(&self, lines: &[String]) {
        match std::fs::write(&self.path, lines.join("\n")) {
            Ok(()) => debug!("Transcript saved to {}", self.path.display()),
            Err(e) => warn!("Could not write transcript {}: {}", self.path.display(), e),
        }
    }
}

fn push_round(lines: &mut Vec<String>, round: &Round) {
    if round.kind == RoundKind::Summary {
        lines.push("## Final Summary".to_string());
    } else {
        lines.push(format!("## {}", round.label()));
    }
    lines.push(String::new());

    if let Some(guidance) = &round.guidance {
        lines.push("### Human Guidance".to_string());
        lines.push(String::new());
        lines.extend(guidance.lines().map(|l| format!("> {}", l)));
        lines.push(String::new());
    }

    for contribution in &round.contributions {
        lines.push(format!("### {}", contribution.model));
        lines.push(String::new());
        match contribution.message() {
            Some(message) => lines.push(message.content().to_string()),
            None => lines.push("[no reply]".to_string()),
        }
        lines.push(String::new());
    }
}

/// `1234567` → `1,234,567`
fn thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

impl TranscriptSink for MarkdownTranscript {
    fn on_session_start(&self, header: &SessionHeader) {
        let participants: Vec<String> = header.participants.iter().map(|m| m.to_string()).collect();
        let time = self.started_at.format("%Y-%m-%d %H:%M:%S").to_string();
        self.with_state(|state| {
            state.participants = participants.len();
            state.lines.extend([
                "# Roundtable Discussion".to_string(),
                String::new(),
                format!("> **Topic**: {}  ", header.topic),
                format!("> **Time**: {}  ", time),
                format!("> **Participants**: {}  ", participants.join(", ")),
                format!("> **Token Limit**: {}", header.max_tokens),
                String::new(),
                "---".to_string(),
                String::new(),
            ]);
        });
    }

    fn on_round_complete(&self, round: &Round, usage: &TokenUsage) {
        self.with_state(|state| {
            push_round(&mut state.lines, round);
            state.lines.extend([
                format!(
                    "> Cumulative tokens: prompt {}, completion {}",
                    thousands(usage.prompt_tokens),
                    thousands(usage.completion_tokens)
                ),
                String::new(),
                "---".to_string(),
                String::new(),
            ]);
        });
    }

    fn on_summary(&self, round: &Round, usage: &TokenUsage) {
        let discussion_rounds = round.index.saturating_sub(1);
        self.with_state(|state| {
            push_round(&mut state.lines, round);
            let participants = state.participants.max(round.contributions.len());
            state.lines.extend([
                "---".to_string(),
                String::new(),
                "## Statistics".to_string(),
                String::new(),
                "| Metric | Value |".to_string(),
                "|--------|-------|".to_string(),
                format!("| Rounds | {} |", discussion_rounds),
                format!("| Participants | {} |", participants),
                format!("| Prompt Tokens | {} |", thousands(usage.prompt_tokens)),
                format!("| Completion Tokens | {} |", thousands(usage.completion_tokens)),
                format!("| Total Tokens | {} |", thousands(usage.total())),
                String::new(),
            ]);
        });
        info!("Transcript saved: {}", self.path.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use roundtable_domain::{Contribution, Message, Model, Topic};

    fn model(id: &str) -> Model {
        Model::try_new(id).unwrap()
    }

    fn transcript(dir: &Path, topic: &str) -> MarkdownTranscript {
        let at = Local.with_ymd_and_hms(2026, 3, 14, 9, 26, 53).unwrap();
        MarkdownTranscript::create_at(dir, topic, at).unwrap()
    }

    fn header() -> SessionHeader {
        SessionHeader {
            topic: Topic::try_new("Is Rust fun?").unwrap(),
            participants: vec![model("gpt-4o"), model("qwen-max")],
            max_tokens: 32_000,
            planned_rounds: 2,
        }
    }

    fn round(index: u32, kind: RoundKind, guidance: Option<&str>) -> Round {
        Round {
            index,
            total_rounds: 2,
            kind,
            guidance: guidance.map(str::to_string),
            contributions: vec![
                Contribution::replied(
                    model("gpt-4o"),
                    Message::assistant(&model("gpt-4o"), index, format!("gpt says {index}")),
                ),
                Contribution::failed(model("qwen-max"), "Timeout"),
            ],
        }
    }

    #[test]
    fn test_file_name_is_timestamped_and_sanitized() {
        let dir = tempfile::tempdir().unwrap();
        let t = transcript(dir.path(), "Rust vs. C++: who/what?");
        assert_eq!(
            t.path().file_name().unwrap().to_string_lossy(),
            "20260314_092653_Rust vs_ C___ who_what_.md"
        );
    }

    #[test]
    fn test_creates_missing_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let t = transcript(&nested, "topic");
        t.on_session_start(&header());
        assert!(t.path().exists());
    }

    #[test]
    fn test_saved_after_every_round() {
        let dir = tempfile::tempdir().unwrap();
        let t = transcript(dir.path(), "Is Rust fun?");
        t.on_session_start(&header());

        t.on_round_complete(&round(1, RoundKind::Opening, None), &TokenUsage::new(1200, 300));
        let content = std::fs::read_to_string(t.path()).unwrap();
        assert!(content.contains("> **Topic**: Is Rust fun?"));
        assert!(content.contains("> **Time**: 2026-03-14 09:26:53"));
        assert!(content.contains("> **Participants**: gpt-4o, qwen-max"));
        assert!(content.contains("## Round 1/2\n\n### gpt-4o\n\ngpt says 1\n\n### qwen-max\n\n[no reply]"));
        assert!(content.contains("> Cumulative tokens: prompt 1,200, completion 300"));

        t.on_round_complete(
            &round(2, RoundKind::Discussion, Some("Focus on safety\nand speed")),
            &TokenUsage::new(2500, 600),
        );
        let content = std::fs::read_to_string(t.path()).unwrap();
        assert!(content.contains("## Round 2/2 (with human guidance)"));
        assert!(content.contains("### Human Guidance\n\n> Focus on safety\n> and speed\n"));
    }

    #[test]
    fn test_summary_adds_statistics() {
        let dir = tempfile::tempdir().unwrap();
        let t = transcript(dir.path(), "Is Rust fun?");
        t.on_session_start(&header());
        t.on_round_complete(&round(1, RoundKind::Opening, None), &TokenUsage::new(10, 5));
        t.on_round_complete(&round(2, RoundKind::Discussion, None), &TokenUsage::new(20, 10));
        t.on_summary(&round(3, RoundKind::Summary, None), &TokenUsage::new(1_234_567, 89));

        let content = std::fs::read_to_string(t.path()).unwrap();
        assert!(content.contains("## Final Summary\n\n### gpt-4o\n\ngpt says 3"));
        assert!(content.contains("| Rounds | 2 |"));
        assert!(content.contains("| Participants | 2 |"));
        assert!(content.contains("| Prompt Tokens | 1,234,567 |"));
        assert!(content.contains("| Total Tokens | 1,234,656 |"));
    }

    #[test]
    fn test_thousands() {
        assert_eq!(thousands(0), "0");
        assert_eq!(thousands(999), "999");
        assert_eq!(thousands(1000), "1,000");
        assert_eq!(thousands(12_345_678), "12,345,678");
    }
}
