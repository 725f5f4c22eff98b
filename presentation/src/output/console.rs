//! Console rendering for discussion transcripts

use colored::{Color, Colorize};
use roundtable_application::{DiscussionReport, SessionHeader, TranscriptSink};
use roundtable_domain::{Model, Round, TokenUsage, TrimReport};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

const PANEL_WIDTH: usize = 60;

const MODEL_COLORS: [Color; 10] = [
    Color::Cyan,
    Color::Green,
    Color::Yellow,
    Color::Magenta,
    Color::Blue,
    Color::Red,
    Color::BrightCyan,
    Color::BrightGreen,
    Color::BrightYellow,
    Color::BrightMagenta,
];

/// Assigns each participant a color on first sight and keeps it
#[derive(Default)]
struct ColorMap(HashMap<String, Color>);

impl ColorMap {
    fn color_for(&mut self, model: &str) -> Color {
        let next = MODEL_COLORS[self.0.len() % MODEL_COLORS.len()];
        *self.0.entry(model.to_string()).or_insert(next)
    }
}

/// Prints each round to the terminal as it completes
pub struct ConsoleRenderer {
    colors: Mutex<ColorMap>,
}

impl ConsoleRenderer {
    pub fn new() -> Self {
        Self {
            colors: Mutex::new(ColorMap::default()),
        }
    }

    fn color_for(&self, model: &Model) -> Color {
        self.colors
            .lock()
            .map(|mut colors| colors.color_for(model.as_str()))
            .unwrap_or(Color::White)
    }

    /// Render one reply as a bordered panel
    pub fn panel(title: &str, content: &str, color: Color) -> String {
        let title = format!("─ {} ", title);
        let fill = PANEL_WIDTH.saturating_sub(title.chars().count() + 1);
        let mut out = format!(
            "{}\n",
            format!("╭{}{}", title, "─".repeat(fill)).color(color).bold()
        );
        for line in content.lines() {
            out.push_str(&format!("{} {}\n", "│".color(color), line));
        }
        out.push_str(&format!("{}\n", format!("╰{}", "─".repeat(PANEL_WIDTH - 1)).color(color)));
        out
    }

    /// Format a completed round: header, guidance, then one panel per participant
    pub fn format_round(&self, round: &Round) -> String {
        let mut output = Self::section_header(&round.label());

        if let Some(guidance) = &round.guidance {
            output.push_str(&format!(
                "{}\n{}\n\n",
                "Human guidance:".magenta().bold(),
                ConsoleRenderer::indent(guidance, "  > ")
            ));
        }

        for contribution in &round.contributions {
            let color = self.color_for(&contribution.model);
            match (contribution.message(), contribution.failure()) {
                (Some(message), _) => {
                    output.push_str(&Self::panel(
                        contribution.model.as_str(),
                        message.content(),
                        color,
                    ));
                }
                (None, reason) => {
                    output.push_str(&format!(
                        "{} {} {}\n",
                        "x".red().bold(),
                        contribution.model.as_str().color(color).bold(),
                        format!("[no reply] {}", reason.unwrap_or("")).dimmed()
                    ));
                }
            }
            output.push('\n');
        }
        output
    }

    pub fn format_usage(usage: &TokenUsage) -> String {
        format!("{} {}", "Cumulative tokens:".dimmed(), usage.to_string().dimmed())
    }

    /// Format the session banner
    pub fn format_start(header: &SessionHeader) -> String {
        let participants: Vec<String> = header.participants.iter().map(|m| m.to_string()).collect();
        let mut output = Self::header("Roundtable");
        output.push('\n');
        output.push_str(&format!("{} {}\n", "Topic:".cyan().bold(), header.topic));
        output.push_str(&format!(
            "{} {}\n",
            "Participants:".cyan().bold(),
            participants.join(", ")
        ));
        output.push_str(&format!(
            "{} {} planned, token limit {}\n",
            "Rounds:".cyan().bold(),
            header.planned_rounds,
            header.max_tokens
        ));
        output
    }

    /// Format the closing statistics table
    pub fn format_report(report: &DiscussionReport) -> String {
        let rows = [
            ("Rounds", report.completed_rounds().to_string()),
            ("Participants", report.participants.len().to_string()),
            ("Prompt tokens", report.usage.prompt_tokens.to_string()),
            ("Completion tokens", report.usage.completion_tokens.to_string()),
            ("Total tokens", report.usage.total().to_string()),
            ("History size (est.)", report.history_tokens.to_string()),
        ];
        let mut output = Self::section_header("Statistics");
        for (metric, value) in rows {
            output.push_str(&format!("  {:<22} {:>12}\n", metric.bold(), value));
        }
        output
    }

    /// Print the numbered model table used for interactive selection
    pub fn format_model_table(models: &[Model]) -> String {
        let mut output = Self::section_header("Available models");
        let width = models.len().to_string().len();
        for (i, model) in models.iter().enumerate() {
            output.push_str(&format!("  {:>width$}  {}\n", (i + 1).to_string().dimmed(), model));
        }
        output
    }

    pub fn print_start(header: &SessionHeader) {
        println!("{}", Self::format_start(header));
    }

    pub fn print_report(report: &DiscussionReport, transcript: Option<&Path>, log: Option<&Path>) {
        println!("{}", Self::format_report(report));
        if let Some(path) = transcript {
            println!("  {} {}", "Transcript:".cyan().bold(), path.display());
        }
        if let Some(path) = log {
            println!("  {} {}", "Run log:".cyan().bold(), path.display());
        }
        println!("{}", Self::footer());
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(PANEL_WIDTH);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        "=".repeat(PANEL_WIDTH).cyan().to_string()
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for ConsoleRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TranscriptSink for ConsoleRenderer {
    fn on_session_start(&self, header: &SessionHeader) {
        // Colors follow roster order
        for model in &header.participants {
            self.color_for(model);
        }
        Self::print_start(header);
    }

    fn on_round_complete(&self, round: &Round, usage: &TokenUsage) {
        println!("{}", self.format_round(round));
        println!("{}", Self::format_usage(usage));
    }

    fn on_summary(&self, round: &Round, usage: &TokenUsage) {
        println!("{}", self.format_round(round));
        println!("{}", Self::format_usage(usage));
    }

    fn on_trim(&self, report: &TrimReport) {
        println!(
            "{}",
            format!(
                "History trimmed: {} oldest message(s) dropped ({} -> {} tokens)",
                report.removed.len(),
                report.tokens_before,
                report.tokens_after
            )
            .yellow()
        );
    }
}
