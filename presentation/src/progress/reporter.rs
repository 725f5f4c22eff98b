//! Progress reporting for discussion rounds

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use roundtable_application::ProgressNotifier;
use roundtable_domain::{Model, RoundKind};
use std::sync::Mutex;

/// Reports progress during a round with a progress bar
pub struct ProgressReporter {
    round_bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            round_bar: Mutex::new(None),
        }
    }

    fn round_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }

    fn round_name(kind: RoundKind, index: u32, total: u32) -> String {
        match kind {
            RoundKind::Summary => "Final summary".to_string(),
            _ => format!("Round {}/{}", index, total),
        }
    }

    fn with_bar(&self, f: impl FnOnce(&mut Option<ProgressBar>)) {
        if let Ok(mut bar) = self.round_bar.lock() {
            f(&mut bar);
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressNotifier for ProgressReporter {
    fn on_round_start(&self, kind: RoundKind, index: u32, total: u32, participants: usize) {
        let pb = ProgressBar::new(participants as u64);
        pb.set_style(Self::round_style());
        pb.set_prefix(Self::round_name(kind, index, total));
        pb.set_message("Waiting for replies...");
        self.with_bar(|bar| *bar = Some(pb));
    }

    fn on_participant_complete(&self, model: &Model, success: bool) {
        self.with_bar(|bar| {
            if let Some(pb) = bar.as_ref() {
                let status = if success {
                    format!("{} {}", "v".green(), model)
                } else {
                    format!("{} {}", "x".red(), model)
                };
                pb.set_message(status);
                pb.inc(1);
            }
        });
    }

    fn on_round_complete(&self, _kind: RoundKind, _index: u32) {
        self.with_bar(|bar| {
            if let Some(pb) = bar.take() {
                pb.finish_and_clear();
            }
        });
    }
}

/// Simple text-based progress (no fancy UI)
pub struct SimpleProgress;

impl ProgressNotifier for SimpleProgress {
    fn on_round_start(&self, kind: RoundKind, index: u32, total: u32, participants: usize) {
        println!(
            "{} {} ({} participants)",
            "->".cyan(),
            ProgressReporter::round_name(kind, index, total).bold(),
            participants
        );
    }

    fn on_participant_complete(&self, model: &Model, success: bool) {
        if success {
            println!("  {} {}", "v".green(), model);
        } else {
            println!("  {} {} (failed)", "x".red(), model);
        }
    }

    fn on_round_complete(&self, _kind: RoundKind, _index: u32) {}
}
