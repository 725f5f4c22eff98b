//! CLI command definitions

use clap::Parser;
use std::path::PathBuf;

/// CLI arguments for roundtable
#[derive(Parser, Debug)]
#[command(name = "roundtable")]
#[command(author, version, about = "Multi-round discussions between LLMs, steered by a human")]
#[command(long_about = r#"
Roundtable lets several models discuss a topic over multiple rounds.

Every round, each participant sees the shared transcript and answers the
others. When the planned rounds are done you can finish (each model writes a
closing summary) or add rounds, optionally with guidance for the models.

Configuration is merged from (highest priority first):
1. Environment variables (API_KEY, BASE_API, MODELS, ...; .env is loaded)
2. --config <path>           Explicit config file
3. ./roundtable.toml         Project-level config
4. ~/.config/roundtable/config.toml   Global config

Example:
  roundtable -t "Is open-source AI safer?" -r 3 -m gpt-4o -m deepseek-chat
  roundtable --non-interactive -t "Tabs or spaces?"
"#)]
pub struct Cli {
    /// Discussion topic (prompted for when missing)
    #[arg(short, long)]
    pub topic: Option<String>,

    /// Rounds before the first continue/finish decision
    #[arg(short, long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    pub rounds: Option<u32>,

    /// Participating models (can be specified multiple times)
    #[arg(short, long, value_name = "MODEL")]
    pub model: Vec<String>,

    /// Finish after the planned rounds without prompting
    #[arg(long)]
    pub non_interactive: bool,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files (environment still applies)
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration sources and exit
    #[arg(long)]
    pub show_config: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_invocation() {
        let cli = Cli::try_parse_from([
            "roundtable",
            "-t",
            "Tabs or spaces?",
            "-r",
            "2",
            "-m",
            "gpt-4o",
            "--model",
            "qwen-max",
            "-vv",
            "--non-interactive",
        ])
        .unwrap();
        assert_eq!(cli.topic.as_deref(), Some("Tabs or spaces?"));
        assert_eq!(cli.rounds, Some(2));
        assert_eq!(cli.model, vec!["gpt-4o", "qwen-max"]);
        assert_eq!(cli.verbose, 2);
        assert!(cli.non_interactive);
        assert!(!cli.quiet);
    }

    #[test]
    fn test_zero_rounds_rejected() {
        assert!(Cli::try_parse_from(["roundtable", "-r", "0"]).is_err());
    }
}
