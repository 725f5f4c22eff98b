//! CLI entrypoint for roundtable
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use roundtable_application::{
    AutoFinish, BackendGateway, FanOutTranscript, HumanInputPort, NoProgress, ProgressNotifier,
    RunDiscussionInput, RunDiscussionUseCase, TranscriptSink,
};
use roundtable_domain::{HeuristicEstimator, Model, Roster, TokenEstimator, Topic};
use roundtable_infrastructure::{
    ConfigLoader, FileConfig, MarkdownTranscript, OpenAiConfig, OpenAiGateway, Severity,
    TiktokenEstimator,
};
use roundtable_presentation::{Cli, ConsoleRenderer, InteractiveHumanInput, ProgressReporter};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Console logging by verbosity, plus a DEBUG log file in `log_dir`.
///
/// Returns the log path (if the file could be opened) and the guard that
/// flushes it on drop.
fn init_logging(verbose: u8, log_dir: &Path) -> (Option<PathBuf>, Option<WorkerGuard>) {
    let filter = match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };
    let console = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(filter);

    let prefix = format!("roundtable_{}", chrono::Local::now().format("%Y%m%d_%H%M%S"));
    let appender = std::fs::create_dir_all(log_dir)
        .map_err(|e| e.to_string())
        .and_then(|_| {
            RollingFileAppender::builder()
                .rotation(Rotation::NEVER)
                .filename_prefix(&prefix)
                .filename_suffix("log")
                .build(log_dir)
                .map_err(|e| e.to_string())
        });

    match appender {
        Ok(appender) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let file = fmt::layer()
                .with_ansi(false)
                .with_writer(writer)
                .with_filter(EnvFilter::new("debug"));
            tracing_subscriber::registry().with(console).with(file).init();
            (Some(log_dir.join(format!("{}.log", prefix))), Some(guard))
        }
        Err(e) => {
            tracing_subscriber::registry().with(console).init();
            warn!("Could not open log file in {}: {}", log_dir.display(), e);
            (None, None)
        }
    }
}

fn load_config(cli: &Cli) -> Result<FileConfig> {
    let loaded = if cli.no_config {
        ConfigLoader::load_env_only()
    } else {
        ConfigLoader::load(cli.config.as_deref())
    };
    loaded.map_err(|e| anyhow!("Failed to load configuration: {}", e))
}

fn build_estimator(model: &str) -> Arc<dyn TokenEstimator> {
    match TiktokenEstimator::for_model(model) {
        Ok(estimator) => Arc::new(estimator),
        Err(e) => {
            warn!("{}; using the character-count heuristic", e);
            Arc::new(HeuristicEstimator::default())
        }
    }
}

/// Participants from `-m`, then config, then backend discovery
async fn resolve_models(
    cli: &Cli,
    config: &FileConfig,
    gateway: &dyn BackendGateway,
    prompter: Option<&InteractiveHumanInput>,
) -> Result<Vec<Model>> {
    let from_cli: Vec<Model> = cli.model.iter().filter_map(Model::try_new).collect();
    if !from_cli.is_empty() {
        return Ok(from_cli);
    }
    let from_config = config.discussion.models();
    if !from_config.is_empty() {
        return Ok(from_config);
    }

    let Some(prompter) = prompter else {
        bail!("No models configured. Use -m <MODEL>, MODELS or [discussion] models.");
    };
    let available = gateway
        .available_models()
        .await
        .context("Failed to list models from the backend")?;
    info!("Backend offers {} models", available.len());
    println!("{}", ConsoleRenderer::format_model_table(&available));
    Ok(prompter.select_models(&available)?)
}

fn resolve_topic(
    cli: &Cli,
    config: &FileConfig,
    prompter: Option<&InteractiveHumanInput>,
) -> Result<Topic> {
    if let Some(topic) = cli.topic.as_deref().and_then(Topic::try_new) {
        return Ok(topic);
    }
    if let Some(topic) = config.discussion.topic() {
        return Ok(topic);
    }
    match prompter {
        Some(prompter) => Ok(prompter.prompt_topic()?),
        None => bail!("No topic given. Use -t <TOPIC>, TOPIC or [discussion] topic."),
    }
}

fn resolve_rounds(
    cli: &Cli,
    config: &FileConfig,
    prompter: Option<&InteractiveHumanInput>,
) -> Result<u32> {
    if let Some(rounds) = cli.rounds.or(config.discussion.initial_rounds) {
        return Ok(rounds);
    }
    match prompter {
        Some(prompter) => Ok(prompter.prompt_rounds()?),
        None => Ok(config.discussion.initial_rounds()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // .env first so it feeds the environment layer of the config
    let dotenv = ConfigLoader::load_dotenv();

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_deref());
        return Ok(());
    }

    let file_config = load_config(&cli)?;
    let (log_path, _log_guard) = init_logging(cli.verbose, &file_config.output.log_dir);

    info!("Starting roundtable");
    if let Some(path) = dotenv {
        info!("Loaded environment from {}", path.display());
    }

    for issue in file_config.validate() {
        if issue.severity == Severity::Warning {
            warn!("{}", issue.message);
        }
    }
    let mut discussion_config = file_config.to_discussion_config()?;

    // === Dependency Injection ===
    let estimator = build_estimator(&file_config.budget.tiktoken_model);
    let api_key = file_config.api.api_key().unwrap_or_default().to_string();
    let gateway = Arc::new(OpenAiGateway::new(OpenAiConfig {
        base_url: file_config.api.base_url.clone(),
        api_key,
        timeout: None,
    })?);

    let interactive = (!cli.non_interactive).then(InteractiveHumanInput::new);
    let prompter = interactive.as_ref();

    let models = resolve_models(&cli, &file_config, gateway.as_ref(), prompter).await?;
    let topic = resolve_topic(&cli, &file_config, prompter)?;
    let rounds = resolve_rounds(&cli, &file_config, prompter)?;
    discussion_config = discussion_config.with_initial_rounds(rounds);

    let roster = Roster::from_models(models, discussion_config.sampling)?;

    let markdown = match MarkdownTranscript::create(&file_config.output.output_dir, topic.content())
    {
        Ok(markdown) => Some(markdown),
        Err(e) => {
            warn!(
                "Could not prepare transcript in {}: {}",
                file_config.output.output_dir.display(),
                e
            );
            None
        }
    };
    let transcript_path = markdown.as_ref().map(|m| m.path().to_path_buf());
    let mut sinks: Vec<Box<dyn TranscriptSink>> = vec![Box::new(ConsoleRenderer::new())];
    if let Some(markdown) = markdown {
        sinks.push(Box::new(markdown));
    }
    let transcript = FanOutTranscript::new(sinks);

    let human: &dyn HumanInputPort = match &interactive {
        Some(prompter) => prompter,
        None => &AutoFinish,
    };
    let progress: Box<dyn ProgressNotifier> = if cli.quiet {
        Box::new(NoProgress)
    } else {
        Box::new(ProgressReporter::new())
    };

    let use_case = RunDiscussionUseCase::new(gateway, estimator, discussion_config);
    let report = use_case
        .execute_with_progress(
            RunDiscussionInput::new(topic, roster),
            human,
            &transcript,
            progress.as_ref(),
        )
        .await?;

    ConsoleRenderer::print_report(&report, transcript_path.as_deref(), log_path.as_deref());
    Ok(())
}
