//! `flash-ui` command line
//!
//! Generates a session against Gemini (key from `GEMINI_API_KEY` or `API_KEY`),
//! prints per-slot outcomes, optionally explores and applies variations, and
//! exports the session as standalone HTML files.

use anyhow::{bail, Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use flash_core::{init_tracing, FlashConfig, LogFormat, Orchestrator, SubmitReport, TaskOutcome};
use flash_gemini::{GeminiConfig, GeminiProvider};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

fn cli() -> Command {
    let prompt = Arg::new("prompt")
        .required(true)
        .help("Description of the component to generate");
    let out = Arg::new("out")
        .long("out")
        .value_parser(value_parser!(PathBuf))
        .help("Export the session's artifacts into this directory");

    Command::new("flash-ui")
        .version(flash_core::VERSION)
        .about("Generate several UI component directions from one prompt")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML configuration file"),
        )
        .arg(
            Arg::new("model")
                .long("model")
                .global(true)
                .help("Model identifier for every call"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Debug logging"),
        )
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Log one JSON object per line"),
        )
        .subcommand(
            Command::new("generate")
                .about("Stream one artifact per slot for a prompt")
                .arg(prompt.clone())
                .arg(out.clone()),
        )
        .subcommand(
            Command::new("explore")
                .about("Generate, then explore variations of one slot")
                .arg(prompt)
                .arg(
                    Arg::new("slot")
                        .long("slot")
                        .default_value("0")
                        .value_parser(value_parser!(usize))
                        .help("Zero-based slot to explore"),
                )
                .arg(
                    Arg::new("apply")
                        .long("apply")
                        .value_parser(value_parser!(usize))
                        .help("Apply this variation to the slot"),
                )
                .arg(out),
        )
}

fn load_config(args: &ArgMatches) -> Result<FlashConfig> {
    let mut config = match args.get_one::<PathBuf>("config") {
        Some(path) => FlashConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => FlashConfig::new(),
    };
    if let Some(model) = args.get_one::<String>("model") {
        config = config.with_model(model.clone());
    }
    Ok(config)
}

fn orchestrator(config: FlashConfig) -> Result<Orchestrator> {
    let gemini = GeminiConfig::from_env().with_model(config.model.clone());
    let provider = GeminiProvider::new(gemini).context("building Gemini client")?;
    Ok(Orchestrator::new(config, Arc::new(provider))?)
}

fn print_report(orch: &Orchestrator, report: &SubmitReport) {
    println!("Session {} (#{})", report.session, report.index + 1);
    if report.labels_fell_back {
        println!("  (style names unavailable, using fallbacks)");
    }
    let Some(session) = orch.store().session(report.session) else {
        return;
    };
    for (task, artifact) in report.tasks.iter().zip(session.artifacts()) {
        let outcome = match &task.outcome {
            TaskOutcome::Complete => "complete".to_string(),
            TaskOutcome::Empty => "empty".to_string(),
            TaskOutcome::Failed(reason) => format!("failed: {reason}"),
            TaskOutcome::Superseded => "superseded".to_string(),
        };
        println!(
            "  [{}] {:<24} {:>8} bytes  {}",
            task.artifact.slot,
            artifact.style_name(),
            artifact.html().len(),
            outcome
        );
    }
}

async fn export(orch: &Orchestrator, args: &ArgMatches) -> Result<()> {
    if let Some(dir) = args.get_one::<PathBuf>("out") {
        let bundle = orch
            .export_current(dir)
            .await
            .with_context(|| format!("exporting into {}", dir.display()))?;
        println!("Exported to {}", bundle.display());
    }
    Ok(())
}

async fn generate(args: &ArgMatches) -> Result<()> {
    let orch = orchestrator(load_config(args)?)?;
    let prompt = args
        .get_one::<String>("prompt")
        .context("prompt is required")?;

    let report = orch.submit(prompt).await?;
    print_report(&orch, &report);
    export(&orch, args).await
}

async fn explore(args: &ArgMatches) -> Result<()> {
    let orch = orchestrator(load_config(args)?)?;
    let prompt = args
        .get_one::<String>("prompt")
        .context("prompt is required")?;
    let slot = args.get_one::<usize>("slot").copied().unwrap_or_default();

    let report = orch.submit(prompt).await?;
    print_report(&orch, &report);

    orch.focus(slot)?;
    let Some(exploration) = orch.explore_variations().await? else {
        bail!("slot {slot} could not be explored");
    };
    info!(
        received = exploration.received,
        dropped = exploration.dropped,
        "exploration finished"
    );
    if let Some(error) = &exploration.error {
        println!("Exploration ended early: {error}");
    }
    for (index, variation) in orch.variations().iter().enumerate() {
        println!(
            "  <{index}> {:<24} {:>8} bytes",
            variation.name,
            variation.html.len()
        );
    }

    if let Some(index) = args.get_one::<usize>("apply") {
        let target = orch.apply_variation(*index)?;
        println!("Applied variation {index} to slot {}", target.slot);
    }
    export(&orch, args).await
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli().get_matches();

    let format = if matches.get_flag("log-json") {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };
    init_tracing(format, matches.get_flag("verbose"))
        .map_err(|e| anyhow::anyhow!("installing log subscriber: {e}"))?;

    match matches.subcommand() {
        Some(("generate", args)) => generate(args).await,
        Some(("explore", args)) => explore(args).await,
        _ => Ok(()),
    }
}
