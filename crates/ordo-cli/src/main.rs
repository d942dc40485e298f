#![forbid(unsafe_code)]

mod cmd;
mod input;
mod output;

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{CommandFactory, Parser, Subcommand};
use ordo_core::ErrorCode;
use ordo_core::config::{self, EngineConfig};
use output::{CliError, OutputMode, render_error};
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "ordo: dependency-aware ordering and selection of actions",
    long_about = None
)]
struct Cli {
    /// Output format.
    #[arg(long, global = true, value_enum, default_value_t = OutputMode::Text)]
    format: OutputMode,

    /// Engine config file (TOML). Defaults are used when omitted.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        about = "Show the canonical sequence and parallel groups",
        after_help = "EXAMPLES:\n    ordo plan plan.toml\n\n    ordo --format json plan plan.json"
    )]
    Plan(cmd::plan::PlanArgs),

    #[command(
        about = "Select actions within an effort budget",
        after_help = "EXAMPLES:\n    ordo select plan.toml --max-actions 5 --max-effort 20\n\n    ordo select plan.toml --require protection --no-category-overflow"
    )]
    Select(cmd::select::SelectArgs),

    #[command(
        about = "Query one action's relationships",
        after_help = "EXAMPLES:\n    ordo query plan.toml ancestors invest\n\n    ordo query plan.toml critical-path invest"
    )]
    Query(cmd::query::QueryArgs),

    #[command(about = "List cheap, lightly-constrained actions")]
    QuickWins(cmd::listing::QuickWinsArgs),

    #[command(about = "List actions with no dependencies")]
    Foundations(cmd::listing::FoundationsArgs),

    #[command(
        about = "Order a subset of actions",
        after_help = "EXAMPLES:\n    ordo order plan.toml invest pay-debt --with-prerequisites"
    )]
    Order(cmd::listing::OrderArgs),

    #[command(
        about = "Generate shell completion scripts",
        after_help = "EXAMPLES:\n    ordo completions bash > ~/.local/share/bash-completion/completions/ordo"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("ORDO_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if env::var("DEBUG").is_ok() {
            "ordo=debug,info"
        } else {
            "ordo=info,warn"
        })
    });

    let format = env::var("ORDO_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn engine_config(cli: &Cli) -> anyhow::Result<EngineConfig> {
    match &cli.config {
        Some(path) => {
            debug!(path = %path.display(), "loading engine config");
            config::load_config(path)
        }
        None => Ok(EngineConfig::default()),
    }
}

fn run(cli: &Cli, config: &EngineConfig) -> anyhow::Result<()> {
    let output = cli.format;

    match &cli.command {
        Commands::Plan(args) => cmd::plan::run_plan(args, output, config),
        Commands::Select(args) => cmd::select::run_select(args, output, config),
        Commands::Query(args) => cmd::query::run_query_cmd(args, output, config),
        Commands::QuickWins(args) => cmd::listing::run_quick_wins(args, output, config),
        Commands::Foundations(args) => cmd::listing::run_foundations(args, output, config),
        Commands::Order(args) => cmd::listing::run_order(args, output, config),
        Commands::Completions(args) => {
            cmd::completions::run_completions(args.shell, &mut Cli::command())
        }
    }
}

fn report(format: OutputMode, err: &anyhow::Error, parse_code: ErrorCode) -> ExitCode {
    if let Err(render_err) = render_error(format, &CliError::from_anyhow(err, parse_code)) {
        eprintln!("error: {err:#} ({render_err})");
    }
    ExitCode::FAILURE
}

fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();
    let config = match engine_config(&cli) {
        Ok(config) => config,
        Err(err) => return report(cli.format, &err, ErrorCode::ConfigParseError),
    };
    match run(&cli, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => report(cli.format, &err, ErrorCode::PlanParseError),
    }
}
