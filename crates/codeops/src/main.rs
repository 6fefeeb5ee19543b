//! CodeOps launcher.
//!
//! - `serve`: host the repository fetch and AI action services over HTTP
//! - `run`: clone a GitHub repository and drive it through the pipeline
//! - `chat`: ask the assistant about a repository, optionally applying fixes

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use codeops::config::AppConfig;
use codeops_logging::{init_logging, LogConfig};
use std::path::PathBuf;
use std::process::ExitCode;

mod cli;

#[derive(Parser, Debug)]
#[command(name = "codeops", version, about = "AI-assisted code review and release pipeline")]
struct Cli {
    /// Enable verbose logging (info/debug to stderr)
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    /// Config file (default: $CODEOPS_HOME/config.toml)
    #[arg(long, global = true, env = "CODEOPS_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve POST /fetch-github-repo and POST /analyze-code
    Serve(cli::serve::ServeArgs),

    /// Clone, analyze, fix, test, measure, record and approve a repository
    Run(cli::run::RunArgs),

    /// Ask the AI assistant about a repository
    Chat(cli::chat::ChatArgs),
}

fn run_command(cli: Cli) -> Result<()> {
    let config = AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    match cli.command {
        Commands::Serve(args) => rt.block_on(cli::serve::run(args, config)),
        Commands::Run(args) => rt.block_on(cli::run::run(args, config)),
        Commands::Chat(args) => rt.block_on(cli::chat::run(args, config)),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // run/chat own stdout for the log stream and tables.
    let quiet_console = !matches!(cli.command, Commands::Serve(_));
    if let Err(err) = init_logging(LogConfig {
        app_name: "codeops",
        verbose: cli.verbose,
        quiet_console,
    }) {
        eprintln!("Warning: failed to initialize logging: {:#}", err);
    }

    match run_command(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::from(1)
        }
    }
}
