//! # eg-cli
//!
//! Command-line interface for Equilibrium Guard.
//!
//! Gates agent operations from scripts and hooks:
//! - `eg check <operation> [key=value ...]` — gate one operation
//! - `eg status` — show trust, budget, and drift state
//! - `eg checkpoint` — record a human interaction
//! - `eg mode <mode>` — change the enforcement posture
//! - `eg history` — show recent decisions
//!
//! Session state persists as a JSON snapshot between invocations, so a
//! sequence of `eg check` calls behaves like one supervised session.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use eg_guard::Mode;

/// Equilibrium Guard CLI — gate agent operations against drift.
#[derive(Parser)]
#[command(name = "eg", version, about)]
struct Cli {
    /// Guard configuration file (TOML). Defaults apply if absent.
    #[arg(long, default_value = "guard.toml")]
    config: PathBuf,

    /// Session state snapshot path.
    #[arg(long, default_value = ".eq-guard/state.json")]
    state: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Gate one operation. Exits non-zero when the operation is blocked.
    Check {
        /// Operation identifier (e.g. file_write, web_fetch).
        operation: String,
        /// Context facts as key=value pairs (values parsed as JSON when
        /// possible, otherwise taken as strings).
        #[arg(value_name = "KEY=VALUE")]
        context: Vec<String>,
    },
    /// Show trust, budget, and drift state for the session.
    Status,
    /// Record a human interaction: refill the budget, clear drift flags.
    Checkpoint,
    /// Change the enforcement posture.
    Mode {
        /// One of: disabled, shadow, soft, enforce.
        mode: Mode,
    },
    /// Show recent decisions.
    History {
        /// Number of entries to show.
        #[arg(short, default_value = "10")]
        n: usize,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let session = commands::Session::open(&cli.config, &cli.state)?;

    match &cli.command {
        Commands::Check { operation, context } => {
            commands::check::execute(session, operation, context)
        }
        Commands::Status => commands::status::execute(session),
        Commands::Checkpoint => commands::checkpoint::execute(session),
        Commands::Mode { mode } => commands::mode::execute(session, *mode),
        Commands::History { n } => commands::history::execute(session, *n),
    }
}
