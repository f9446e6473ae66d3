//! # forge-cli
//!
//! Command-line interface for the Forge module mirror.
//!
//! Loads `forge.toml`, sets up logging, and dispatches to the command
//! handlers. Errors are rendered with suggestions before exiting non-zero.

use clap::{Parser, Subcommand};
use forge_core::error::ForgeError;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::CommandContext;
use output::errors::ErrorFormatter;

/// Module mirror and dependency resolver
#[derive(Parser)]
#[command(name = "forge", version, about = "Module mirror and dependency resolver")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Registry snapshot to load instead of the configured one
    #[arg(long, global = true, value_name = "FILE")]
    pub snapshot: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve every release a module release transitively requires
    Resolve {
        /// Module name, `author/module` or `author-module`
        module: String,
        /// Release version; defaults to the latest release
        #[arg(long)]
        version: Option<String>,
        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },
    /// Show the latest release of a module
    Latest { module: String },
    /// Show a module summary
    Module { module: String },
    /// Search modules by name, author, version, tag or description
    Search { query: Option<String> },
    /// Test versions against a requirement
    Match {
        requirement: String,
        #[arg(required = true)]
        versions: Vec<String>,
    },
    /// Check configuration and the registry snapshot
    Check,
    /// Show version information
    Version,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_panic_handler();

    match run_cli(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let formatter = ErrorFormatter::new();
            match err.downcast_ref::<ForgeError>() {
                Some(forge_err) => eprintln!("{}", formatter.format_error(forge_err)),
                None => eprintln!("{}", formatter.format_simple(&format!("{:#}", err))),
            }
            ExitCode::FAILURE
        },
    }
}

fn run_cli(cli: Cli) -> anyhow::Result<()> {
    let ctx = CommandContext::new(cli.snapshot)?;
    setup_logging(cli.verbose, &ctx.config.config.log.level);

    info!("Starting Forge CLI v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Some(command) => commands::dispatch_command(command, &ctx),
        None => commands::show_help(&ctx),
    }
}

fn setup_logging(verbose: bool, configured_level: &str) {
    let level = if verbose { "debug" } else { configured_level };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("forge={}", level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn setup_panic_handler() {
    std::panic::set_hook(Box::new(|panic_info| {
        error!("Forge encountered an unexpected error: {}", panic_info);
        eprintln!("Forge crashed! This is a bug.");
        eprintln!("Error: {}", panic_info);
    }));
}
