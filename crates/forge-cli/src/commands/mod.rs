//! Command implementations and dispatch logic.
//!
//! Each command has a `run` function that computes its result from a
//! [`CommandContext`] and an `execute` function that prints it.

use anyhow::Context;
use camino::Utf8PathBuf;
use forge_config::{ConfigLoader, LoadedConfig};
use forge_core::error::ForgeError;
use forge_registry::{load_snapshot, MemoryRegistry};
use std::path::PathBuf;
use tracing::info;

pub mod catalog;
pub mod matching;
pub mod resolve;


use crate::{output::OutputHandler, Commands};

/// Shared context for all commands
pub struct CommandContext {
    pub config: LoadedConfig,
    pub output: OutputHandler,
}

impl CommandContext {
    /// Load configuration for the current directory. `snapshot` overrides
    /// the configured registry snapshot.
    pub fn new(snapshot: Option<PathBuf>) -> anyhow::Result<Self> {
        let cwd = std::env::current_dir().map_err(|e| ForgeError::Io {
            message: "Failed to get current directory".to_string(),
            source: e,
        })?;
        let cwd = Utf8PathBuf::from_path_buf(cwd)
            .map_err(|path| anyhow::anyhow!("Current directory is not UTF-8: {}", path.display()))?;

        let mut config = ConfigLoader::new(cwd.clone()).load()?;
        if let Some(snapshot) = snapshot {
            let snapshot = Utf8PathBuf::from_path_buf(snapshot)
                .map_err(|path| anyhow::anyhow!("Snapshot path is not UTF-8: {}", path.display()))?;
            config.config.registry.snapshot = Some(cwd.join(snapshot));
        }

        Ok(Self {
            config,
            output: OutputHandler::new(),
        })
    }

    /// Load the configured registry snapshot
    pub fn registry(&self) -> anyhow::Result<MemoryRegistry> {
        let path = self.config.snapshot_path().ok_or_else(|| ForgeError::ConfigValidation {
            field: "registry.snapshot".to_string(),
            reason: "no registry snapshot configured".to_string(),
        })?;

        let registry = load_snapshot(path.as_std_path(), &self.config.config.registry.releases_url)
            .with_context(|| format!("while loading {}", path))?;
        Ok(registry)
    }

    pub fn default_requirement(&self) -> &str {
        &self.config.config.resolver.default_requirement
    }
}

/// Dispatch a command to its handler
pub fn dispatch_command(command: Commands, ctx: &CommandContext) -> anyhow::Result<()> {
    match command {
        Commands::Resolve {
            module,
            version,
            pretty,
        } => {
            info!("Resolving {} ({:?})", module, version);
            resolve::execute(&module, version.as_deref(), pretty, ctx)
        },
        Commands::Latest { module } => catalog::execute_latest(&module, ctx),
        Commands::Module { module } => catalog::execute_module(&module, ctx),
        Commands::Search { query } => catalog::execute_search(query.as_deref().unwrap_or(""), ctx),
        Commands::Match {
            requirement,
            versions,
        } => matching::execute(&requirement, &versions, ctx),
        Commands::Check => check_config(ctx),
        Commands::Version => show_version(ctx),
    }
}

/// Show help information
pub fn show_help(ctx: &CommandContext) -> anyhow::Result<()> {
    ctx.output.info("Forge - module mirror and dependency resolver");
    ctx.output.info("");
    ctx.output.info("Usage: forge [COMMAND] [OPTIONS]");
    ctx.output.info("");
    ctx.output.info("Registry:");
    ctx.output.info("  module <name>      Show a module summary");
    ctx.output.info("  latest <name>      Show the latest release of a module");
    ctx.output.info("  search [query]     Search modules");
    ctx.output.info("");
    ctx.output.info("Resolution:");
    ctx.output.info("  resolve <name>     Resolve a release's dependencies");
    ctx.output.info("  match <req> <v>..  Test versions against a requirement");
    ctx.output.info("");
    ctx.output.info("Meta:");
    ctx.output.info("  check              Check configuration and snapshot");
    ctx.output.info("  version            Show version information");
    ctx.output.info("");
    ctx.output.info("Run 'forge <command> --help' for more information on a command.");
    Ok(())
}

/// Summary of what `check` found
#[derive(Debug)]
pub struct CheckReport {
    pub modules: usize,
    pub releases: usize,
}

/// Validate configuration and load the snapshot
pub fn run_check(ctx: &CommandContext) -> anyhow::Result<CheckReport> {
    let registry = ctx.registry()?;
    Ok(CheckReport {
        modules: registry.module_count(),
        releases: registry.release_count(),
    })
}

fn check_config(ctx: &CommandContext) -> anyhow::Result<()> {
    ctx.output.info(&format!("Configuration: {:?}", ctx.config.source));
    let report = run_check(ctx)?;
    ctx.output.success(&format!(
        "Snapshot is valid: {} modules, {} releases",
        report.modules, report.releases
    ));
    Ok(())
}

fn show_version(ctx: &CommandContext) -> anyhow::Result<()> {
    let target = format!("{}-{}", std::env::consts::ARCH, std::env::consts::OS);

    ctx.output.info(&format!("Forge v{}", env!("CARGO_PKG_VERSION")));
    ctx.output.info(&format!("Built: {}", env!("BUILD_DATE")));
    ctx.output.info(&format!("Target: {}", target));
    ctx.output.info(&format!("Rust: {}", env!("RUSTC_VERSION")));

    Ok(())
}
