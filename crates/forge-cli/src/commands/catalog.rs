//! `forge module`, `forge latest` and `forge search` command implementations.

use forge_core::{ForgeError, ModuleName, Release};
use forge_registry::{module_summary, release_for, search, ModuleSummary, Registry};

use super::CommandContext;

/// Summary of one module
pub fn run_module(module: &str, ctx: &CommandContext) -> anyhow::Result<ModuleSummary> {
    let registry = ctx.registry()?;
    let id = ModuleName::parse(module).ok_or_else(|| ForgeError::InvalidModuleName {
        name: module.to_string(),
    })?;
    let module = registry.find_module_by_legacy_name(&id.legacy_name())?;
    Ok(module_summary(&registry, &module)?)
}

/// Latest release of one module
pub fn run_latest(module: &str, ctx: &CommandContext) -> anyhow::Result<Release> {
    let registry = ctx.registry()?;
    Ok(release_for(&registry, module, None)?)
}

/// Modules matching `query`
pub fn run_search(query: &str, ctx: &CommandContext) -> anyhow::Result<Vec<ModuleSummary>> {
    let registry = ctx.registry()?;
    Ok(search(&registry, query)?)
}

/// Execute the `forge module` command
pub fn execute_module(module: &str, ctx: &CommandContext) -> anyhow::Result<()> {
    let summary = run_module(module, ctx)?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

/// Execute the `forge latest` command
pub fn execute_latest(module: &str, ctx: &CommandContext) -> anyhow::Result<()> {
    let release = run_latest(module, ctx)?;
    println!("{}", release.version);
    ctx.output.status(&release.tarball);
    Ok(())
}

/// Execute the `forge search` command
pub fn execute_search(query: &str, ctx: &CommandContext) -> anyhow::Result<()> {
    let results = run_search(query, ctx)?;
    if results.is_empty() {
        ctx.output.warn(&format!("No modules match '{}'", query));
        return Ok(());
    }

    for summary in &results {
        let version = if summary.version.is_empty() {
            "-"
        } else {
            summary.version.as_str()
        };
        println!("{:<40} {:<12} {}", summary.full_name, version, summary.desc);
    }
    ctx.output.status(&format!("{} modules", results.len()));
    Ok(())
}
