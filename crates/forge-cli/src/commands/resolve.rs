//! `forge resolve` command implementation.
//!
//! Looks up the requested release (the latest one when no version is given)
//! and prints every dependency module's candidate releases as JSON.

use forge_registry::release_for;
use forge_resolver::{Resolution, Resolver};
use std::time::Instant;

use super::CommandContext;

/// Resolve `module` at `version`
pub fn run(module: &str, version: Option<&str>, ctx: &CommandContext) -> anyhow::Result<Resolution> {
    let registry = ctx.registry()?;
    let root = release_for(&registry, module, version)?;

    let resolution = Resolver::new(&registry)
        .with_default_requirement(ctx.default_requirement())
        .resolve(&root)
        .map_err(forge_core::ForgeError::from)?;
    Ok(resolution)
}

/// Execute the `forge resolve` command
pub fn execute(
    module: &str,
    version: Option<&str>,
    pretty: bool,
    ctx: &CommandContext,
) -> anyhow::Result<()> {
    let start_time = Instant::now();
    let resolution = run(module, version, ctx)?;

    let json = if pretty {
        resolution.to_json_pretty()?
    } else {
        resolution.to_json()?
    };
    println!("{}", json);

    ctx.output.status(&format!(
        "Resolved {} in {:.2}ms: {} candidate releases across {} modules",
        resolution.root,
        start_time.elapsed().as_secs_f64() * 1000.0,
        resolution.candidate_count(),
        resolution.releases.len()
    ));
    Ok(())
}
