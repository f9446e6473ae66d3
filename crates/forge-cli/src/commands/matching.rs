//! `forge match` command implementation.
//!
//! Parses a requirement and reports which of the given versions satisfy it.

use forge_core::{Version, VersionSpec};

use super::CommandContext;

/// Whether each version satisfies `requirement`, in input order
pub fn run(requirement: &str, versions: &[String]) -> anyhow::Result<(VersionSpec, Vec<(Version, bool)>)> {
    let spec = VersionSpec::parse(requirement).map_err(forge_core::ForgeError::from)?;
    let results = versions
        .iter()
        .map(|text| {
            let version = Version::parse(text).map_err(forge_core::ForgeError::from)?;
            let matched = version.satisfies(&spec);
            Ok((version, matched))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;
    Ok((spec, results))
}

/// Execute the `forge match` command
pub fn execute(requirement: &str, versions: &[String], ctx: &CommandContext) -> anyhow::Result<()> {
    let (spec, results) = run(requirement, versions)?;
    ctx.output.status(&format!("Requirement: {} ({:?})", spec, spec.rule()));

    for (version, matched) in results {
        if matched {
            ctx.output.success(&version.to_string());
        } else {
            ctx.output.failure(&version.to_string());
        }
    }
    Ok(())
}
