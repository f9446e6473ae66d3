//! Catalog queries over a registry: module summaries, search and release
//! lookup by full name.

use forge_core::error::{ForgeError, ForgeResult};
use forge_core::{latest_release, Module, ModuleName, Release, Version};

use crate::api::{ModuleSummary, ReleaseSummary};
use crate::Registry;

/// Summarize a module with its latest version and release list
pub fn module_summary<R: Registry + ?Sized>(
    registry: &R,
    module: &Module,
) -> ForgeResult<ModuleSummary> {
    let releases = registry.list_releases(module)?;
    Ok(summarize(module, &releases))
}

fn summarize(module: &Module, releases: &[Release]) -> ModuleSummary {
    let latest = latest_release(releases);

    let mut versions: Vec<&Version> = releases.iter().map(|r| &r.version).collect();
    versions.sort_by(|a, b| b.cmp(a));

    ModuleSummary {
        name: module.name.clone(),
        author: module.author.clone(),
        version: latest.map(|r| r.version.to_string()).unwrap_or_default(),
        full_name: module.legacy_name(),
        desc: module.desc.clone(),
        project_url: latest
            .map(|r| r.metadata.project_page.clone())
            .unwrap_or_default(),
        releases: versions
            .into_iter()
            .map(|v| ReleaseSummary {
                version: v.to_string(),
            })
            .collect(),
        tag_list: module.tag_list().into_iter().map(str::to_string).collect(),
    }
}

/// Search modules.
///
/// A query that parses as a full module name selects that module only.
/// Any other query matches case-insensitively against name, author,
/// release versions, tags and description. An empty query lists every
/// module. Results are ordered by author.
pub fn search<R: Registry + ?Sized>(registry: &R, query: &str) -> ForgeResult<Vec<ModuleSummary>> {
    let query = query.trim();

    if let Some(id) = ModuleName::parse(query) {
        return match registry.find_module_by_legacy_name(&id.legacy_name()) {
            Ok(module) => Ok(vec![module_summary(registry, &module)?]),
            Err(ForgeError::ModuleNotFound { .. }) => Ok(Vec::new()),
            Err(e) => Err(e),
        };
    }

    let needle = query.to_lowercase();
    let mut results = Vec::new();
    for module in registry.list_modules()? {
        let releases = registry.list_releases(&module)?;
        if needle.is_empty() || module_matches(&module, &releases, &needle) {
            results.push(summarize(&module, &releases));
        }
    }
    Ok(results)
}

fn module_matches(module: &Module, releases: &[Release], needle: &str) -> bool {
    let contains = |field: &str| field.to_lowercase().contains(needle);

    contains(&module.name)
        || contains(&module.author)
        || contains(&module.tags)
        || contains(&module.desc)
        || releases.iter().any(|r| contains(&r.version.to_string()))
}

/// Find the release a releases query refers to.
///
/// Without an explicit version the module's latest release is used.
pub fn release_for<R: Registry + ?Sized>(
    registry: &R,
    full_name: &str,
    version: Option<&str>,
) -> ForgeResult<Release> {
    let id = ModuleName::parse(full_name.trim()).ok_or_else(|| ForgeError::InvalidModuleName {
        name: full_name.to_string(),
    })?;
    let module = registry.find_module_by_legacy_name(&id.legacy_name())?;
    let releases = registry.list_releases(&module)?;

    match version {
        Some(requested) => {
            let not_found = || ForgeError::ReleaseNotFound {
                module: module.legacy_name(),
                version: requested.to_string(),
            };
            let wanted = Version::parse(requested).map_err(|_| not_found())?;
            releases
                .into_iter()
                .find(|r| r.version == wanted)
                .ok_or_else(not_found)
        },
        None => latest_release(&releases)
            .cloned()
            .ok_or_else(|| ForgeError::NoReleases {
                module: module.legacy_name(),
            }),
    }
}
