//! Loading a [`MemoryRegistry`] from a JSON snapshot file.
//!
//! Module records whose author or name is malformed are skipped with a
//! warning. Invalid versions and duplicate `(module, version)` pairs fail the
//! whole load.

use forge_core::error::{ForgeError, ForgeResult};
use forge_core::utils::tarball_locator;
use forge_core::{Module, ModuleName, Release, Version};
use std::path::Path;
use tracing::{debug, info, warn};

use crate::api::{ModuleRecord, ReleaseRecord, SnapshotFile};
use crate::memory::MemoryRegistry;

/// Read and parse a snapshot file.
///
/// Relative archive paths in the snapshot are resolved against the
/// directory containing it.
pub fn load_snapshot(path: &Path, releases_url: &str) -> ForgeResult<MemoryRegistry> {
    let json = std::fs::read_to_string(path).map_err(|e| {
        ForgeError::io(format!("Failed to read snapshot {}", path.display()), e)
    })?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    parse_snapshot(&json, base_dir, releases_url)
}

/// Parse snapshot JSON into a registry
pub fn parse_snapshot(
    json: &str,
    base_dir: &Path,
    releases_url: &str,
) -> ForgeResult<MemoryRegistry> {
    let snapshot: SnapshotFile = serde_json::from_str(json).map_err(ForgeError::snapshot)?;
    let registry = MemoryRegistry::new();
    let mut skipped = 0usize;

    for record in &snapshot.modules {
        let Some(id) = ModuleName::parse(&format!("{}/{}", record.author, record.name)) else {
            warn!(
                "Skipping module with invalid name '{}/{}'",
                record.author, record.name
            );
            skipped += 1;
            continue;
        };

        registry.insert_module(module_from_record(record));
        for release in &record.releases {
            let release = release_from_record(&id, release, base_dir, releases_url)?;
            debug!("Loaded {}", release.id());
            registry.add_release(release)?;
        }
    }

    info!(
        "Loaded registry snapshot: {} modules, {} releases ({} skipped)",
        registry.module_count(),
        registry.release_count(),
        skipped
    );
    Ok(registry)
}

fn module_from_record(record: &ModuleRecord) -> Module {
    Module {
        author: record.author.clone(),
        name: record.name.clone(),
        desc: record.desc.clone(),
        tags: record.tags.clone(),
    }
}

fn release_from_record(
    module: &ModuleName,
    record: &ReleaseRecord,
    base_dir: &Path,
    releases_url: &str,
) -> ForgeResult<Release> {
    let version = Version::parse(&record.version)?;

    if let Some(archive) = &record.archive {
        let path = base_dir.join(archive);
        let bytes = std::fs::read(&path).map_err(|e| {
            ForgeError::io(format!("Failed to read archive {}", path.display()), e)
        })?;
        let filename = if record.file.is_empty() {
            archive
                .file_name()
                .and_then(|name| name.to_str())
                .unwrap_or_default()
                .to_string()
        } else {
            record.file.clone()
        };
        return Release::from_archive_bytes(
            module.clone(),
            version,
            releases_url,
            &filename,
            &bytes,
            record.metadata.clone(),
        );
    }

    let filename = if record.file.is_empty() {
        format!("{}-{}.tar.gz", module.canonical_name(), version)
    } else {
        record.file.clone()
    };
    let mut release = Release::new(
        module.clone(),
        version,
        tarball_locator(releases_url, &module.author, &filename)?,
        record.metadata.clone(),
    );
    release.file_size = record.file_size;
    release.file_hash = record.file_hash.clone();
    Ok(release)
}
