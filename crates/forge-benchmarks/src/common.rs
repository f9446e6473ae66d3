//! Common utilities for benchmarks

use criterion::Criterion;
use forge_core::{DeclaredDependency, ForgeResult, Module, ModuleName, Release, ReleaseMetadata, Version};
use forge_registry::{MemoryRegistry, ModuleRecord, ReleaseRecord, SnapshotFile};
use pprof::criterion::{Output, PProfProfiler};

/// Author of every synthetic module
pub const BENCH_AUTHOR: &str = "bench";

/// Releases URL used for synthetic tarball locators
pub const RELEASES_URL: &str = "/system/releases/";

/// Requirement shapes cycled through by synthetic releases, one per grammar
/// production
pub const REQUIREMENTS: [&str; 6] = [
    ">= 1.0.0",
    "1.x",
    ">=1.1.0, <2.0.0",
    "*",
    ">= 1.0.0 <3.0.0",
    "1.2.x",
];

/// Configure criterion with flamegraph profiling support
pub fn criterion_config() -> Criterion {
    Criterion::default()
        .warm_up_time(std::time::Duration::from_secs(3))
        .measurement_time(std::time::Duration::from_secs(10))
        .sample_size(100)
        .with_profiler(PProfProfiler::new(100, Output::Flamegraph(None)))
}

/// Shape of a synthetic registry
#[derive(Debug, Clone, Copy)]
pub struct GraphShape {
    pub modules: usize,
    pub releases_per_module: usize,
    /// Dependencies each release declares on later modules
    pub fanout: usize,
}

impl GraphShape {
    pub fn new(modules: usize, releases_per_module: usize, fanout: usize) -> Self {
        Self {
            modules,
            releases_per_module,
            fanout,
        }
    }
}

fn module_name(index: usize) -> String {
    format!("m{index}")
}

/// Version of the `n`th release of a synthetic module: 1.0.0, 1.1.0, ...
/// with every fourth release on the next major
fn release_version(n: usize) -> Version {
    let major = 1 + (n / 4) as u64;
    Version::new(major, (n % 4) as u64, 0)
}

fn declared_dependencies(shape: &GraphShape, module: usize, release: usize) -> Vec<DeclaredDependency> {
    (module + 1..shape.modules)
        .take(shape.fanout)
        .enumerate()
        .map(|(k, target)| {
            let requirement = REQUIREMENTS[(module + release + k) % REQUIREMENTS.len()];
            DeclaredDependency::new(format!("{BENCH_AUTHOR}/{}", module_name(target)), Some(requirement))
        })
        .collect()
}

/// Build a layered, acyclic registry: module `i` depends only on modules
/// with a higher index, so `m0` reaches the whole graph.
pub fn synthetic_registry(shape: GraphShape) -> ForgeResult<MemoryRegistry> {
    let registry = MemoryRegistry::new();

    for module in 0..shape.modules {
        let name = module_name(module);
        registry.insert_module(Module::new(BENCH_AUTHOR, name.clone()));

        for release in 0..shape.releases_per_module {
            let version = release_version(release);
            let metadata = ReleaseMetadata {
                dependencies: declared_dependencies(&shape, module, release),
                ..ReleaseMetadata::default()
            };
            let tarball = format!("{RELEASES_URL}b/{BENCH_AUTHOR}/{BENCH_AUTHOR}-{name}-{version}.tar.gz");
            registry.add_release(Release::new(
                ModuleName::new(BENCH_AUTHOR, name.clone()),
                version,
                tarball,
                metadata,
            ))?;
        }
    }

    Ok(registry)
}

/// The same registry as [`synthetic_registry`] in snapshot JSON form
pub fn synthetic_snapshot_json(shape: GraphShape) -> serde_json::Result<String> {
    let modules = (0..shape.modules)
        .map(|module| ModuleRecord {
            author: BENCH_AUTHOR.to_string(),
            name: module_name(module),
            desc: format!("Synthetic module {module}"),
            tags: "bench synthetic".to_string(),
            releases: (0..shape.releases_per_module)
                .map(|release| ReleaseRecord {
                    version: release_version(release).to_string(),
                    file: String::new(),
                    archive: None,
                    file_size: 0,
                    file_hash: String::new(),
                    metadata: ReleaseMetadata {
                        dependencies: declared_dependencies(&shape, module, release),
                        ..ReleaseMetadata::default()
                    },
                })
                .collect(),
        })
        .collect();

    serde_json::to_string(&SnapshotFile { modules })
}

/// Version strings with a mix of prereleases and build metadata
pub fn version_strings(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| match i % 4 {
            0 => format!("{}.{}.{}", i % 10, i % 7, i % 13),
            1 => format!("{}.{}.{}-rc.{}", i % 10, i % 7, i % 13, i % 3),
            2 => format!("{}.{}.{}+build.{}", i % 10, i % 7, i % 13, i),
            _ => format!("{}.{}.{}-alpha", i % 10, i % 7, i % 13),
        })
        .collect()
}
