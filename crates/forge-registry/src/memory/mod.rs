//! In-memory registry backed by a concurrent map

use dashmap::DashMap;
use forge_core::error::ForgeError;
use forge_core::{normalize_legacy_name, Module, Release};

use crate::{Registry, RegistryResult};

/// A module together with its releases
#[derive(Debug, Clone)]
struct ModuleEntry {
    module: Module,
    releases: Vec<Release>,
}

/// Registry held entirely in memory, keyed by legacy module name.
///
/// Each lookup holds the shard lock only while the entry is cloned, so
/// readers always see a consistent set of releases even while another
/// thread publishes.
#[derive(Debug, Default)]
pub struct MemoryRegistry {
    modules: DashMap<String, ModuleEntry>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self {
            modules: DashMap::new(),
        }
    }

    /// Register a module. Re-registering replaces its description and tags
    /// and keeps its releases.
    pub fn insert_module(&self, module: Module) {
        let key = module.legacy_name();
        self.modules
            .entry(key)
            .and_modify(|entry| entry.module = module.clone())
            .or_insert_with(|| ModuleEntry {
                module,
                releases: Vec::new(),
            });
    }

    /// Publish a release of an already registered module
    pub fn add_release(&self, release: Release) -> RegistryResult<()> {
        let key = release.module.legacy_name();
        let mut entry = self
            .modules
            .get_mut(&key)
            .ok_or_else(|| ForgeError::ModuleNotFound { name: key.clone() })?;

        if entry.releases.iter().any(|r| r.version == release.version) {
            return Err(ForgeError::DuplicateRelease {
                module: key,
                version: release.version.to_string(),
            });
        }

        entry.releases.push(release);
        Ok(())
    }

    pub fn module_count(&self) -> usize {
        self.modules.len()
    }

    pub fn release_count(&self) -> usize {
        self.modules.iter().map(|entry| entry.releases.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl Registry for MemoryRegistry {
    fn find_module_by_legacy_name(&self, name: &str) -> RegistryResult<Module> {
        let key = normalize_legacy_name(name);
        self.modules
            .get(&key)
            .map(|entry| entry.module.clone())
            .ok_or_else(|| ForgeError::ModuleNotFound {
                name: name.to_string(),
            })
    }

    fn list_releases(&self, module: &Module) -> RegistryResult<Vec<Release>> {
        let key = module.legacy_name();
        self.modules
            .get(&key)
            .map(|entry| entry.releases.clone())
            .ok_or(ForgeError::ModuleNotFound { name: key })
    }

    fn list_modules(&self) -> RegistryResult<Vec<Module>> {
        let mut modules: Vec<Module> = self
            .modules
            .iter()
            .map(|entry| entry.module.clone())
            .collect();
        modules.sort_by(|a, b| a.author.cmp(&b.author).then_with(|| a.name.cmp(&b.name)));
        Ok(modules)
    }
}
