//! Fixed-point dependency resolution
//!
//! Starting from a root release, every processed release contributes its
//! declared requirements to per-module spec sets. A requirement not seen
//! before for a module enqueues all releases of that module it admits. Once
//! nothing is pending, each required module's candidates are the releases
//! satisfying every spec recorded for it.

use forge_core::error::ForgeError;
use forge_core::{
    normalize_legacy_name, Module, Release, ReleaseId, VersionError, VersionSpec,
    DEFAULT_REQUIREMENT,
};
use forge_registry::Registry;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use crate::state::{Fifo, QueueOrder, ResolutionState};

/// Fixed-point resolver over a module registry
#[derive(Debug)]
pub struct Resolver<'r, R: Registry + ?Sized> {
    registry: &'r R,
    default_requirement: String,
}

/// A release admitted for a dependency module
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateRelease {
    pub version: String,
    /// Tarball locator
    pub file: String,
    /// Declared `[name, requirement]` pairs
    pub dependencies: Vec<(String, String)>,
}

/// Outcome of resolving one release
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub root: ReleaseId,
    /// Every spec recorded per module, in sorted display form
    pub required_specs: BTreeMap<String, Vec<String>>,
    /// Candidate releases per dependency module, ascending by version
    pub releases: BTreeMap<String, Vec<CandidateRelease>>,
}

/// Resolution failure; no partial result is produced
#[derive(Debug, thiserror::Error)]
pub enum ResolutionError {
    #[error("Dependency module {name} not found")]
    ModuleNotFound { name: String },

    #[error("{declared_by} declares an unparseable requirement '{requirement}' on {module}")]
    BadRequirement {
        module: String,
        requirement: String,
        declared_by: String,
        #[source]
        source: VersionError,
    },

    #[error(transparent)]
    Registry(#[from] ForgeError),
}

impl From<ResolutionError> for ForgeError {
    fn from(err: ResolutionError) -> Self {
        match err {
            ResolutionError::ModuleNotFound { name } => ForgeError::ModuleNotFound { name },
            ResolutionError::BadRequirement {
                module,
                requirement,
                source,
                ..
            } => ForgeError::BadRequirement {
                module,
                requirement,
                source,
            },
            ResolutionError::Registry(err) => err,
        }
    }
}

impl Resolution {
    /// The `{ "<author/module>": [candidate, ...] }` mapping as JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.releases)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.releases)
    }

    /// Total number of candidate releases across all modules
    pub fn candidate_count(&self) -> usize {
        self.releases.values().map(Vec::len).sum()
    }
}

impl<'r, R: Registry + ?Sized> Resolver<'r, R> {
    pub fn new(registry: &'r R) -> Self {
        Self {
            registry,
            default_requirement: DEFAULT_REQUIREMENT.to_string(),
        }
    }

    /// Requirement assumed for dependencies that declare none
    pub fn with_default_requirement(mut self, requirement: impl Into<String>) -> Self {
        self.default_requirement = requirement.into();
        self
    }

    /// Resolve everything `root` transitively requires
    pub fn resolve(&self, root: &Release) -> Result<Resolution, ResolutionError> {
        self.resolve_with_order(root, &mut Fifo)
    }

    /// Resolve, taking pending releases in the order `order` picks
    pub fn resolve_with_order<Q: QueueOrder + ?Sized>(
        &self,
        root: &Release,
        order: &mut Q,
    ) -> Result<Resolution, ResolutionError> {
        let mut state = ResolutionState::seed(root);
        debug!("Resolving {}", state.root());

        while let Some(release) = state.pop(order) {
            if state.is_processed(&release.id()) {
                continue;
            }
            self.process(&mut state, &release)?;
        }

        let resolution = self.materialize(&state)?;
        info!(
            "Resolved {}: {} releases processed, {} candidates across {} modules",
            resolution.root,
            state.processed_count(),
            resolution.candidate_count(),
            resolution.releases.len()
        );
        Ok(resolution)
    }

    fn process(&self, state: &mut ResolutionState, release: &Release) -> Result<(), ResolutionError> {
        let declared = state
            .declarations(release, &self.default_requirement)
            .to_vec();
        debug!("Processing {} ({} dependencies)", release.id(), declared.len());

        for (dependency, requirement) in declared {
            let spec = VersionSpec::parse(&requirement).map_err(|source| {
                ResolutionError::BadRequirement {
                    module: dependency.clone(),
                    requirement: requirement.clone(),
                    declared_by: release.id().to_string(),
                    source,
                }
            })?;

            let name = normalize_legacy_name(&dependency);
            if name == state.root().module {
                state.mark_root_referenced();
            }
            if state.is_recorded(&name, &spec) {
                continue;
            }

            let module = self.find_module(&name, &dependency)?;
            let releases = self.registry.list_releases(&module)?;
            state.remember_module(&name, module);

            debug!("{} requires {} {}", release.id(), name, spec);
            state.record(&name, spec.clone());

            for candidate in releases {
                if candidate.version.satisfies(&spec) {
                    state.enqueue(candidate);
                }
            }
        }

        Ok(())
    }

    fn find_module(&self, name: &str, declared_as: &str) -> Result<Module, ResolutionError> {
        match self.registry.find_module_by_legacy_name(name) {
            Ok(module) => Ok(module),
            Err(ForgeError::ModuleNotFound { .. }) => Err(ResolutionError::ModuleNotFound {
                name: declared_as.to_string(),
            }),
            Err(err) => Err(err.into()),
        }
    }

    fn materialize(&self, state: &ResolutionState) -> Result<Resolution, ResolutionError> {
        let mut output = BTreeMap::new();

        for (name, specs) in state.output_modules() {
            let module = match state.module(name) {
                Some(module) => module.clone(),
                None => self.find_module(name, name)?,
            };

            let mut admitted: Vec<Release> = self
                .registry
                .list_releases(&module)?
                .into_iter()
                .filter(|release| specs.iter().all(|spec| release.version.satisfies(spec)))
                .collect();
            admitted.sort_by(|a, b| a.version.cmp(&b.version));

            if admitted.is_empty() {
                warn!("No release of {} satisfies every requirement", name);
            }

            let candidates = admitted
                .iter()
                .map(|release| CandidateRelease {
                    version: release.version.to_string(),
                    file: release.tarball.clone(),
                    dependencies: state
                        .cached_declarations(&release.id())
                        .map(<[_]>::to_vec)
                        .unwrap_or_else(|| release.declared_dependencies(&self.default_requirement)),
                })
                .collect();
            output.insert(name.clone(), candidates);
        }

        Ok(Resolution {
            root: state.root().clone(),
            required_specs: state.required_specs(),
            releases: output,
        })
    }
}

#[cfg(test)]
mod tests;
