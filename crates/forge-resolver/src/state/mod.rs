//! Per-call resolution state.
//!
//! Everything a resolution run mutates lives here and is owned by that run;
//! nothing is shared between calls.

use forge_core::{Module, Release, ReleaseId, VersionSpec};
use indexmap::{IndexMap, IndexSet};
use std::collections::{BTreeMap, HashMap};

/// Chooses which pending release is processed next.
///
/// The resolver's output does not depend on the choice; this seam exists so
/// different orders can be exercised.
pub trait QueueOrder {
    /// Index into the pending queue, which holds `pending > 0` releases in
    /// insertion order
    fn next_index(&mut self, pending: usize) -> usize;
}

/// Process releases in the order they were discovered
#[derive(Debug, Clone, Copy, Default)]
pub struct Fifo;

/// Process the most recently discovered release first
#[derive(Debug, Clone, Copy, Default)]
pub struct Lifo;

impl QueueOrder for Fifo {
    fn next_index(&mut self, _pending: usize) -> usize {
        0
    }
}

impl QueueOrder for Lifo {
    fn next_index(&mut self, pending: usize) -> usize {
        pending.saturating_sub(1)
    }
}

/// Mutable state of one resolution run
#[derive(Debug)]
pub struct ResolutionState {
    root: ReleaseId,
    /// Specs each module must satisfy, keyed by legacy name; only grows
    required_specs: BTreeMap<String, IndexSet<VersionSpec>>,
    /// Declared `(name, requirement)` pairs of processed releases
    decl_cache: HashMap<ReleaseId, Vec<(String, String)>>,
    /// Modules looked up so far
    modules: HashMap<String, Module>,
    queue: IndexMap<ReleaseId, Release>,
    root_referenced: bool,
}

impl ResolutionState {
    /// Seed the state with `root`: its module is pinned to its version and
    /// it is the only pending release
    pub fn seed(root: &Release) -> Self {
        let root_id = root.id();
        let mut state = Self {
            root: root_id.clone(),
            required_specs: BTreeMap::new(),
            decl_cache: HashMap::new(),
            modules: HashMap::new(),
            queue: IndexMap::new(),
            root_referenced: false,
        };
        state
            .required_specs
            .entry(root_id.module.clone())
            .or_default()
            .insert(VersionSpec::exact(&root.version));
        state.queue.insert(root_id, root.clone());
        state
    }

    pub fn root(&self) -> &ReleaseId {
        &self.root
    }

    /// Take the next pending release chosen by `order`
    pub fn pop<Q: QueueOrder + ?Sized>(&mut self, order: &mut Q) -> Option<Release> {
        if self.queue.is_empty() {
            return None;
        }
        let index = order.next_index(self.queue.len()).min(self.queue.len() - 1);
        self.queue.shift_remove_index(index).map(|(_, release)| release)
    }

    /// Queue a release unless it is already pending or processed
    pub fn enqueue(&mut self, release: Release) -> bool {
        let id = release.id();
        if self.decl_cache.contains_key(&id) || self.queue.contains_key(&id) {
            return false;
        }
        self.queue.insert(id, release);
        true
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn is_processed(&self, id: &ReleaseId) -> bool {
        self.decl_cache.contains_key(id)
    }

    /// Declarations of `release`, computed once per release
    pub fn declarations(&mut self, release: &Release, default_requirement: &str) -> &[(String, String)] {
        self.decl_cache
            .entry(release.id())
            .or_insert_with(|| release.declared_dependencies(default_requirement))
    }

    /// Declarations of an already processed release
    pub fn cached_declarations(&self, id: &ReleaseId) -> Option<&[(String, String)]> {
        self.decl_cache.get(id).map(Vec::as_slice)
    }

    pub fn is_recorded(&self, module: &str, spec: &VersionSpec) -> bool {
        self.required_specs
            .get(module)
            .map_or(false, |specs| specs.contains(spec))
    }

    /// Record a spec for a module; returns whether it was new
    pub fn record(&mut self, module: &str, spec: VersionSpec) -> bool {
        self.required_specs
            .entry(module.to_string())
            .or_default()
            .insert(spec)
    }

    /// Note that some release declared a dependency on the root's module
    pub fn mark_root_referenced(&mut self) {
        self.root_referenced = true;
    }

    /// Modules whose candidates belong in the output. The root's module is
    /// included only when some release depends on it.
    pub fn output_modules(&self) -> impl Iterator<Item = (&String, &IndexSet<VersionSpec>)> {
        let root = self.root.module.as_str();
        let root_referenced = self.root_referenced;
        self.required_specs
            .iter()
            .filter(move |(name, _)| root_referenced || name.as_str() != root)
    }

    pub fn specs_for(&self, module: &str) -> Option<&IndexSet<VersionSpec>> {
        self.required_specs.get(module)
    }

    pub fn remember_module(&mut self, name: &str, module: Module) {
        self.modules.insert(name.to_string(), module);
    }

    pub fn module(&self, name: &str) -> Option<&Module> {
        self.modules.get(name)
    }

    pub fn processed_count(&self) -> usize {
        self.decl_cache.len()
    }

    /// Recorded specs as sorted display strings, keyed by module
    pub fn required_specs(&self) -> BTreeMap<String, Vec<String>> {
        self.required_specs
            .iter()
            .map(|(name, specs)| {
                let mut rendered: Vec<String> = specs.iter().map(ToString::to_string).collect();
                rendered.sort();
                (name.clone(), rendered)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forge_core::{ModuleName, ReleaseMetadata, Version};

    fn release(name: &str, version: &str) -> Release {
        let id = ModuleName::parse(name).unwrap();
        Release::new(id, Version::parse(version).unwrap(), "", ReleaseMetadata::default())
    }

    #[test]
    fn test_seed_pins_root() {
        let root = release("acme/web", "1.2.0");
        let state = ResolutionState::seed(&root);

        let specs = state.specs_for("acme/web").unwrap();
        assert_eq!(specs.len(), 1);
        assert!(specs.iter().all(|s| s.matches(&root.version)));
        assert_eq!(state.pending(), 1);
        // Root pin alone does not make the root an output module
        assert_eq!(state.output_modules().count(), 0);
    }

    #[test]
    fn test_record_is_idempotent() {
        let mut state = ResolutionState::seed(&release("acme/web", "1.0.0"));
        let spec = VersionSpec::parse(">= 1.0.0").unwrap();

        assert!(state.record("acme/db", spec.clone()));
        assert!(!state.record("acme/db", spec.clone()));
        assert!(state.is_recorded("acme/db", &spec));
        assert_eq!(state.specs_for("acme/db").unwrap().len(), 1);
    }

    #[test]
    fn test_processed_releases_are_not_requeued() {
        let root = release("acme/web", "1.0.0");
        let mut state = ResolutionState::seed(&root);

        let popped = state.pop(&mut Fifo).unwrap();
        state.declarations(&popped, ">= 0.0.0");
        assert!(state.is_processed(&root.id()));
        assert!(!state.enqueue(root.clone()));
        assert!(state.pop(&mut Fifo).is_none());
    }

    #[test]
    fn test_pending_releases_are_not_duplicated() {
        let mut state = ResolutionState::seed(&release("acme/web", "1.0.0"));
        assert!(state.enqueue(release("acme/db", "1.0.0")));
        assert!(!state.enqueue(release("acme/db", "1.0.0")));
        assert_eq!(state.pending(), 2);
    }

    #[test]
    fn test_queue_orders() {
        let mut state = ResolutionState::seed(&release("acme/a", "1.0.0"));
        state.enqueue(release("acme/b", "1.0.0"));
        state.enqueue(release("acme/c", "1.0.0"));

        assert_eq!(state.pop(&mut Lifo).unwrap().module.name, "c");
        assert_eq!(state.pop(&mut Fifo).unwrap().module.name, "a");
        assert_eq!(state.pop(&mut Lifo).unwrap().module.name, "b");
        assert!(state.pop(&mut Fifo).is_none());
    }

    #[test]
    fn test_out_of_range_index_is_clamped() {
        struct Wild;
        impl QueueOrder for Wild {
            fn next_index(&mut self, _pending: usize) -> usize {
                usize::MAX
            }
        }

        let mut state = ResolutionState::seed(&release("acme/a", "1.0.0"));
        state.enqueue(release("acme/b", "1.0.0"));
        assert_eq!(state.pop(&mut Wild).unwrap().module.name, "b");
    }

    #[test]
    fn test_root_included_once_referenced() {
        let mut state = ResolutionState::seed(&release("acme/web", "1.0.0"));
        state.mark_root_referenced();
        let modules: Vec<&String> = state.output_modules().map(|(name, _)| name).collect();
        assert_eq!(modules, vec!["acme/web"]);
    }
}
