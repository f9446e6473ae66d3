//! Unit tests for the resolver

use super::*;
use crate::state::Lifo;
use forge_core::{DeclaredDependency, ModuleName, ReleaseMetadata, Version};
use forge_registry::MemoryRegistry;

/// Linear congruential pick, so a seed fixes a whole pop order
struct Seeded(u64);

impl QueueOrder for Seeded {
    fn next_index(&mut self, pending: usize) -> usize {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        ((self.0 >> 33) as usize) % pending
    }
}

fn release(name: &str, version: &str, deps: &[(&str, Option<&str>)]) -> Release {
    let metadata = ReleaseMetadata {
        dependencies: deps
            .iter()
            .map(|(dep, req)| DeclaredDependency::new(*dep, *req))
            .collect(),
        ..ReleaseMetadata::default()
    };
    let id = ModuleName::parse(name).unwrap();
    let file = format!("/system/releases/{}-{}.tar.gz", id.canonical_name(), version);
    Release::new(id, Version::parse(version).unwrap(), file, metadata)
}

fn publish(registry: &MemoryRegistry, release: Release) {
    registry.insert_module(Module::new(
        release.module.author.clone(),
        release.module.name.clone(),
    ));
    registry.add_release(release).unwrap();
}

fn versions(resolution: &Resolution, module: &str) -> Vec<String> {
    resolution.releases[module]
        .iter()
        .map(|candidate| candidate.version.clone())
        .collect()
}

fn chain_registry() -> MemoryRegistry {
    let registry = MemoryRegistry::new();
    publish(&registry, release("acme/a", "1.0.0", &[("acme/b", Some(">= 1.0.0 <2.0.0"))]));
    publish(&registry, release("acme/b", "1.0.0", &[]));
    publish(&registry, release("acme/b", "1.5.0", &[("acme/c", Some("1.x"))]));
    publish(&registry, release("acme/b", "2.0.0", &[("acme/c", Some("2.x"))]));
    publish(&registry, release("acme/c", "1.0.0", &[]));
    publish(&registry, release("acme/c", "1.9.9", &[]));
    publish(&registry, release("acme/c", "2.0.0", &[]));
    registry
}

fn root_of(registry: &MemoryRegistry, name: &str, version: &str) -> Release {
    let module = registry.find_module_by_legacy_name(name).unwrap();
    let wanted = Version::parse(version).unwrap();
    registry
        .list_releases(&module)
        .unwrap()
        .into_iter()
        .find(|r| r.version == wanted)
        .unwrap()
}

#[test]
fn test_resolve_chain() {
    let registry = chain_registry();
    let root = root_of(&registry, "acme/a", "1.0.0");

    let resolution = Resolver::new(&registry).resolve(&root).unwrap();

    assert_eq!(resolution.root.to_string(), "acme/a@1.0.0");
    assert_eq!(versions(&resolution, "acme/b"), vec!["1.0.0", "1.5.0"]);
    assert_eq!(versions(&resolution, "acme/c"), vec!["1.0.0", "1.9.9"]);
    // The root's own pin is not part of the output
    assert!(!resolution.releases.contains_key("acme/a"));
}

#[test]
fn test_releases_outside_every_spec_are_not_visited() {
    let registry = chain_registry();
    let root = root_of(&registry, "acme/a", "1.0.0");

    let resolution = Resolver::new(&registry).resolve(&root).unwrap();

    // b 2.0.0 is excluded, so its "2.x" requirement on c is never recorded
    assert_eq!(resolution.required_specs["acme/c"], vec!["1.x"]);
}

#[test]
fn test_candidate_fields() {
    let registry = chain_registry();
    let root = root_of(&registry, "acme/a", "1.0.0");

    let resolution = Resolver::new(&registry).resolve(&root).unwrap();
    let b = &resolution.releases["acme/b"][1];

    assert_eq!(b.version, "1.5.0");
    assert_eq!(b.file, "/system/releases/acme-b-1.5.0.tar.gz");
    assert_eq!(b.dependencies, vec![("acme/c".to_string(), "1.x".to_string())]);
}

#[test]
fn test_wire_shape() {
    let registry = MemoryRegistry::new();
    publish(&registry, release("acme/a", "1.0.0", &[("acme/b", None)]));
    publish(&registry, release("acme/b", "0.1.0", &[("acme/c", Some(">= 1.0.0"))]));
    publish(&registry, release("acme/c", "1.0.0", &[]));
    let root = root_of(&registry, "acme/a", "1.0.0");

    let json = Resolver::new(&registry).resolve(&root).unwrap().to_json().unwrap();

    assert_eq!(
        json,
        concat!(
            r#"{"acme/b":[{"version":"0.1.0","file":"/system/releases/acme-b-0.1.0.tar.gz","#,
            r#""dependencies":[["acme/c",">= 1.0.0"]]}],"#,
            r#""acme/c":[{"version":"1.0.0","file":"/system/releases/acme-c-1.0.0.tar.gz","#,
            r#""dependencies":[]}]}"#
        )
    );
}

#[test]
fn test_missing_requirement_uses_default() {
    let registry = MemoryRegistry::new();
    publish(&registry, release("acme/a", "1.0.0", &[("acme/b", None)]));
    publish(&registry, release("acme/b", "0.0.1", &[]));
    publish(&registry, release("acme/b", "3.0.0-rc.1", &[]));
    let root = root_of(&registry, "acme/a", "1.0.0");

    let resolution = Resolver::new(&registry).resolve(&root).unwrap();
    assert_eq!(resolution.required_specs["acme/b"], vec![">=0.0.0"]);
    assert_eq!(versions(&resolution, "acme/b"), vec!["0.0.1", "3.0.0-rc.1"]);

    let strict = Resolver::new(&registry)
        .with_default_requirement(">= 1.0.0")
        .resolve(&root)
        .unwrap();
    assert_eq!(versions(&strict, "acme/b"), vec!["3.0.0-rc.1"]);
}

#[test]
fn test_constraints_from_several_dependents_intersect() {
    let registry = MemoryRegistry::new();
    publish(
        &registry,
        release("acme/a", "1.0.0", &[("acme/b", Some("*")), ("acme/d", Some(">= 1.0.0"))]),
    );
    publish(&registry, release("acme/b", "1.0.0", &[("acme/d", Some("< 2.0.0"))]));
    publish(&registry, release("acme/d", "1.0.0", &[]));
    publish(&registry, release("acme/d", "2.0.0", &[]));
    let root = root_of(&registry, "acme/a", "1.0.0");

    let resolution = Resolver::new(&registry).resolve(&root).unwrap();
    assert_eq!(versions(&resolution, "acme/d"), vec!["1.0.0"]);
    assert_eq!(resolution.required_specs["acme/d"].len(), 2);
}

#[test]
fn test_unsatisfiable_constraints_yield_no_candidates() {
    let registry = MemoryRegistry::new();
    publish(
        &registry,
        release("acme/a", "1.0.0", &[("acme/b", Some("*")), ("acme/d", Some(">= 2.0.0"))]),
    );
    publish(&registry, release("acme/b", "1.0.0", &[("acme/d", Some("< 2.0.0"))]));
    publish(&registry, release("acme/d", "1.0.0", &[]));
    publish(&registry, release("acme/d", "2.0.0", &[]));
    let root = root_of(&registry, "acme/a", "1.0.0");

    let resolution = Resolver::new(&registry).resolve(&root).unwrap();
    assert!(resolution.releases["acme/d"].is_empty());
}

#[test]
fn test_cycle_terminates() {
    let registry = MemoryRegistry::new();
    publish(&registry, release("acme/a", "1.0.0", &[("acme/b", None)]));
    publish(&registry, release("acme/a", "2.0.0", &[("acme/b", None)]));
    publish(&registry, release("acme/b", "1.0.0", &[("acme/a", None)]));
    let root = root_of(&registry, "acme/a", "1.0.0");

    let resolution = Resolver::new(&registry).resolve(&root).unwrap();

    assert_eq!(versions(&resolution, "acme/b"), vec!["1.0.0"]);
    // a is referenced by b, and stays pinned to the root version
    assert_eq!(versions(&resolution, "acme/a"), vec!["1.0.0"]);
}

#[test]
fn test_self_dependency() {
    let registry = MemoryRegistry::new();
    publish(&registry, release("acme/a", "1.0.0", &[("acme/a", Some(">= 1.0.0"))]));
    let root = root_of(&registry, "acme/a", "1.0.0");

    let resolution = Resolver::new(&registry).resolve(&root).unwrap();
    assert_eq!(versions(&resolution, "acme/a"), vec!["1.0.0"]);
}

#[test]
fn test_module_not_found() {
    let registry = MemoryRegistry::new();
    publish(&registry, release("acme/a", "1.0.0", &[("acme/b", None)]));
    publish(&registry, release("acme/b", "1.0.0", &[("acme/ghost", Some(">= 1.0.0"))]));
    let root = root_of(&registry, "acme/a", "1.0.0");

    let err = Resolver::new(&registry).resolve(&root).unwrap_err();
    assert!(matches!(err, ResolutionError::ModuleNotFound { ref name } if name == "acme/ghost"));
    assert!(err.to_string().contains("acme/ghost"));
}

#[test]
fn test_bad_requirement() {
    let registry = MemoryRegistry::new();
    publish(&registry, release("acme/a", "1.0.0", &[("acme/b", Some("latest"))]));
    publish(&registry, release("acme/b", "1.0.0", &[]));
    let root = root_of(&registry, "acme/a", "1.0.0");

    let err = Resolver::new(&registry).resolve(&root).unwrap_err();
    match err {
        ResolutionError::BadRequirement {
            ref module,
            ref requirement,
            ref declared_by,
            ..
        } => {
            assert_eq!(module, "acme/b");
            assert_eq!(requirement, "latest");
            assert_eq!(declared_by, "acme/a@1.0.0");
        },
        other => panic!("unexpected error: {}", other),
    }

    let forge: ForgeError = err.into();
    assert!(matches!(forge, ForgeError::BadRequirement { .. }));
}

#[test]
fn test_dependency_names_are_normalized() {
    let registry = MemoryRegistry::new();
    publish(
        &registry,
        release("acme/a", "1.0.0", &[("Acme-B", Some("1.x")), ("acme/b", Some("*"))]),
    );
    publish(&registry, release("acme/b", "1.0.0", &[]));
    publish(&registry, release("acme/b", "2.0.0", &[]));
    let root = root_of(&registry, "acme/a", "1.0.0");

    let resolution = Resolver::new(&registry).resolve(&root).unwrap();
    assert_eq!(resolution.releases.len(), 1);
    assert_eq!(versions(&resolution, "acme/b"), vec!["1.0.0"]);
}

#[test]
fn test_pop_order_does_not_change_result() {
    let registry = MemoryRegistry::new();
    publish(
        &registry,
        release("acme/a", "1.0.0", &[("acme/b", Some("*")), ("acme/c", Some(">= 1.0.0"))]),
    );
    publish(&registry, release("acme/b", "1.0.0", &[("acme/c", Some("1.x"))]));
    publish(&registry, release("acme/b", "1.1.0", &[("acme/d", Some("*"))]));
    publish(&registry, release("acme/c", "1.0.0", &[("acme/a", Some("*"))]));
    publish(&registry, release("acme/c", "2.0.0", &[("acme/d", Some("< 1.0.0"))]));
    publish(&registry, release("acme/d", "0.5.0", &[("acme/b", Some("1.0.0"))]));
    publish(&registry, release("acme/d", "1.0.0", &[]));
    let root = root_of(&registry, "acme/a", "1.0.0");
    let resolver = Resolver::new(&registry);

    let fifo = resolver.resolve_with_order(&root, &mut Fifo).unwrap();
    let lifo = resolver.resolve_with_order(&root, &mut Lifo).unwrap();
    assert_eq!(fifo, lifo);
    for seed in 0..32 {
        let seeded = resolver.resolve_with_order(&root, &mut Seeded(seed)).unwrap();
        assert_eq!(fifo, seeded, "seed {}", seed);
    }
}

#[test]
fn test_concurrent_resolutions_share_registry() {
    let registry = chain_registry();
    let root = root_of(&registry, "acme/a", "1.0.0");
    let expected = Resolver::new(&registry).resolve(&root).unwrap();

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|seed| {
                let registry = &registry;
                let root = &root;
                scope.spawn(move || {
                    Resolver::new(registry)
                        .resolve_with_order(root, &mut Seeded(seed))
                        .unwrap()
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    });
}

mod property_tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashMap;

    const MODULES: [&str; 5] = ["m/a", "m/b", "m/c", "m/d", "m/e"];
    const VERSIONS: [&str; 3] = ["1.0.0", "1.1.0", "2.0.0"];
    const REQUIREMENTS: [&str; 6] = ["*", "1.x", ">= 1.1.0", "< 2.0.0", "2.0.0", ">= 1.0.0, < 1.1.0"];

    type Edge = (usize, usize, usize, usize);

    fn build(edges: &[Edge]) -> MemoryRegistry {
        let mut deps: HashMap<(usize, usize), Vec<(&str, Option<&str>)>> = HashMap::new();
        for &(from, version, to, requirement) in edges {
            deps.entry((from, version))
                .or_default()
                .push((MODULES[to], Some(REQUIREMENTS[requirement])));
        }

        let registry = MemoryRegistry::new();
        for (m, module) in MODULES.iter().enumerate() {
            for (v, version) in VERSIONS.iter().enumerate() {
                let declared = deps.get(&(m, v)).cloned().unwrap_or_default();
                publish(&registry, release(module, version, &declared));
            }
        }
        registry
    }

    proptest! {
        #[test]
        fn test_resolution_is_confluent(
            edges in prop::collection::vec((0..5usize, 0..3usize, 0..5usize, 0..6usize), 0..24),
            seed in any::<u64>(),
        ) {
            let registry = build(&edges);
            let root = root_of(&registry, "m/a", "1.0.0");
            let resolver = Resolver::new(&registry);

            let fifo = resolver.resolve_with_order(&root, &mut Fifo).unwrap();
            let lifo = resolver.resolve_with_order(&root, &mut Lifo).unwrap();
            let seeded = resolver.resolve_with_order(&root, &mut Seeded(seed)).unwrap();

            prop_assert_eq!(&fifo, &lifo);
            prop_assert_eq!(&fifo, &seeded);
        }

        #[test]
        fn test_candidates_satisfy_every_recorded_spec(
            edges in prop::collection::vec((0..5usize, 0..3usize, 0..5usize, 0..6usize), 0..24),
        ) {
            let registry = build(&edges);
            let root = root_of(&registry, "m/a", "1.0.0");
            let resolution = Resolver::new(&registry).resolve(&root).unwrap();

            for (module, candidates) in &resolution.releases {
                let specs: Vec<VersionSpec> = resolution.required_specs[module]
                    .iter()
                    .map(|s| VersionSpec::parse(s).unwrap())
                    .collect();
                for candidate in candidates {
                    let version = Version::parse(&candidate.version).unwrap();
                    prop_assert!(specs.iter().all(|spec| version.satisfies(spec)));
                }
            }
        }
    }
}
