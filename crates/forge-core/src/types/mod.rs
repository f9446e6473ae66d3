//! Core data types for the module registry.
//!
//! This module provides the fundamental types used throughout Forge:
//! - Versions, partial versions and their total ordering
//! - Comparators and the requirement grammar
//! - Modules and releases

pub mod module;
pub mod release;
pub mod spec;
pub mod version;

// Re-export all public types
pub use module::{normalize_legacy_name, Module, ModuleName};
pub use release::{
    latest_release, DeclaredDependency, Release, ReleaseId, ReleaseMetadata, DEFAULT_REQUIREMENT,
};
pub use spec::{Comparator, GrammarRule, Op, VersionSpec};
pub use version::{Identifier, PartialVersion, Version, VersionError};
