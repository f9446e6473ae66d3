//! # forge-core
//!
//! Core types and utilities shared across all Forge crates.
//!
//! This crate provides:
//! - Version, PartialVersion and the requirement grammar (VersionSpec)
//! - Module and Release value objects with release metadata
//! - ForgeError enum for unified error handling
//! - Hashing and tarball locator helpers
//!
//! ## Architecture
//!
//! The crate is organized into modules:
//! - `types`: Core data types (Version, VersionSpec, Release, etc.)
//! - `error`: Error types and result aliases
//! - `utils`: Utility functions and helpers

pub mod error;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use error::{ForgeError, ForgeResult};
pub use types::{
    latest_release, normalize_legacy_name, Comparator, DeclaredDependency, Module, ModuleName, Op, PartialVersion,
    Release, ReleaseId, ReleaseMetadata, Version, VersionError, VersionSpec, DEFAULT_REQUIREMENT,
};
