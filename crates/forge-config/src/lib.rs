//! Configuration parsing for Forge
//!
//! This crate handles parsing and validation of `forge.toml`, the fallback
//! to the per-user config file, and `FORGE_*` environment overrides.

pub mod loader;
pub mod toml;

// Re-export main types
pub use loader::{ConfigLoader, ConfigSource, LoadedConfig};
pub use crate::toml::{ForgeToml, LogSection, RegistrySection, ResolverSection};

use forge_core::error::ForgeError;

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ForgeError>;
