//! Error types and result aliases for Forge operations.
//!
//! Provides a unified error type covering registry lookups, requirement
//! parsing, snapshot loading and configuration, with actionable messages.

use crate::types::version::VersionError;
use thiserror::Error;

/// Unified error type for all Forge operations
#[derive(Error, Debug)]
pub enum ForgeError {
    // Grammar errors
    #[error(transparent)]
    Version(#[from] VersionError),

    // Registry errors
    #[error("Invalid module name: '{name}'")]
    InvalidModuleName { name: String },

    #[error("Module '{name}' not found in registry")]
    ModuleNotFound { name: String },

    #[error("Module {module} has no release for version {version}")]
    ReleaseNotFound { module: String, version: String },

    #[error("Module {module} has no releases")]
    NoReleases { module: String },

    #[error("Module {module} already has a release for version {version}")]
    DuplicateRelease { module: String, version: String },

    #[error("Unsafe tarball path: {path}")]
    UnsafePath { path: String },

    #[error("Failed to load registry snapshot: {message}")]
    Snapshot { message: String },

    // Resolution errors
    #[error("Module {module} declares an unparseable requirement '{requirement}'")]
    BadRequirement {
        module: String,
        requirement: String,
        #[source]
        source: VersionError,
    },

    // Config errors
    #[error("Failed to parse forge.toml: {message} at line {line}, column {column}")]
    TomlParse {
        message: String,
        line: usize,
        column: usize,
    },

    #[error("Configuration field '{field}' is invalid: {reason}")]
    ConfigValidation { field: String, reason: String },

    // IO errors
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for Forge operations
pub type ForgeResult<T> = Result<T, ForgeError>;

impl ForgeError {
    /// Create an IO error from std::io::Error
    pub fn io(message: String, source: std::io::Error) -> Self {
        Self::Io { message, source }
    }

    /// Create a snapshot error from any displayable cause
    pub fn snapshot(message: impl std::fmt::Display) -> Self {
        Self::Snapshot {
            message: message.to_string(),
        }
    }

    /// Get a user-friendly suggestion for fixing this error
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            ForgeError::InvalidModuleName { .. } => {
                Some("Module names look like 'author/module' or 'author-module'")
            },
            ForgeError::ModuleNotFound { .. } => {
                Some("Check the module name spelling or try 'forge search'")
            },
            ForgeError::ReleaseNotFound { .. } => {
                Some("Run 'forge module <name>' to list the published versions")
            },
            ForgeError::BadRequirement { .. } => {
                Some("Requirements look like '>= 1.0.0 <2.0.0', '1.x' or '1.2.3'")
            },
            ForgeError::Version(VersionError::InvalidSpec { .. }) => {
                Some("Requirements look like '>= 1.0.0 <2.0.0', '1.x' or '1.2.3'")
            },
            ForgeError::Snapshot { .. } => {
                Some("Check the [registry] snapshot path in forge.toml")
            },
            _ => None,
        }
    }
}
