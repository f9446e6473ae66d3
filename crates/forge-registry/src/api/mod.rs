//! Registry wire types: the JSON snapshot format and module summaries

use forge_core::ReleaseMetadata;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Registry snapshot file
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SnapshotFile {
    #[serde(default)]
    pub modules: Vec<ModuleRecord>,
}

/// A module and its releases as stored in a snapshot
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ModuleRecord {
    /// Author (owner) name
    pub author: String,
    /// Module name
    pub name: String,
    /// Description
    #[serde(default)]
    pub desc: String,
    /// Whitespace-separated tags
    #[serde(default)]
    pub tags: String,
    /// Published releases
    #[serde(default)]
    pub releases: Vec<ReleaseRecord>,
}

/// A single release as stored in a snapshot
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReleaseRecord {
    /// Version string
    pub version: String,
    /// Tarball file name, placed under the releases URL
    #[serde(default)]
    pub file: String,
    /// Local archive to size and hash, relative to the snapshot file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archive: Option<PathBuf>,
    /// Archive size in bytes
    #[serde(default)]
    pub file_size: u64,
    /// Archive content hash
    #[serde(default)]
    pub file_hash: String,
    /// Release metadata (dependencies, project page, ...)
    #[serde(default)]
    pub metadata: ReleaseMetadata,
}

/// Summary of a module as returned by module listings and search
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ModuleSummary {
    pub name: String,
    pub author: String,
    /// Latest version, empty when the module has no releases
    pub version: String,
    /// `author/module`
    pub full_name: String,
    pub desc: String,
    /// Project page from the latest release's metadata
    pub project_url: String,
    /// Versions, newest first
    pub releases: Vec<ReleaseSummary>,
    pub tag_list: Vec<String>,
}

/// Version entry of a [`ModuleSummary`]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ReleaseSummary {
    pub version: String,
}
