//! Release value objects.
//!
//! A release is one published version of a module. Releases are immutable
//! once created; the resolver only ever sees them through [`ReleaseId`] and
//! their declared dependency lists.

use crate::error::ForgeResult;
use crate::types::module::ModuleName;
use crate::types::version::Version;
use crate::utils::{blake3_hash, tarball_locator};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Requirement assumed for a dependency that declares none
pub const DEFAULT_REQUIREMENT: &str = ">= 0.0.0";

/// Identity of a release: the module's legacy name and the version
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ReleaseId {
    pub module: String,
    pub version: Version,
}

/// A dependency entry as written in release metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclaredDependency {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_requirement: Option<String>,
}

/// Metadata shipped inside a release archive
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseMetadata {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub project_page: String,
    #[serde(default)]
    pub dependencies: Vec<DeclaredDependency>,
}

/// A published release of a module
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    pub module: ModuleName,
    pub version: Version,
    /// Opaque locator of the release tarball
    pub tarball: String,
    #[serde(default)]
    pub file_size: u64,
    /// Blake3 hex digest of the archive
    #[serde(default)]
    pub file_hash: String,
    #[serde(default)]
    pub metadata: ReleaseMetadata,
}

impl DeclaredDependency {
    pub fn new(name: impl Into<String>, version_requirement: Option<&str>) -> Self {
        Self {
            name: name.into(),
            version_requirement: version_requirement.map(str::to_string),
        }
    }
}

impl ReleaseId {
    pub fn new(module: impl Into<String>, version: Version) -> Self {
        Self {
            module: module.into(),
            version,
        }
    }
}

impl fmt::Display for ReleaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.module, self.version)
    }
}

impl Release {
    pub fn new(
        module: ModuleName,
        version: Version,
        tarball: impl Into<String>,
        metadata: ReleaseMetadata,
    ) -> Self {
        Self {
            module,
            version,
            tarball: tarball.into(),
            file_size: 0,
            file_hash: String::new(),
            metadata,
        }
    }

    /// Build a release from the raw archive bytes.
    ///
    /// The tarball locator is placed under `releases_url` and the size and
    /// content hash are computed from `bytes`.
    pub fn from_archive_bytes(
        module: ModuleName,
        version: Version,
        releases_url: &str,
        filename: &str,
        bytes: &[u8],
        metadata: ReleaseMetadata,
    ) -> ForgeResult<Self> {
        let tarball = tarball_locator(releases_url, &module.author, filename)?;
        Ok(Self {
            module,
            version,
            tarball,
            file_size: bytes.len() as u64,
            file_hash: blake3_hash(bytes),
            metadata,
        })
    }

    pub fn id(&self) -> ReleaseId {
        ReleaseId::new(self.module.legacy_name(), self.version.clone())
    }

    pub fn is_prerelease(&self) -> bool {
        self.version.is_prerelease()
    }

    /// Declared `(name, requirement)` pairs in metadata order, filling in
    /// `default_requirement` where none is given
    pub fn declared_dependencies(&self, default_requirement: &str) -> Vec<(String, String)> {
        self.metadata
            .dependencies
            .iter()
            .map(|dep| {
                let requirement = dep
                    .version_requirement
                    .as_deref()
                    .unwrap_or(default_requirement);
                (dep.name.clone(), requirement.to_string())
            })
            .collect()
    }
}

/// Pick the latest release: the highest non-prerelease version, or the
/// highest prerelease when nothing else exists
pub fn latest_release<'a, I>(releases: I) -> Option<&'a Release>
where
    I: IntoIterator<Item = &'a Release>,
{
    let mut best_stable: Option<&Release> = None;
    let mut best_any: Option<&Release> = None;

    for release in releases {
        if best_any.map_or(true, |best| release.version > best.version) {
            best_any = Some(release);
        }
        if !release.is_prerelease()
            && best_stable.map_or(true, |best| release.version > best.version)
        {
            best_stable = Some(release);
        }
    }

    best_stable.or(best_any)
}
