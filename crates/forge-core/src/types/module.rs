//! Module identity and naming.
//!
//! A module is owned by one author and is addressed either by its canonical
//! name (`author-module`) or by its legacy name (`author/module`). Dependency
//! declarations use the legacy form.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

static FULL_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<author>[A-Za-z0-9_]+)[/-](?P<module>[A-Za-z0-9_]+)$")
        .unwrap_or_else(|e| panic!("BUG: invalid module name pattern: {}", e))
});

/// Author and module name pair identifying a module
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ModuleName {
    pub author: String,
    pub name: String,
}

/// A module as stored by the registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    pub author: String,
    pub name: String,
    #[serde(default)]
    pub desc: String,
    /// Whitespace-separated tags
    #[serde(default)]
    pub tags: String,
}

impl ModuleName {
    pub fn new(author: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            name: name.into(),
        }
    }

    /// Parse `author/module` or `author-module`
    pub fn parse(full_name: &str) -> Option<Self> {
        let caps = FULL_NAME.captures(full_name)?;
        Some(Self::new(&caps["author"], &caps["module"]))
    }

    /// `author-module`, lower-cased
    pub fn canonical_name(&self) -> String {
        format!("{}-{}", self.author.to_lowercase(), self.name.to_lowercase())
    }

    /// `author/module`, lower-cased
    pub fn legacy_name(&self) -> String {
        format!("{}/{}", self.author.to_lowercase(), self.name.to_lowercase())
    }
}

impl fmt::Display for ModuleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical_name())
    }
}

/// Normalize a declared dependency name to its legacy form.
///
/// Names that do not parse are returned unchanged so the registry lookup can
/// report them as missing.
pub fn normalize_legacy_name(full_name: &str) -> String {
    ModuleName::parse(full_name)
        .map(|name| name.legacy_name())
        .unwrap_or_else(|| full_name.to_string())
}

impl Module {
    pub fn new(author: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            name: name.into(),
            desc: String::new(),
            tags: String::new(),
        }
    }

    pub fn id(&self) -> ModuleName {
        ModuleName::new(self.author.clone(), self.name.clone())
    }

    pub fn canonical_name(&self) -> String {
        self.id().canonical_name()
    }

    pub fn legacy_name(&self) -> String {
        self.id().legacy_name()
    }

    pub fn tag_list(&self) -> Vec<&str> {
        self.tags.split_whitespace().collect()
    }
}
