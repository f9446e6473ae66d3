//! Semantic version types.
//!
//! Provides the fully specified [`Version`] used by releases and the
//! [`PartialVersion`] used as a comparator operand, where trailing
//! components may be left out.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use thiserror::Error;

/// Semantic version (major.minor.patch-prerelease+build)
///
/// Build metadata is carried for display but takes no part in ordering,
/// equality or hashing.
#[derive(Debug, Clone)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub prerelease: Vec<Identifier>,
    pub build: Vec<String>,
}

/// A single dot-separated prerelease identifier
///
/// Variant order matters: numeric identifiers always sort below
/// alphanumeric ones.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Identifier {
    Numeric(u64),
    AlphaNumeric(String),
}

/// Version with optional trailing components, used as a comparator operand
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PartialVersion {
    pub major: u64,
    pub minor: Option<u64>,
    pub patch: Option<u64>,
    pub prerelease: Vec<Identifier>,
}

/// Version and requirement parsing errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionError {
    #[error("Invalid version '{input}': {reason}")]
    InvalidVersion { input: String, reason: &'static str },

    #[error("Invalid version requirement: '{input}'")]
    InvalidSpec { input: String },
}

impl VersionError {
    fn invalid_version(input: &str, reason: &'static str) -> Self {
        VersionError::InvalidVersion {
            input: input.to_string(),
            reason,
        }
    }

    pub(crate) fn invalid_spec(input: &str) -> Self {
        VersionError::InvalidSpec {
            input: input.to_string(),
        }
    }
}

/// Components shared by the full and partial parsers
struct Components {
    major: u64,
    minor: Option<u64>,
    patch: Option<u64>,
    prerelease: Vec<Identifier>,
    build: Vec<String>,
}

fn parse_components(input: &str) -> Result<Components, VersionError> {
    if input.is_empty() {
        return Err(VersionError::invalid_version(input, "empty version"));
    }

    let (version_part, build) = match input.split_once('+') {
        Some((v, b)) => (v, Some(b)),
        None => (input, None),
    };
    let (core_part, prerelease) = match version_part.split_once('-') {
        Some((c, p)) => (c, Some(p)),
        None => (version_part, None),
    };

    let parts: Vec<&str> = core_part.split('.').collect();
    if parts.len() > 3 {
        return Err(VersionError::invalid_version(input, "too many components"));
    }

    let mut numbers = parts.iter().map(|part| parse_number(input, part));
    let major = numbers
        .next()
        .unwrap_or_else(|| Err(VersionError::invalid_version(input, "missing major")))?;
    let minor = numbers.next().transpose()?;
    let patch = numbers.next().transpose()?;

    if patch.is_none() && (prerelease.is_some() || build.is_some()) {
        return Err(VersionError::invalid_version(
            input,
            "prerelease and build metadata require major.minor.patch",
        ));
    }

    let prerelease = match prerelease {
        Some(text) => text
            .split('.')
            .map(|ident| Identifier::parse(ident).ok_or_else(|| {
                VersionError::invalid_version(input, "invalid prerelease identifier")
            }))
            .collect::<Result<Vec<_>, _>>()?,
        None => Vec::new(),
    };

    let build = match build {
        Some(text) => text
            .split('.')
            .map(|ident| {
                if is_valid_identifier(ident) {
                    Ok(ident.to_string())
                } else {
                    Err(VersionError::invalid_version(input, "invalid build metadata"))
                }
            })
            .collect::<Result<Vec<_>, _>>()?,
        None => Vec::new(),
    };

    Ok(Components {
        major,
        minor,
        patch,
        prerelease,
        build,
    })
}

fn parse_number(input: &str, component: &str) -> Result<u64, VersionError> {
    if component.is_empty() || !component.bytes().all(|b| b.is_ascii_digit()) {
        return Err(VersionError::invalid_version(input, "components must be numeric"));
    }
    component
        .parse()
        .map_err(|_| VersionError::invalid_version(input, "component out of range"))
}

fn is_valid_identifier(ident: &str) -> bool {
    !ident.is_empty()
        && ident
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-')
}

impl Identifier {
    /// Parse one prerelease identifier. Digit-only identifiers with a
    /// leading zero are kept alphanumeric so they round-trip verbatim.
    pub fn parse(ident: &str) -> Option<Self> {
        if !is_valid_identifier(ident) {
            return None;
        }
        let numeric = ident.bytes().all(|b| b.is_ascii_digit())
            && (ident.len() == 1 || !ident.starts_with('0'));
        if numeric {
            if let Ok(value) = ident.parse() {
                return Some(Identifier::Numeric(value));
            }
        }
        Some(Identifier::AlphaNumeric(ident.to_string()))
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identifier::Numeric(n) => write!(f, "{}", n),
            Identifier::AlphaNumeric(s) => f.write_str(s),
        }
    }
}

fn write_dotted<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(".")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

impl Version {
    /// Create a new version
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
            prerelease: Vec::new(),
            build: Vec::new(),
        }
    }

    /// Parse a fully specified version string
    pub fn parse(input: &str) -> Result<Self, VersionError> {
        input.parse()
    }

    /// Check if this is a prerelease version
    pub fn is_prerelease(&self) -> bool {
        !self.prerelease.is_empty()
    }

    /// Get the precedence for comparison (ignores build metadata)
    fn precedence_cmp(&self, other: &Self) -> Ordering {
        match (self.major, self.minor, self.patch).cmp(&(other.major, other.minor, other.patch)) {
            Ordering::Equal => match (self.is_prerelease(), other.is_prerelease()) {
                (false, false) => Ordering::Equal,
                (true, false) => Ordering::Less,
                (false, true) => Ordering::Greater,
                (true, true) => self.prerelease.cmp(&other.prerelease),
            },
            other => other,
        }
    }
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();
        let components = parse_components(input)?;

        match (components.minor, components.patch) {
            (Some(minor), Some(patch)) => Ok(Version {
                major: components.major,
                minor,
                patch,
                prerelease: components.prerelease,
                build: components.build,
            }),
            _ => Err(VersionError::invalid_version(
                input,
                "expected major.minor.patch",
            )),
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;

        if self.is_prerelease() {
            f.write_str("-")?;
            write_dotted(f, &self.prerelease)?;
        }

        if !self.build.is_empty() {
            f.write_str("+")?;
            write_dotted(f, &self.build)?;
        }

        Ok(())
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.precedence_cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl Hash for Version {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.major.hash(state);
        self.minor.hash(state);
        self.patch.hash(state);
        self.prerelease.hash(state);
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.precedence_cmp(other)
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

impl PartialVersion {
    /// Operand used by the `*` comparator; never consulted when matching
    pub fn any() -> Self {
        Self {
            major: 0,
            minor: None,
            patch: None,
            prerelease: Vec::new(),
        }
    }

    /// Parse a possibly partial version (`1`, `1.2`, `1.2.3-rc.1`)
    ///
    /// Build metadata is accepted and dropped.
    pub fn parse(input: &str) -> Result<Self, VersionError> {
        let components = parse_components(input.trim())?;
        Ok(Self {
            major: components.major,
            minor: components.minor,
            patch: components.patch,
            prerelease: components.prerelease,
        })
    }

    /// True when major, minor and patch are all present
    pub fn is_complete(&self) -> bool {
        self.minor.is_some() && self.patch.is_some()
    }

    /// Convert to a full version (filling missing parts with 0)
    pub fn to_version(&self) -> Version {
        Version {
            major: self.major,
            minor: self.minor.unwrap_or(0),
            patch: self.patch.unwrap_or(0),
            prerelease: self.prerelease.clone(),
            build: Vec::new(),
        }
    }

    /// Wildcard match: every component given here must equal the candidate's.
    /// An absent prerelease matches any candidate prerelease.
    pub fn matches_exact(&self, version: &Version) -> bool {
        version.major == self.major
            && self.minor.map_or(true, |m| version.minor == m)
            && self.patch.map_or(true, |p| version.patch == p)
            && (self.prerelease.is_empty() || version.prerelease == self.prerelease)
    }
}

impl From<&Version> for PartialVersion {
    fn from(version: &Version) -> Self {
        Self {
            major: version.major,
            minor: Some(version.minor),
            patch: Some(version.patch),
            prerelease: version.prerelease.clone(),
        }
    }
}

impl fmt::Display for PartialVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.major)?;
        if let Some(minor) = self.minor {
            write!(f, ".{}", minor)?;
            if let Some(patch) = self.patch {
                write!(f, ".{}", patch)?;
            }
        }
        if !self.prerelease.is_empty() {
            f.write_str("-")?;
            write_dotted(f, &self.prerelease)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(text: &str) -> Version {
        Version::parse(text).unwrap()
    }

    #[test]
    fn test_version_parsing() {
        let version = v("1.2.3");
        assert_eq!(version.major, 1);
        assert_eq!(version.minor, 2);
        assert_eq!(version.patch, 3);
        assert!(version.prerelease.is_empty());
        assert!(version.build.is_empty());
    }

    #[test]
    fn test_version_with_prerelease() {
        let version = v("1.2.3-alpha.1");
        assert_eq!(
            version.prerelease,
            vec![
                Identifier::AlphaNumeric("alpha".to_string()),
                Identifier::Numeric(1)
            ]
        );
        assert!(version.is_prerelease());
    }

    #[test]
    fn test_version_with_build() {
        let version = v("1.2.3+build.7");
        assert_eq!(version.build, vec!["build".to_string(), "7".to_string()]);
        assert!(!version.is_prerelease());
    }

    #[test]
    fn test_hyphen_inside_prerelease() {
        let version = v("2.0.0-rc-1");
        assert_eq!(
            version.prerelease,
            vec![Identifier::AlphaNumeric("rc-1".to_string())]
        );
    }

    #[test]
    fn test_full_version_required() {
        for input in ["1", "1.2", "", "a.b.c", "1.2.3.4", "1..3", "1.2.3-", "1.2.3-a..b", "-1.2.3"] {
            let err = Version::parse(input).unwrap_err();
            assert!(
                matches!(err, VersionError::InvalidVersion { .. }),
                "{} should be rejected",
                input
            );
        }
    }

    #[test]
    fn test_error_carries_input() {
        let err = Version::parse("1.x.0").unwrap_err();
        assert!(err.to_string().contains("1.x.0"));
    }

    #[test]
    fn test_version_display() {
        assert_eq!(Version::new(1, 2, 3).to_string(), "1.2.3");
        assert_eq!(v("1.2.3-alpha.1+build.5").to_string(), "1.2.3-alpha.1+build.5");
        assert_eq!(v("1.0.0-01").to_string(), "1.0.0-01");
    }

    #[test]
    fn test_version_comparison() {
        assert!(v("1.0.0") < v("2.0.0"));
        assert!(v("1.0.0") < v("1.1.0"));
        assert!(v("1.1.0") < v("2.0.0"));
        assert!(v("1.10.0") > v("1.9.0"));
    }

    #[test]
    fn test_prerelease_precedence() {
        let ordered = [
            "1.0.0-alpha",
            "1.0.0-alpha.1",
            "1.0.0-alpha.beta",
            "1.0.0-beta",
            "1.0.0-beta.2",
            "1.0.0-beta.11",
            "1.0.0-rc.1",
            "1.0.0",
        ];
        for pair in ordered.windows(2) {
            assert!(v(pair[0]) < v(pair[1]), "{} < {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_numeric_identifiers_sort_below_alphanumeric() {
        assert!(v("1.0.0-2") < v("1.0.0-a"));
        assert!(v("1.0.0-999") < v("1.0.0-0a"));
    }

    #[test]
    fn test_build_metadata_ignored_for_equality() {
        assert_eq!(v("1.0.0+a"), v("1.0.0+b"));
        assert_eq!(v("1.0.0+a").cmp(&v("1.0.0")), Ordering::Equal);

        use std::collections::HashSet;
        let set: HashSet<Version> = [v("1.0.0+a"), v("1.0.0+b")].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_serde_as_string() {
        let version = v("3.1.0-rc.2");
        let json = serde_json::to_string(&version).unwrap();
        assert_eq!(json, "\"3.1.0-rc.2\"");
        let back: Version = serde_json::from_str(&json).unwrap();
        assert_eq!(back, version);

        assert!(serde_json::from_str::<Version>("\"3.1\"").is_err());
    }

    #[test]
    fn test_partial_version_parsing() {
        let major_only = PartialVersion::parse("4").unwrap();
        assert_eq!(major_only.major, 4);
        assert_eq!(major_only.minor, None);
        assert_eq!(major_only.patch, None);
        assert!(!major_only.is_complete());

        let major_minor = PartialVersion::parse("4.2").unwrap();
        assert_eq!(major_minor.minor, Some(2));
        assert_eq!(major_minor.patch, None);

        let full = PartialVersion::parse("4.2.1-rc.1+meta").unwrap();
        assert!(full.is_complete());
        assert_eq!(full.to_string(), "4.2.1-rc.1");

        assert!(PartialVersion::parse("4.2-rc.1").is_err());
        assert!(PartialVersion::parse("x").is_err());
    }

    #[test]
    fn test_partial_version_zero_fill() {
        assert_eq!(PartialVersion::parse("4").unwrap().to_version(), v("4.0.0"));
        assert_eq!(PartialVersion::parse("4.2").unwrap().to_version(), v("4.2.0"));
    }

    #[test]
    fn test_partial_version_wildcard_match() {
        let operand = PartialVersion::parse("1.2").unwrap();
        assert!(operand.matches_exact(&v("1.2.0")));
        assert!(operand.matches_exact(&v("1.2.9")));
        assert!(operand.matches_exact(&v("1.2.9-rc.1")));
        assert!(!operand.matches_exact(&v("1.3.0")));

        let pinned = PartialVersion::from(&v("1.2.0-rc.1"));
        assert!(pinned.matches_exact(&v("1.2.0-rc.1")));
        assert!(!pinned.matches_exact(&v("1.2.0")));
    }
}
