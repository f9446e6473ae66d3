//! Version requirement grammar.
//!
//! Requirement strings follow the module ecosystem's flavour of semantic
//! version ranges: operators may be separated from their version by a single
//! space, several comparators may appear without a comma between them, and
//! `N.x` / `N.M.x` shorthands expand to half-open ranges.
//!
//! Parsing is a fixed sequence of [`GrammarRule`] productions; the first rule
//! that applies decides the outcome.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use super::version::{PartialVersion, Version, VersionError};

const COMPARATOR_PATTERN: &str = r"(<|<=|==|>=|>|!=)\s?(\d[^\s]*)";

static COMPARATOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!("^{}$", COMPARATOR_PATTERN))
        .unwrap_or_else(|e| panic!("BUG: invalid comparator pattern: {}", e))
});

static COMPARATOR_SCAN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(COMPARATOR_PATTERN)
        .unwrap_or_else(|e| panic!("BUG: invalid comparator pattern: {}", e))
});

static SHORTHAND: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+)\.(x|\d+\.x)$")
        .unwrap_or_else(|e| panic!("BUG: invalid shorthand pattern: {}", e))
});

/// Comparison operator for version requirements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Any,          // *
    Exact,        // ==1.0.0
    NotEqual,     // !=1.0.0
    Less,         // <1.0.0
    LessEq,       // <=1.0.0
    Greater,      // >1.0.0
    GreaterEq,    // >=1.0.0
}

/// Individual version comparator
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Comparator {
    pub op: Op,
    pub version: PartialVersion,
}

/// Parsed requirement: the conjunction of its comparators
///
/// Equality and hashing follow the ordered comparator list, plus whether the
/// spec came from the `N.x` shorthand. `>=1.0.0 <2.0.0` and `>=1.0.0, <2.0.0`
/// are the same spec; `4.x` and `>=4.0.0, <5.0.0` are not, even though they
/// accept the same versions. Two specs that are equal always display the
/// same text.
#[derive(Debug, Clone)]
pub struct VersionSpec {
    rule: GrammarRule,
    comparators: Vec<Comparator>,
}

/// Productions of the requirement grammar, in the order they are tried
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GrammarRule {
    /// `*`
    Any,
    /// `N.x` or `N.M.x`
    Shorthand,
    /// Comma-separated comparators, e.g. `>=1.0.0, <2.0.0`
    CommaSeparated,
    /// The whole string is one comparator, e.g. `>= 1.0.0`
    SingleComparator,
    /// Every comparator found in the string, e.g. `>= 3.1.0 <4.0.0`
    ScannedComparators,
    /// A bare, possibly partial, version meaning `==`
    BareVersion,
}

impl Op {
    fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "==" => Some(Op::Exact),
            "!=" => Some(Op::NotEqual),
            "<" => Some(Op::Less),
            "<=" => Some(Op::LessEq),
            ">" => Some(Op::Greater),
            ">=" => Some(Op::GreaterEq),
            _ => None,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Op::Any => "*",
            Op::Exact => "==",
            Op::NotEqual => "!=",
            Op::Less => "<",
            Op::LessEq => "<=",
            Op::Greater => ">",
            Op::GreaterEq => ">=",
        }
    }
}

impl Comparator {
    pub fn new(op: Op, version: PartialVersion) -> Self {
        Self { op, version }
    }

    /// The `*` comparator
    pub fn any() -> Self {
        Self::new(Op::Any, PartialVersion::any())
    }

    /// Parse a single comparator item
    ///
    /// Accepts `*`, an operator followed by an optional space and a version
    /// (`>= 1.0.0`), or a bare version, which is read as `==`.
    pub fn parse(input: &str) -> Result<Self, VersionError> {
        if input.is_empty() {
            return Err(VersionError::invalid_spec(input));
        }
        if input == "*" {
            return Ok(Self::any());
        }
        if let Ok(version) = PartialVersion::parse(input) {
            return Ok(Self::new(Op::Exact, version));
        }
        Self::parse_operator_form(input)
    }

    /// Parse text that must match the operator-and-version pattern exactly
    fn parse_operator_form(input: &str) -> Result<Self, VersionError> {
        COMPARATOR
            .captures(input)
            .ok_or_else(|| VersionError::invalid_spec(input))
            .and_then(|caps| Self::from_captures(input, &caps))
    }

    fn from_captures(input: &str, caps: &Captures<'_>) -> Result<Self, VersionError> {
        let op = Op::from_symbol(&caps[1]).ok_or_else(|| VersionError::invalid_spec(input))?;
        let version =
            PartialVersion::parse(&caps[2]).map_err(|_| VersionError::invalid_spec(input))?;
        Ok(Self::new(op, version))
    }

    /// Check if a version matches this comparator
    ///
    /// Every operator except `==` compares against the operand with
    /// missing components read as 0.
    pub fn matches(&self, version: &Version) -> bool {
        match self.op {
            Op::Any => true,
            Op::Exact => self.version.matches_exact(version),
            Op::NotEqual => version != &self.version.to_version(),
            Op::Less => version < &self.version.to_version(),
            Op::LessEq => version <= &self.version.to_version(),
            Op::Greater => version > &self.version.to_version(),
            Op::GreaterEq => version >= &self.version.to_version(),
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.op {
            Op::Any => f.write_str("*"),
            op => write!(f, "{}{}", op.symbol(), self.version),
        }
    }
}

impl FromStr for Comparator {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s.trim())
    }
}

impl GrammarRule {
    /// All productions, in priority order
    pub const ORDER: [GrammarRule; 6] = [
        GrammarRule::Any,
        GrammarRule::Shorthand,
        GrammarRule::CommaSeparated,
        GrammarRule::SingleComparator,
        GrammarRule::ScannedComparators,
        GrammarRule::BareVersion,
    ];

    /// Try this production against `input`.
    ///
    /// `None` means the production does not apply and the next one should be
    /// tried; `Some(Err(_))` means it applies but the text is malformed.
    pub fn apply(self, input: &str) -> Option<Result<Vec<Comparator>, VersionError>> {
        match self {
            GrammarRule::Any => (input == "*").then(|| Ok(vec![Comparator::any()])),
            GrammarRule::Shorthand => SHORTHAND
                .captures(input)
                .map(|caps| expand_shorthand(input, &caps)),
            GrammarRule::CommaSeparated => input.contains(',').then(|| {
                input
                    .split(',')
                    .map(|segment| {
                        Comparator::parse_operator_form(segment.trim())
                            .map_err(|_| VersionError::invalid_spec(input))
                    })
                    .collect()
            }),
            GrammarRule::SingleComparator => COMPARATOR
                .captures(input)
                .map(|caps| Comparator::from_captures(input, &caps).map(|c| vec![c])),
            GrammarRule::ScannedComparators => {
                let found: Vec<Captures<'_>> = COMPARATOR_SCAN.captures_iter(input).collect();
                if found.is_empty() {
                    return None;
                }
                Some(
                    found
                        .iter()
                        .map(|caps| Comparator::from_captures(input, caps))
                        .collect(),
                )
            }
            GrammarRule::BareVersion => PartialVersion::parse(input)
                .ok()
                .map(|version| Ok(vec![Comparator::new(Op::Exact, version)])),
        }
    }
}

fn expand_shorthand(input: &str, caps: &Captures<'_>) -> Result<Vec<Comparator>, VersionError> {
    let invalid = || VersionError::invalid_spec(input);
    let major: u64 = caps[1].parse().map_err(|_| invalid())?;

    let (lower, upper) = match caps[2].strip_suffix(".x") {
        None => (
            (major, 0),
            (major.checked_add(1).ok_or_else(invalid)?, 0),
        ),
        Some(minor) => {
            let minor: u64 = minor.parse().map_err(|_| invalid())?;
            ((major, minor), (major, minor.checked_add(1).ok_or_else(invalid)?))
        }
    };

    let bound = |(major, minor): (u64, u64)| PartialVersion {
        major,
        minor: Some(minor),
        patch: Some(0),
        prerelease: Vec::new(),
    };
    Ok(vec![
        Comparator::new(Op::GreaterEq, bound(lower)),
        Comparator::new(Op::Less, bound(upper)),
    ])
}

impl VersionSpec {
    /// Parse a requirement string
    pub fn parse(input: &str) -> Result<Self, VersionError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(VersionError::invalid_spec(input));
        }

        for rule in GrammarRule::ORDER {
            if let Some(result) = rule.apply(input) {
                return result.map(|comparators| Self { rule, comparators });
            }
        }

        Err(VersionError::invalid_spec(input))
    }

    /// Spec that admits exactly one version (prerelease included)
    pub fn exact(version: &Version) -> Self {
        Self {
            rule: GrammarRule::BareVersion,
            comparators: vec![Comparator::new(Op::Exact, PartialVersion::from(version))],
        }
    }

    /// The production this spec was parsed by
    pub fn rule(&self) -> GrammarRule {
        self.rule
    }

    pub fn comparators(&self) -> &[Comparator] {
        &self.comparators
    }

    /// Check if a version satisfies every comparator
    pub fn matches(&self, version: &Version) -> bool {
        self.comparators.iter().all(|comp| comp.matches(version))
    }

    fn is_shorthand(&self) -> bool {
        self.rule == GrammarRule::Shorthand
    }
}

impl PartialEq for VersionSpec {
    fn eq(&self, other: &Self) -> bool {
        self.is_shorthand() == other.is_shorthand() && self.comparators == other.comparators
    }
}

impl Eq for VersionSpec {}

impl Hash for VersionSpec {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.is_shorthand().hash(state);
        self.comparators.hash(state);
    }
}

impl fmt::Display for VersionSpec {
    /// Shorthand specs keep their `N.x` form; everything else is written as
    /// comma-separated comparators
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.is_shorthand(), self.comparators.as_slice()) {
            (true, [lower, upper]) => {
                if upper.version.major > lower.version.major {
                    write!(f, "{}.x", lower.version.major)
                } else {
                    write!(f, "{}.{}.x", lower.version.major, lower.version.minor.unwrap_or(0))
                }
            }
            (_, comparators) => {
                for (i, comparator) in comparators.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", comparator)?;
                }
                Ok(())
            }
        }
    }
}

impl FromStr for VersionSpec {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Version {
    /// Check if this version satisfies a requirement
    pub fn satisfies(&self, spec: &VersionSpec) -> bool {
        spec.matches(self)
    }
}
