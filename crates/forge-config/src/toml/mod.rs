//! forge.toml configuration parsing and serialization

use camino::{Utf8Path, Utf8PathBuf};
use forge_core::error::ForgeError;
use forge_core::{VersionSpec, DEFAULT_REQUIREMENT};
use serde::{Deserialize, Serialize};

use crate::ConfigResult;

/// Log levels accepted in `[log] level`
pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Complete forge.toml configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ForgeToml {
    /// Where modules and releases come from
    #[serde(default)]
    pub registry: RegistrySection,

    /// Dependency resolution settings
    #[serde(default)]
    pub resolver: ResolverSection,

    /// Logging settings
    #[serde(default)]
    pub log: LogSection,
}

/// `[registry]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegistrySection {
    /// Registry snapshot JSON, relative paths resolve against the config root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<Utf8PathBuf>,

    /// Prefix of every tarball locator
    #[serde(default = "default_releases_url")]
    pub releases_url: String,
}

/// `[resolver]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResolverSection {
    /// Requirement assumed for dependencies that declare none
    #[serde(default = "default_requirement")]
    pub default_requirement: String,
}

/// `[log]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogSection {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_releases_url() -> String {
    "/system/releases/".to_string()
}

fn default_requirement() -> String {
    DEFAULT_REQUIREMENT.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for RegistrySection {
    fn default() -> Self {
        Self {
            snapshot: None,
            releases_url: default_releases_url(),
        }
    }
}

impl Default for ResolverSection {
    fn default() -> Self {
        Self {
            default_requirement: default_requirement(),
        }
    }
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Parse TOML string to ForgeToml configuration
pub fn parse_forge_toml(content: &str) -> ConfigResult<ForgeToml> {
    // toml_edit first, for line and column on syntax errors
    content
        .parse::<toml_edit::DocumentMut>()
        .map_err(|e| syntax_error(content, e.message(), e.span()))?;

    let config: ForgeToml = toml::from_str(content)
        .map_err(|e| syntax_error(content, e.message(), e.span()))?;

    validate_config(&config)?;

    Ok(config)
}

fn syntax_error(content: &str, message: &str, span: Option<std::ops::Range<usize>>) -> ForgeError {
    let (line, column) = span
        .map(|span| line_column(content, span.start))
        .unwrap_or((0, 0));
    ForgeError::TomlParse {
        message: message.trim().to_string(),
        line,
        column,
    }
}

/// 1-based line and column of a byte offset
fn line_column(content: &str, offset: usize) -> (usize, usize) {
    let before = &content[..offset.min(content.len())];
    let line = before.matches('\n').count() + 1;
    let column = before
        .rfind('\n')
        .map_or(before.chars().count(), |nl| before[nl + 1..].chars().count())
        + 1;
    (line, column)
}

/// Serialize ForgeToml to TOML string
pub fn serialize_forge_toml(config: &ForgeToml) -> ConfigResult<String> {
    toml::to_string_pretty(config).map_err(|e| ForgeError::TomlParse {
        message: format!("TOML serialization error: {}", e),
        line: 0,
        column: 0,
    })
}

/// Validate field values serde cannot check
pub fn validate_config(config: &ForgeToml) -> ConfigResult<()> {
    if config.registry.releases_url.trim().is_empty() {
        return Err(ForgeError::ConfigValidation {
            field: "registry.releases_url".to_string(),
            reason: "must not be empty".to_string(),
        });
    }

    VersionSpec::parse(&config.resolver.default_requirement).map_err(|e| {
        ForgeError::ConfigValidation {
            field: "resolver.default_requirement".to_string(),
            reason: e.to_string(),
        }
    })?;

    if !LOG_LEVELS.contains(&config.log.level.as_str()) {
        return Err(ForgeError::ConfigValidation {
            field: "log.level".to_string(),
            reason: format!(
                "'{}' is not one of {}",
                config.log.level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    Ok(())
}

/// Load and parse forge.toml from file path
pub fn load_from_file(path: &Utf8Path) -> ConfigResult<ForgeToml> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| ForgeError::io(format!("Failed to read {}", path), e))?;

    parse_forge_toml(&content).map_err(|e| match e {
        ForgeError::TomlParse {
            message,
            line,
            column,
        } => ForgeError::TomlParse {
            message: format!("in {}: {}", path, message),
            line,
            column,
        },
        ForgeError::ConfigValidation { field, reason } => ForgeError::ConfigValidation {
            field,
            reason: format!("in {}: {}", path, reason),
        },
        other => other,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty_config_uses_defaults() {
        let config = parse_forge_toml("").unwrap();
        assert_eq!(config, ForgeToml::default());
        assert_eq!(config.registry.releases_url, "/system/releases/");
        assert_eq!(config.resolver.default_requirement, ">= 0.0.0");
        assert_eq!(config.log.level, "info");
        assert!(config.registry.snapshot.is_none());
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[registry]
snapshot = "data/registry.json"
releases_url = "https://mirror.example/releases/"

[resolver]
default_requirement = "*"

[log]
level = "debug"
"#;

        let config = parse_forge_toml(toml).unwrap();
        assert_eq!(
            config.registry.snapshot.as_deref(),
            Some(Utf8Path::new("data/registry.json"))
        );
        assert_eq!(config.registry.releases_url, "https://mirror.example/releases/");
        assert_eq!(config.resolver.default_requirement, "*");
        assert_eq!(config.log.level, "debug");
    }

    #[test]
    fn test_syntax_error_has_position() {
        let toml = "[registry]\nsnapshot = \n";

        match parse_forge_toml(toml) {
            Err(ForgeError::TomlParse { line, column, .. }) => {
                assert_eq!(line, 2);
                assert!(column > 1);
            },
            other => panic!("expected TomlParse, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_field_rejected() {
        let toml = "[registry]\nsnapshots = \"x.json\"\n";
        assert!(matches!(
            parse_forge_toml(toml),
            Err(ForgeError::TomlParse { .. })
        ));
    }

    #[test]
    fn test_invalid_default_requirement() {
        let toml = "[resolver]\ndefault_requirement = \"whatever\"\n";
        match parse_forge_toml(toml) {
            Err(ForgeError::ConfigValidation { field, .. }) => {
                assert_eq!(field, "resolver.default_requirement");
            },
            other => panic!("expected ConfigValidation, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_log_level() {
        let toml = "[log]\nlevel = \"loud\"\n";
        assert!(matches!(
            parse_forge_toml(toml),
            Err(ForgeError::ConfigValidation { .. })
        ));
    }

    #[test]
    fn test_empty_releases_url() {
        let toml = "[registry]\nreleases_url = \"  \"\n";
        assert!(matches!(
            parse_forge_toml(toml),
            Err(ForgeError::ConfigValidation { .. })
        ));
    }

    #[test]
    fn test_round_trip_serialization() {
        let toml = r#"
[registry]
snapshot = "registry.json"

[log]
level = "warn"
"#;

        let config = parse_forge_toml(toml).unwrap();
        let serialized = serialize_forge_toml(&config).unwrap();
        let reparsed = parse_forge_toml(&serialized).unwrap();

        assert_eq!(config, reparsed);
    }

    #[test]
    fn test_line_column() {
        assert_eq!(line_column("abc", 0), (1, 1));
        assert_eq!(line_column("abc\ndef", 5), (2, 2));
        assert_eq!(line_column("abc", 100), (1, 4));
    }

    #[test]
    fn test_load_from_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = Utf8PathBuf::try_from(dir.path().join("forge.toml")).unwrap();
        std::fs::write(&path, "[log]\nlevel = \"loud\"\n").unwrap();

        match load_from_file(&path) {
            Err(ForgeError::ConfigValidation { reason, .. }) => {
                assert!(reason.contains("forge.toml"));
            },
            other => panic!("expected ConfigValidation, got {:?}", other),
        }
    }
}
