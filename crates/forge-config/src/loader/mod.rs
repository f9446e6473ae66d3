//! Config file discovery, fallback logic, and environment overrides

use camino::{Utf8Path, Utf8PathBuf};
use forge_core::error::ForgeError;
use std::collections::HashMap;
use tracing::debug;

use crate::toml::{load_from_file, validate_config, ForgeToml};
use crate::ConfigResult;

/// Project config file name
pub const CONFIG_FILE: &str = "forge.toml";

/// Environment variable prefix for overrides
pub const ENV_PREFIX: &str = "FORGE_";

/// Main configuration loading interface
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Current working directory
    cwd: Utf8PathBuf,
    /// Home directory; `None` disables the per-user config
    home: Option<Utf8PathBuf>,
}

/// Where the configuration came from
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigSource {
    /// forge.toml in the working directory or one of its parents
    Project(Utf8PathBuf),
    /// ~/.forge/config.toml
    Global(Utf8PathBuf),
    /// Built-in defaults
    Defaults,
}

/// Configuration after discovery and overrides
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedConfig {
    pub config: ForgeToml,
    pub source: ConfigSource,
    /// Directory relative paths in the config resolve against
    pub root: Utf8PathBuf,
}

impl ConfigLoader {
    /// Create a loader rooted at `cwd` using the user's home directory
    pub fn new(cwd: Utf8PathBuf) -> Self {
        let home = dirs::home_dir().and_then(|home| Utf8PathBuf::try_from(home).ok());
        Self { cwd, home }
    }

    /// Override the home directory used for the per-user config
    pub fn with_home(mut self, home: Option<Utf8PathBuf>) -> Self {
        self.home = home;
        self
    }

    /// Find forge.toml in the working directory or the nearest parent
    pub fn find_project_config(&self) -> Option<Utf8PathBuf> {
        self.cwd
            .ancestors()
            .map(|dir| dir.join(CONFIG_FILE))
            .find(|path| path.is_file())
    }

    /// Path of the per-user config file
    pub fn global_config_path(&self) -> Option<Utf8PathBuf> {
        self.home
            .as_ref()
            .map(|home| home.join(".forge").join("config.toml"))
    }

    /// Load configuration with `FORGE_*` overrides from the process
    /// environment
    pub fn load(&self) -> ConfigResult<LoadedConfig> {
        self.load_with_env(&collect_env_overrides())
    }

    /// Load configuration: project file, else per-user file, else defaults,
    /// then apply `overrides`
    pub fn load_with_env(&self, overrides: &HashMap<String, String>) -> ConfigResult<LoadedConfig> {
        let mut loaded = self.load_file()?;
        apply_env_overrides(&mut loaded, overrides)?;
        validate_config(&loaded.config)?;
        Ok(loaded)
    }

    fn load_file(&self) -> ConfigResult<LoadedConfig> {
        if let Some(path) = self.find_project_config() {
            debug!("Using project config {}", path);
            let config = load_from_file(&path)?;
            let root = path.parent().map_or_else(|| self.cwd.clone(), Utf8Path::to_path_buf);
            return Ok(LoadedConfig {
                config,
                source: ConfigSource::Project(path),
                root,
            });
        }

        if let Some(path) = self.global_config_path().filter(|path| path.is_file()) {
            debug!("Using global config {}", path);
            let config = load_from_file(&path)?;
            return Ok(LoadedConfig {
                config,
                source: ConfigSource::Global(path),
                root: self.cwd.clone(),
            });
        }

        debug!("No config file found, using defaults");
        Ok(LoadedConfig {
            config: ForgeToml::default(),
            source: ConfigSource::Defaults,
            root: self.cwd.clone(),
        })
    }
}

impl LoadedConfig {
    /// Snapshot path resolved against the config root
    pub fn snapshot_path(&self) -> Option<Utf8PathBuf> {
        self.config
            .registry
            .snapshot
            .as_ref()
            .map(|snapshot| self.root.join(snapshot))
    }
}

/// Apply `FORGE_*` overrides to a loaded config
fn apply_env_overrides(
    loaded: &mut LoadedConfig,
    overrides: &HashMap<String, String>,
) -> ConfigResult<()> {
    for (key, value) in overrides {
        match key.as_str() {
            "FORGE_ROOT" => {
                if value.is_empty() {
                    return Err(ForgeError::ConfigValidation {
                        field: key.clone(),
                        reason: "must not be empty".to_string(),
                    });
                }
                loaded.root = Utf8PathBuf::from(value);
            },
            "FORGE_SNAPSHOT" => {
                loaded.config.registry.snapshot = Some(Utf8PathBuf::from(value));
            },
            "FORGE_RELEASES_URL" => {
                loaded.config.registry.releases_url = value.clone();
            },
            "FORGE_LOG" => {
                loaded.config.log.level = value.to_lowercase();
            },
            _ => {
                // Unknown environment variable, ignore
            },
        }
    }

    Ok(())
}

/// Collect `FORGE_*` variables from the process environment
pub fn collect_env_overrides() -> HashMap<String, String> {
    std::env::vars()
        .filter(|(key, _)| key.starts_with(ENV_PREFIX))
        .collect()
}
