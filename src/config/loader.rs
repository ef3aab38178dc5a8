//! Configuration loader with tier-based merging.

use super::types::Config;
use anyhow::Result;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const CONFIG_PATH_ENV: &str = "AGENT_DASHBOARD_CONFIG_PATH";
pub const DATA_DIR_ENV: &str = "AGENT_DASHBOARD_DATA_DIR";
pub const PORT_ENV: &str = "AGENT_DASHBOARD_PORT";

const CONFIG_FILE: &str = "config.yaml";

/// Configuration tier priority (lowest to highest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConfigTier {
    Defaults = 0,
    /// `./agent-dashboard/`
    Project = 1,
    /// `~/.agent-dashboard/`
    User = 2,
    Environment = 3,
}

impl std::fmt::Display for ConfigTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigTier::Defaults => write!(f, "defaults"),
            ConfigTier::Project => write!(f, "project"),
            ConfigTier::User => write!(f, "user"),
            ConfigTier::Environment => write!(f, "environment"),
        }
    }
}

/// Directories searched for `config.yaml`.
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    pub project_dir: Option<PathBuf>,
    pub user_dir: Option<PathBuf>,
}

impl Default for ConfigPaths {
    fn default() -> Self {
        Self::discover()
    }
}

impl ConfigPaths {
    pub fn discover() -> Self {
        Self {
            project_dir: Some(PathBuf::from("agent-dashboard")),
            user_dir: dirs::home_dir().map(|h| h.join(".agent-dashboard")),
        }
    }

    pub fn with_dirs(project_dir: Option<PathBuf>, user_dir: Option<PathBuf>) -> Self {
        Self {
            project_dir,
            user_dir,
        }
    }
}

/// Deep merge two JSON values, with `overlay` taking precedence.
///
/// Objects merge key by key; everything else is replaced. A null overlay
/// leaves the base untouched.
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base_map), Value::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                let merged = match base_map.remove(&key) {
                    Some(base_value) => deep_merge(base_value, overlay_value),
                    None => overlay_value,
                };
                base_map.insert(key, merged);
            }
            Value::Object(base_map)
        }
        (base, Value::Null) => base,
        (_, overlay) => overlay,
    }
}

/// Loads and merges configuration tiers.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    pub paths: ConfigPaths,
    config: Config,
    config_path: Option<PathBuf>,
}

impl ConfigLoader {
    pub fn load() -> Result<Self> {
        Self::load_with_paths(ConfigPaths::discover())
    }

    /// Load with explicit tier directories, reading overrides from the process environment.
    pub fn load_with_paths(paths: ConfigPaths) -> Result<Self> {
        Self::load_with_env(paths, |key| std::env::var(key).ok())
    }

    /// Load with explicit tier directories and an environment lookup.
    pub fn load_with_env(paths: ConfigPaths, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let (mut config, config_path) = match env(CONFIG_PATH_ENV) {
            Some(explicit) => {
                let path = PathBuf::from(explicit);
                (Config::load(&path)?, Some(path))
            }
            None => Self::merge_tiers(&paths)?,
        };

        Self::apply_env_overrides(&mut config, &env);

        Ok(Self {
            paths,
            config,
            config_path,
        })
    }

    fn merge_tiers(paths: &ConfigPaths) -> Result<(Config, Option<PathBuf>)> {
        let mut merged = serde_json::to_value(Config::default())?;
        let mut used = None;

        let tiers = [
            (ConfigTier::Project, paths.project_dir.as_deref()),
            (ConfigTier::User, paths.user_dir.as_deref()),
        ];
        for (tier, dir) in tiers {
            let Some(file) = dir.map(|d| d.join(CONFIG_FILE)) else {
                continue;
            };
            if let Some(value) = read_yaml(&file, tier) {
                merged = deep_merge(merged, value);
                used = Some(file);
            }
        }

        Ok((serde_json::from_value(merged)?, used))
    }

    fn apply_env_overrides(config: &mut Config, env: &impl Fn(&str) -> Option<String>) {
        if let Some(data_dir) = env(DATA_DIR_ENV) {
            config.server.data_dir = PathBuf::from(data_dir);
        }

        if let Some(port) = env(PORT_ENV) {
            match port.parse() {
                Ok(port) => config.server.ui.port = port,
                Err(_) => warn!(value = %port, "Ignoring invalid {}", PORT_ENV),
            }
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    pub fn into_config(self) -> Config {
        self.config
    }

    /// The highest-priority config file that was read, if any.
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }
}

fn read_yaml(file: &Path, tier: ConfigTier) -> Option<Value> {
    if !file.exists() {
        return None;
    }
    let content = match std::fs::read_to_string(file) {
        Ok(content) => content,
        Err(e) => {
            warn!(file = %file.display(), %tier, error = %e, "Cannot read config file");
            return None;
        }
    };
    match serde_yaml::from_str::<Value>(&content) {
        Ok(value) => {
            debug!(file = %file.display(), %tier, "Loaded config tier");
            Some(value)
        }
        Err(e) => {
            warn!(file = %file.display(), %tier, error = %e, "Ignoring malformed config file");
            None
        }
    }
}
