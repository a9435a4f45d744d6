use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PointbookError, Result};
use crate::member::Tier;

const CONFIG_FILE: &str = "config.toml";
const BASE_DIR_NAME: &str = ".pointbook";
pub const DEFAULT_STORE_FILE: &str = "pointbook.json";
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Default config template with rich comments
const DEFAULT_CONFIG_TEMPLATE: &str = r#"# pointbook configuration file
# Location: ~/.pointbook/config.toml

[store]
# Datastore file inside the base directory
# Default: "pointbook.json"
file = "pointbook.json"

[log]
# Default log filter when RUST_LOG is not set (error, warn, info, debug, trace)
# Default: "warn"
level = "warn"

[members]
# Tier given to newly registered members (standard, reduced)
# Default: "standard"
default_tier = "standard"
"#;

/// Global configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub log: LogConfig,

    #[serde(default)]
    pub members: MembersConfig,
}

/// Datastore configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Datastore file name, relative to the base directory
    #[serde(default = "default_store_file")]
    pub file: String,
}

fn default_store_file() -> String {
    DEFAULT_STORE_FILE.to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            file: default_store_file(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Member defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MembersConfig {
    #[serde(default)]
    pub default_tier: Tier,
}

impl Config {
    /// Default base directory (~/.pointbook)
    pub fn default_base_dir() -> Result<PathBuf> {
        dirs::home_dir()
            .map(|h| h.join(BASE_DIR_NAME))
            .ok_or(PointbookError::HomeNotFound)
    }

    /// Load config from base directory
    pub fn load(base_dir: &Path) -> Result<Self> {
        let path = base_dir.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)?;
        let config: Config = toml::from_str(&content).map_err(|e| PointbookError::ConfigParse {
            path: path.clone(),
            message: e.to_string(),
        })?;

        Ok(config)
    }

    /// Save config to base directory
    pub fn save(&self, base_dir: &Path) -> Result<()> {
        let path = base_dir.join(CONFIG_FILE);
        fs::create_dir_all(base_dir)?;

        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    /// Get config file path
    pub fn path(base_dir: &Path) -> PathBuf {
        base_dir.join(CONFIG_FILE)
    }

    /// Initialize config with default template (rich comments)
    pub fn init(base_dir: &Path) -> Result<PathBuf> {
        let path = base_dir.join(CONFIG_FILE);
        fs::create_dir_all(base_dir)?;

        if !path.exists() {
            fs::write(&path, DEFAULT_CONFIG_TEMPLATE)?;
        }

        Ok(path)
    }

    /// Get a config value by dot-notation key
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "store.file" => Some(self.store.file.clone()),
            "log.level" => Some(self.log.level.clone()),
            "members.default_tier" => Some(self.members.default_tier.to_string()),
            _ => None,
        }
    }

    /// Set a config value by dot-notation key
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let value = value.trim().trim_matches('"').trim_matches('\'');
        match key {
            "store.file" => {
                if value.is_empty() {
                    return Err(PointbookError::ConfigValue {
                        key: key.to_string(),
                        message: "file name must not be empty".to_string(),
                    });
                }
                self.store.file = value.to_string();
                Ok(())
            }
            "log.level" => {
                self.log.level = parse_log_level(key, value)?;
                Ok(())
            }
            "members.default_tier" => {
                self.members.default_tier = value.parse()?;
                Ok(())
            }
            _ => Err(PointbookError::ConfigKeyNotFound {
                key: key.to_string(),
            }),
        }
    }

    /// List all config keys with their current values
    pub fn list(&self) -> Vec<(String, String)> {
        ["store.file", "log.level", "members.default_tier"]
            .iter()
            .filter_map(|key| self.get(key).map(|value| (key.to_string(), value)))
            .collect()
    }
}

fn parse_log_level(key: &str, value: &str) -> Result<String> {
    let level = value.to_lowercase();
    match level.as_str() {
        "error" | "warn" | "info" | "debug" | "trace" | "off" => Ok(level),
        _ => Err(PointbookError::ConfigValue {
            key: key.to_string(),
            message: format!("unknown log level '{}'", value),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.store.file, "pointbook.json");
        assert_eq!(config.log.level, "warn");
        assert_eq!(config.members.default_tier, Tier::Standard);
    }

    #[test]
    fn test_config_get_set() {
        let mut config = Config::default();

        config.set("members.default_tier", "reduced").unwrap();
        assert_eq!(config.members.default_tier, Tier::Reduced);
        assert_eq!(config.get("members.default_tier").unwrap(), "reduced");

        config.set("log.level", "DEBUG").unwrap();
        assert_eq!(config.get("log.level").unwrap(), "debug");

        config.set("store.file", "\"chapter.json\"").unwrap();
        assert_eq!(config.store.file, "chapter.json");
    }

    #[test]
    fn test_config_set_rejects_bad_values() {
        let mut config = Config::default();
        assert!(matches!(
            config.set("members.default_tier", "baby").unwrap_err(),
            PointbookError::InvalidTier { .. }
        ));
        assert!(matches!(
            config.set("log.level", "loud").unwrap_err(),
            PointbookError::ConfigValue { .. }
        ));
        assert!(matches!(
            config.set("store.path", "x").unwrap_err(),
            PointbookError::ConfigKeyNotFound { .. }
        ));
    }

    #[test]
    fn test_init_template_parses() {
        let temp = TempDir::new().unwrap();
        let path = Config::init(temp.path()).unwrap();
        assert!(path.exists());

        let config = Config::load(temp.path()).unwrap();
        assert_eq!(config.store.file, DEFAULT_STORE_FILE);
        assert_eq!(config.list().len(), 3);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let temp = TempDir::new().unwrap();
        let mut config = Config::default();
        config.set("log.level", "info").unwrap();
        config.save(temp.path()).unwrap();

        let loaded = Config::load(temp.path()).unwrap();
        assert_eq!(loaded.log.level, "info");
    }

    #[test]
    fn test_load_reports_parse_errors() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(CONFIG_FILE), "[store\nfile = 1").unwrap();
        let err = Config::load(temp.path()).unwrap_err();
        assert!(matches!(err, PointbookError::ConfigParse { .. }));
    }
}
