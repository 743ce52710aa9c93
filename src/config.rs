// Configuration loaded from YAML

use crate::store::DEFAULT_KEY;
use eyre::{Context, Result, eyre};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const APP_NAME: &str = "todostore";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the slot files
    pub store_dir: PathBuf,
    /// Slot key the task list is stored under
    pub key: String,
    /// Log level used when no -v flag is given
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        let store_dir = dirs::data_local_dir()
            .map(|d| d.join(APP_NAME))
            .unwrap_or_else(|| PathBuf::from(format!(".{}", APP_NAME)));
        Self {
            store_dir,
            key: DEFAULT_KEY.to_string(),
            log_level: "warn".to_string(),
        }
    }
}

impl Config {
    /// Load configuration
    ///
    /// An explicit path must exist. Without one, the user config file is read
    /// if present, otherwise defaults are used.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from(path);
        }

        match Self::default_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Default config file location: `<config dir>/todostore/todostore.yml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_NAME).join(format!("{}.yml", APP_NAME)))
    }

    fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).context(format!("Failed to read config file {:?}", path))?;
        let config: Config = serde_yaml::from_str(&content).context(format!("Failed to parse config file {:?}", path))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.key.trim().is_empty() {
            return Err(eyre!("Config key cannot be empty"));
        }
        self.log_level
            .parse::<tracing::Level>()
            .map_err(|_| eyre!("Invalid log_level '{}' (use error, warn, info, debug or trace)", self.log_level))?;
        Ok(())
    }

    /// Parsed log level, falling back to WARN
    pub fn level(&self) -> tracing::Level {
        self.log_level.parse().unwrap_or(tracing::Level::WARN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.key, "todos");
        assert_eq!(config.level(), tracing::Level::WARN);
        assert!(config.store_dir.ends_with("todostore"));
    }

    #[test]
    fn test_load_explicit_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yml");
        fs::write(&path, "store_dir: /tmp/tasks\nkey: work\nlog_level: debug\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.store_dir, PathBuf::from("/tmp/tasks"));
        assert_eq!(config.key, "work");
        assert_eq!(config.level(), tracing::Level::DEBUG);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yml");
        fs::write(&path, "key: personal\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.key, "personal");
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.store_dir, Config::default().store_dir);
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let temp = TempDir::new().unwrap();
        assert!(Config::load(Some(&temp.path().join("nope.yml"))).is_err());
    }

    #[test]
    fn test_invalid_values_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yml");

        fs::write(&path, "key: \"  \"\n").unwrap();
        assert!(Config::load(Some(&path)).is_err());

        fs::write(&path, "log_level: loud\n").unwrap();
        assert!(Config::load(Some(&path)).is_err());
    }
}
