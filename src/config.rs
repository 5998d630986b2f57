//! Application Configuration
//!
//! Defaults, optionally overridden by a JSON file and then by
//! `CHECKMATE_*` environment variables.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const ENV_DATABASE_PATH: &str = "CHECKMATE_DATABASE_PATH";
pub const ENV_PREFERENCES_DIR: &str = "CHECKMATE_PREFERENCES_DIR";
pub const ENV_LOG_DIR: &str = "CHECKMATE_LOG_DIR";
pub const ENV_LOG_LEVEL: &str = "CHECKMATE_LOG_LEVEL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid log level {0:?}")]
    LogLevel(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// SQLite file, or `:memory:`
    pub database_path: PathBuf,
    /// Where per-identity theme files live
    pub preferences_dir: PathBuf,
    /// Rolling log directory; logging stays off when unset
    pub log_dir: Option<PathBuf>,
    /// One of error, warn, info, debug, trace
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("checkmate.db"),
            preferences_dir: PathBuf::from("preferences"),
            log_dir: None,
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load from an optional file, then apply environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply overrides from a variable lookup (the process environment in
    /// `load`)
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup(ENV_DATABASE_PATH) {
            self.database_path = PathBuf::from(v);
        }
        if let Some(v) = lookup(ENV_PREFERENCES_DIR) {
            self.preferences_dir = PathBuf::from(v);
        }
        if let Some(v) = lookup(ENV_LOG_DIR) {
            self.log_dir = Some(PathBuf::from(v));
        }
        if let Some(v) = lookup(ENV_LOG_LEVEL) {
            self.log_level = v;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.log_level
            .parse::<log::LevelFilter>()
            .map(|_| ())
            .map_err(|_| ConfigError::LogLevel(self.log_level.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.database_path, PathBuf::from("checkmate.db"));
        assert!(config.log_dir.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "database_path": ":memory:" }"#).unwrap();

        let config = AppConfig::from_file(&path).unwrap();
        assert_eq!(config.database_path, PathBuf::from(":memory:"));
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "database_path = 1").unwrap();
        assert!(matches!(AppConfig::from_file(&path), Err(ConfigError::Parse { .. })));
        assert!(matches!(
            AppConfig::from_file(&dir.path().join("missing.json")),
            Err(ConfigError::Read { .. })
        ));
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            (ENV_DATABASE_PATH, "/data/lists.db"),
            (ENV_LOG_DIR, "/var/log/checkmate"),
            (ENV_LOG_LEVEL, "debug"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.database_path, PathBuf::from("/data/lists.db"));
        assert_eq!(config.log_dir, Some(PathBuf::from("/var/log/checkmate")));
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.preferences_dir, PathBuf::from("preferences"));
    }

    #[test]
    fn test_bad_log_level() {
        let config = AppConfig {
            log_level: "loud".into(),
            ..AppConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::LogLevel(_))));
    }
}
