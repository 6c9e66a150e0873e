//! # Configuration State
//!
//! Scanner configuration, loaded once at startup.
//!
//! ## Configuration Sources (later wins)
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. Defaults (this file)                                               │
//! │  2. Config file   <config dir>/greenbill.toml                          │
//! │  3. Environment   GREENBILL_BENCHMARK_POINTS                           │
//! │                   GREENBILL_DB_PATH                                    │
//! │                   GREENBILL_EXPORT_DIR                                 │
//! │  4. validate()    benchmark > 0, page size > 0                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # greenbill.toml
//! benchmark_points = 50
//! database_path = "/var/lib/greenbill/greenbill.db"
//! export_dir = "/home/me/Downloads"
//! saved_bills_page_size = 20
//! ```
//!
//! Read-only after startup, so no lock.

use directories::{ProjectDirs, UserDirs};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

use greenbill_core::validation::validate_benchmark_points;
use greenbill_core::AVG_CUSTOMER_GREENPOINTS;

pub const ENV_BENCHMARK_POINTS: &str = "GREENBILL_BENCHMARK_POINTS";
pub const ENV_DB_PATH: &str = "GREENBILL_DB_PATH";
pub const ENV_EXPORT_DIR: &str = "GREENBILL_EXPORT_DIR";

const CONFIG_FILE_NAME: &str = "greenbill.toml";
const DATABASE_FILE_NAME: &str = "greenbill.db";

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Scanner configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConfigState {
    /// Greenpoints of the average customer; progress is measured against it.
    #[serde(alias = "benchmark_points")]
    pub benchmark_points: i64,

    /// SQLite file. `None` uses the platform data directory.
    #[serde(alias = "database_path")]
    pub database_path: Option<PathBuf>,

    /// Where exported bills are written. `None` uses the user's downloads
    /// folder, falling back to the data directory.
    #[serde(alias = "export_dir")]
    pub export_dir: Option<PathBuf>,

    /// Default number of archived bills returned by `list_saved_bills`.
    #[serde(alias = "saved_bills_page_size")]
    pub saved_bills_page_size: u32,
}

impl Default for ConfigState {
    fn default() -> Self {
        ConfigState {
            benchmark_points: AVG_CUSTOMER_GREENPOINTS,
            database_path: None,
            export_dir: None,
            saved_bills_page_size: 20,
        }
    }
}

impl ConfigState {
    /// Loads defaults, then the config file, then environment overrides.
    ///
    /// A missing config file is not an error.
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut config = match config_path.or_else(Self::default_config_path) {
            Some(path) if path.exists() => {
                info!(?path, "Loading config from file");
                Self::from_toml(&std::fs::read_to_string(&path)?)?
            }
            Some(path) => {
                debug!(?path, "Config file not found, using defaults");
                Self::default()
            }
            None => Self::default(),
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns defaults if loading fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Parses a TOML document; absent keys keep their defaults.
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Applies `GREENBILL_*` overrides read through `var`.
    ///
    /// An unparseable benchmark is an error rather than silently ignored.
    pub fn apply_overrides<F>(&mut self, var: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = var(ENV_BENCHMARK_POINTS) {
            let points = raw.trim().parse::<i64>().map_err(|_| {
                ConfigError::Invalid(format!(
                    "{} must be an integer, got '{}'",
                    ENV_BENCHMARK_POINTS, raw
                ))
            })?;
            debug!(points, "Overriding benchmark from environment");
            self.benchmark_points = points;
        }

        if let Some(path) = var(ENV_DB_PATH) {
            self.database_path = Some(PathBuf::from(path));
        }

        if let Some(dir) = var(ENV_EXPORT_DIR) {
            self.export_dir = Some(PathBuf::from(dir));
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_benchmark_points(self.benchmark_points)
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        if self.saved_bills_page_size == 0 {
            return Err(ConfigError::Invalid(
                "saved_bills_page_size must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Platform config file location.
    pub fn default_config_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    /// Database file to open.
    ///
    /// ## Platform Defaults
    /// - **macOS**: `~/Library/Application Support/org.greenbill.scanner/greenbill.db`
    /// - **Windows**: `%APPDATA%\greenbill\scanner\data\greenbill.db`
    /// - **Linux**: `~/.local/share/scanner/greenbill.db`
    pub fn resolve_database_path(&self) -> PathBuf {
        if let Some(path) = &self.database_path {
            return path.clone();
        }

        Self::project_dirs()
            .map(|dirs| dirs.data_dir().join(DATABASE_FILE_NAME))
            .unwrap_or_else(|| PathBuf::from(DATABASE_FILE_NAME))
    }

    /// Directory exported bills are written to.
    pub fn resolve_export_dir(&self) -> PathBuf {
        if let Some(dir) = &self.export_dir {
            return dir.clone();
        }

        UserDirs::new()
            .and_then(|dirs| dirs.download_dir().map(Path::to_path_buf))
            .or_else(|| Self::project_dirs().map(|dirs| dirs.data_dir().join("exports")))
            .unwrap_or_else(|| PathBuf::from("."))
    }

    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("org", "greenbill", "scanner")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ConfigState::default();
        assert_eq!(config.benchmark_points, 50);
        assert_eq!(config.saved_bills_page_size, 20);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_toml_partial_keeps_defaults() {
        let config = ConfigState::from_toml("benchmark_points = 80\n").unwrap();
        assert_eq!(config.benchmark_points, 80);
        assert_eq!(config.saved_bills_page_size, 20);
        assert!(config.export_dir.is_none());
    }

    #[test]
    fn test_toml_paths() {
        let config = ConfigState::from_toml(
            r#"
            database_path = "/tmp/gb.db"
            export_dir = "/tmp/exports"
            "#,
        )
        .unwrap();
        assert_eq!(config.resolve_database_path(), PathBuf::from("/tmp/gb.db"));
        assert_eq!(config.resolve_export_dir(), PathBuf::from("/tmp/exports"));
    }

    #[test]
    fn test_toml_invalid() {
        assert!(matches!(
            ConfigState::from_toml("benchmark_points = \"lots\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = ConfigState::default();
        config
            .apply_overrides(env(&[
                (ENV_BENCHMARK_POINTS, "120"),
                (ENV_DB_PATH, "/data/gb.db"),
                (ENV_EXPORT_DIR, "/data/out"),
            ]))
            .unwrap();

        assert_eq!(config.benchmark_points, 120);
        assert_eq!(config.database_path, Some(PathBuf::from("/data/gb.db")));
        assert_eq!(config.export_dir, Some(PathBuf::from("/data/out")));
    }

    #[test]
    fn test_env_benchmark_must_parse() {
        let mut config = ConfigState::default();
        let result = config.apply_overrides(env(&[(ENV_BENCHMARK_POINTS, "fifty")]));
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
        assert_eq!(config.benchmark_points, 50);
    }

    #[test]
    fn test_validate_rejects_non_positive_benchmark() {
        let config = ConfigState {
            benchmark_points: 0,
            ..ConfigState::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("greenbill.toml");
        std::fs::write(&path, "benchmark_points = 75\nsaved_bills_page_size = 5\n").unwrap();

        let config = ConfigState::load(Some(path)).unwrap();
        assert_eq!(config.saved_bills_page_size, 5);
    }

    #[test]
    fn test_load_or_default_on_bad_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("greenbill.toml");
        std::fs::write(&path, "benchmark_points = -1\n").unwrap();

        assert!(ConfigState::load(Some(path.clone())).is_err());
        assert_eq!(
            ConfigState::load_or_default(Some(path)),
            ConfigState::default()
        );
    }
}
