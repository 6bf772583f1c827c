//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use crate::context::DEFAULT_CONTEXT_DAYS;
use crate::storage::{HISTORY_FILE, PROFILE_FILE};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub context: ContextConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where the two JSON documents live
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    #[serde(default = "default_history_file")]
    pub history_file: String,

    #[serde(default = "default_profile_file")]
    pub profile_file: String,
}

fn default_data_dir() -> String {
    data_dir_under(dirs::data_local_dir())
}

fn data_dir_under(base: Option<PathBuf>) -> String {
    base.map(|p| p.join("diary").to_string_lossy().to_string())
        .unwrap_or_else(|| "./data".to_string())
}

fn default_history_file() -> String {
    HISTORY_FILE.to_string()
}

fn default_profile_file() -> String {
    PROFILE_FILE.to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            history_file: default_history_file(),
            profile_file: default_profile_file(),
        }
    }
}

impl StorageConfig {
    /// Data directory with a leading `~` expanded
    pub fn data_path(&self) -> PathBuf {
        match self.data_dir.strip_prefix("~/") {
            Some(rest) => dirs::home_dir()
                .map(|home| home.join(rest))
                .unwrap_or_else(|| PathBuf::from(&self.data_dir)),
            None => PathBuf::from(&self.data_dir),
        }
    }

    pub fn history_path(&self) -> PathBuf {
        self.data_path().join(&self.history_file)
    }

    pub fn profile_path(&self) -> PathBuf {
        self.data_path().join(&self.profile_file)
    }
}

/// Look-back windows for prompt context and history reports
#[derive(Debug, Clone, Deserialize)]
pub struct ContextConfig {
    #[serde(default = "default_history_days")]
    pub history_days: i64,

    #[serde(default = "default_summary_days")]
    pub summary_days: i64,
}

fn default_history_days() -> i64 {
    DEFAULT_CONTEXT_DAYS
}

fn default_summary_days() -> i64 {
    30
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            history_days: default_history_days(),
            summary_days: default_summary_days(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,

    pub file: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Standard config locations, in search order
    pub fn default_paths() -> Vec<PathBuf> {
        [
            dirs::config_dir().map(|p| p.join("diary").join("config.toml")),
            Some(PathBuf::from("./config.toml")),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    /// Load the first existing file in `paths`, falling back to the
    /// environment-only config.
    ///
    /// Files that exist but fail to load are returned alongside the config
    /// so the caller can report them once logging is up.
    pub fn load_first(paths: &[PathBuf]) -> (Self, Vec<ConfigError>) {
        let mut errors = Vec::new();

        for path in paths.iter().filter(|p| p.exists()) {
            match Self::load_with_env(path) {
                Ok(config) => return (config, errors),
                Err(e) => errors.push(e),
            }
        }

        (Self::from_env(), errors)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let (config, errors) = Self::load_first(&Self::default_paths());
        for e in &errors {
            tracing::warn!("{}", e);
        }
        config
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply `DIARY_*` overrides read through `lookup`
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(data_dir) = lookup("DIARY_DATA_DIR") {
            self.storage.data_dir = data_dir;
        }

        if let Some(days) = lookup("DIARY_CONTEXT_DAYS") {
            match days.parse() {
                Ok(d) => self.context.history_days = d,
                Err(_) => tracing::warn!("Ignoring invalid DIARY_CONTEXT_DAYS: {:?}", days),
            }
        }

        if let Some(level) = lookup("DIARY_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("DIARY_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Diary Configuration
#
# Environment variables override these settings:
# - DIARY_DATA_DIR
# - DIARY_CONTEXT_DAYS
# - DIARY_LOG_LEVEL
# - DIARY_LOG_FORMAT

[storage]
# Directory holding the history and profile documents
data_dir = "~/.local/share/diary"

# Diary history and derived user profile
history_file = "diary_history.json"

# Hand-edited profile used for personalised advice
profile_file = "profile.json"

[context]
# Days of history included in the advice context
history_days = 7

# Default window for history reports
summary_days = 30

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"

# Optional log file path
# file = "/var/log/diary/diary.log"
"#
    .to_string()
}
