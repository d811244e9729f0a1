//! Configuration loader for Memory-Editor
//!
//! Handles loading configuration from TOML files and merging with defaults.

use super::defaults::default_config;
use super::validator::validate_config;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// File read by [`load_config`]
pub const DEFAULT_CONFIG_FILE: &str = "memory-editor.toml";

/// Configuration error type
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_scanner")]
    pub scanner: ScannerConfig,

    #[serde(default = "default_logging")]
    pub logging: LoggingConfig,
}

/// Scanner configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScannerConfig {
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_max_threads")]
    pub max_threads: usize,
    #[serde(default = "default_alignment")]
    pub alignment: usize,
    #[serde(default = "default_writable_only")]
    pub writable_only: bool,
    #[serde(default = "default_parallel")]
    pub parallel: bool,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// Configuration loader
pub struct ConfigLoader {
    config_path: PathBuf,
}

impl ConfigLoader {
    /// Creates a new configuration loader
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        ConfigLoader {
            config_path: path.as_ref().to_path_buf(),
        }
    }

    /// The file this loader reads and writes
    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Loads and validates configuration from file
    pub fn load(&self) -> Result<Config, ConfigError> {
        let path = self.path();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }

        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        validate_config(&config)?;
        debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Loads configuration or returns defaults if the file is missing or bad
    pub fn load_or_default(&self) -> Config {
        self.load().unwrap_or_default()
    }

    /// Saves configuration to file
    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(config)?;
        fs::write(self.path(), contents)?;
        Ok(())
    }
}

/// Loads configuration from the default location.
///
/// A missing file yields the defaults; a file that exists but does not parse
/// or validate is an error.
pub fn load_config() -> Result<Config, ConfigError> {
    match ConfigLoader::new(DEFAULT_CONFIG_FILE).load() {
        Err(ConfigError::FileNotFound(_)) => Ok(Config::default()),
        other => other,
    }
}

// Default functions for serde
fn default_scanner() -> ScannerConfig {
    ScannerConfig::default()
}

fn default_logging() -> LoggingConfig {
    LoggingConfig::default()
}

// Individual field defaults
fn default_chunk_size() -> usize {
    default_config().scanner.chunk_size
}

fn default_max_threads() -> usize {
    default_config().scanner.max_threads
}

fn default_alignment() -> usize {
    default_config().scanner.alignment
}

fn default_writable_only() -> bool {
    default_config().scanner.writable_only
}

fn default_parallel() -> bool {
    default_config().scanner.parallel
}

fn default_log_level() -> String {
    default_config().logging.level
}

impl Default for ScannerConfig {
    fn default() -> Self {
        let defaults = default_config().scanner;
        ScannerConfig {
            chunk_size: defaults.chunk_size,
            max_threads: defaults.max_threads,
            alignment: defaults.alignment,
            writable_only: defaults.writable_only,
            parallel: defaults.parallel,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: default_config().logging.level,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            scanner: default_scanner(),
            logging: default_logging(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.scanner.chunk_size, 65536);
        assert!(config.scanner.max_threads > 0);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_load_missing_file() {
        let loader = ConfigLoader::new("nonexistent.toml");
        assert_eq!(loader.path(), Path::new("nonexistent.toml"));
        let result = loader.load();
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::FileNotFound(path) if path == "nonexistent.toml"
        ));
    }

    #[test]
    fn test_load_or_default() {
        let loader = ConfigLoader::new("nonexistent.toml");
        assert_eq!(loader.load_or_default(), Config::default());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        let mut config = Config::default();
        config.scanner.alignment = 4;
        config.logging.level = "debug".to_string();
        let loader = ConfigLoader::new(&config_path);

        loader.save(&config).unwrap();
        assert!(config_path.exists());
        assert_eq!(loader.load().unwrap(), config);
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
            [scanner]
            chunk_size = 4096
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.scanner.chunk_size, 4096);
        assert_eq!(config.scanner.alignment, 1);
        assert!(config.scanner.max_threads > 0);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("bad.toml");
        fs::write(&config_path, "[scanner]\nchunk_size = 1000\n").unwrap();

        let result = ConfigLoader::new(&config_path).load();
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_load_rejects_malformed_toml() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("broken.toml");
        fs::write(&config_path, "[scanner\nchunk_size = ").unwrap();

        let result = ConfigLoader::new(&config_path).load();
        assert!(matches!(result, Err(ConfigError::TomlParse(_))));
    }
}
