//! Configuration management for Recast.
//!
//! Configuration is read from the platform config directory when present;
//! every section falls back to its defaults field by field.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure for Recast.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Conversion defaults
    pub conversion: ConversionConfig,

    /// Batch concurrency
    pub batch: BatchConfig,

    /// Resource limits
    pub limits: LimitsConfig,

    /// Input discovery
    pub input: InputConfig,

    /// Report output settings
    pub output: OutputConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// Uses platform-appropriate directories:
    /// - macOS: ~/Library/Application Support/com.recast.recast/config.toml
    /// - Linux: ~/.config/recast/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\recast\config\config.toml
    ///
    /// Falls back to ~/.recast/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "recast", "recast")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".recast").join("config.toml")
            })
    }

    /// Resolved output directory (with ~ expansion).
    pub fn output_dir(&self) -> PathBuf {
        let path_str = self.conversion.output_dir.to_string_lossy();
        let expanded = shellexpand::tilde(&path_str);
        PathBuf::from(expanded.into_owned())
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.batch.parallel_workers, 4);
        assert_eq!(config.batch.buffer_size, 100);
        assert_eq!(config.limits.max_file_size_mb, 100);
        assert_eq!(config.limits.encode_timeout_ms, 10000);
        assert!((config.conversion.default_quality - 0.9).abs() < f32::EPSILON);
        assert!(config.conversion.keep_aspect_ratio);
        assert!(config.input.supported_extensions.contains(&"svg".to_string()));
    }

    #[test]
    fn test_config_to_toml() {
        let config = Config::default();
        let toml = config.to_toml().unwrap();
        assert!(toml.contains("[conversion]"));
        assert!(toml.contains("[batch]"));
        assert!(toml.contains("[limits]"));
    }

    #[test]
    fn test_toml_round_trip_preserves_values() {
        let mut config = Config::default();
        config.batch.parallel_workers = 8;
        config.conversion.output_dir = PathBuf::from("/tmp/out");
        let parsed = Config::from_toml(&config.to_toml().unwrap()).unwrap();
        assert_eq!(parsed.batch.parallel_workers, 8);
        assert_eq!(parsed.conversion.output_dir, PathBuf::from("/tmp/out"));
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config = Config::from_toml("[batch]\nparallel_workers = 2\n").unwrap();
        assert_eq!(config.batch.parallel_workers, 2);
        assert_eq!(config.batch.buffer_size, 100);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_invalid_file_is_rejected() {
        let err = Config::from_toml("[batch]\nparallel_workers = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));

        let err = Config::from_toml("[batch\n").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[limits]\nmax_image_dimension = 4096\n").unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.limits.max_image_dimension, 4096);
    }

    #[test]
    fn test_output_dir_expands_tilde() {
        let mut config = Config::default();
        config.conversion.output_dir = PathBuf::from("~/converted");
        assert!(!config.output_dir().to_string_lossy().starts_with('~'));
    }
}
