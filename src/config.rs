//! Configuration loading and generation.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::models::rule::{DEFAULT_MIN_CONFIDENCE, DEFAULT_MIN_SUPPORT, MiningParams};

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Enable debug logging to file
    pub debug: bool,

    /// Path to log directory
    pub log_path: PathBuf,

    /// JSON file holding the transactions
    pub dataset_path: PathBuf,

    /// Address the HTTP server binds to
    pub listen: String,

    /// Default minimum support for rule generation
    pub min_support: f64,

    /// Default minimum confidence for rule generation
    pub min_confidence: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            debug: false,
            log_path: default_log_path(),
            dataset_path: PathBuf::from("dataset.json"),
            listen: "127.0.0.1:5000".to_string(),
            min_support: DEFAULT_MIN_SUPPORT,
            min_confidence: DEFAULT_MIN_CONFIDENCE,
        }
    }
}

impl Config {
    pub fn mining_defaults(&self) -> MiningParams {
        MiningParams::new(self.min_support, self.min_confidence)
    }
}

/// Default log path: ~/.config/cooccur/logs
fn default_log_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("cooccur")
        .join("logs")
}

/// Configuration service.
pub struct ConfigService;

impl ConfigService {
    /// Get the default configuration file path.
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("cooccur")
            .join("config.toml")
    }

    /// Load configuration from file.
    ///
    /// If `path` is `None`, uses the default path.
    /// If the file doesn't exist, returns default configuration.
    pub fn load(path: Option<&Path>) -> Result<Config> {
        let path = path.map(PathBuf::from).unwrap_or_else(Self::default_path);
        let config_dir = path.parent();

        if !path.exists() {
            // Missing file: defaults, nothing is created
            let mut config = Config::default();
            if let Some(dir) = config_dir {
                config.log_path = dir.join("logs");
            }
            return Ok(config);
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let mut config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        // If log_path was not explicitly set, use config file's directory/logs
        if config.log_path == default_log_path()
            && let Some(dir) = config_dir
        {
            config.log_path = dir.join("logs");
        }

        config
            .mining_defaults()
            .validate()
            .with_context(|| format!("Invalid thresholds in config file: {}", path.display()))?;

        Ok(config)
    }

    /// Generate default configuration file at the default path.
    pub fn generate_default() -> Result<()> {
        Self::generate_at(&Self::default_path())
    }

    /// Generate default configuration file at the specified path.
    pub fn generate_at(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let content = Self::default_config_content();
        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Generate default configuration content with comments.
    fn default_config_content() -> String {
        r#"# cooccur configuration file

# Enable debug logging to file (default: false)
debug = false

# Path to log directory (default: ~/.config/cooccur/logs)
# log_path = "~/.config/cooccur/logs"

# JSON file holding the transactions (default: ./dataset.json)
dataset_path = "dataset.json"

# Address for `cooccur serve` (default: 127.0.0.1:5000)
listen = "127.0.0.1:5000"

# Default thresholds for rule generation, each in (0, 1]
min_support = 0.3
min_confidence = 0.6
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_path_ends_with_config_toml() {
        let path = ConfigService::default_path();
        assert!(path.ends_with("cooccur/config.toml"));
    }

    #[test]
    fn test_generate_at_creates_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let config_path = dir.path().join("test_config.toml");

        ConfigService::generate_at(&config_path).unwrap();

        assert!(config_path.exists());
        let content = fs::read_to_string(&config_path).unwrap();
        assert!(content.contains("debug = false"));
        assert!(content.contains("dataset_path"));
    }

    #[test]
    fn test_generated_config_round_trips() {
        let dir = tempfile::TempDir::new().unwrap();
        let config_path = dir.path().join("nested").join("config.toml");

        ConfigService::generate_at(&config_path).unwrap();
        let config = ConfigService::load(Some(&config_path)).unwrap();

        assert!(!config.debug);
        assert_eq!(config.listen, "127.0.0.1:5000");
        assert_eq!(config.mining_defaults(), MiningParams::default());
        assert_eq!(config.log_path, dir.path().join("nested").join("logs"));
    }

    #[test]
    fn test_load_returns_defaults_when_missing() {
        let dir = tempfile::TempDir::new().unwrap();
        let config_path = dir.path().join("nonexistent.toml");

        let config = ConfigService::load(Some(&config_path)).unwrap();

        // Should return defaults without creating file
        assert!(!config_path.exists());
        assert!(!config.debug);
        assert_eq!(config.dataset_path, PathBuf::from("dataset.json"));
    }

    #[test]
    fn test_load_parses_existing_config() {
        let dir = tempfile::TempDir::new().unwrap();
        let config_path = dir.path().join("config.toml");

        fs::write(
            &config_path,
            "debug = true\ndataset_path = \"/srv/tajwid.json\"\nmin_support = 0.5\n",
        )
        .unwrap();

        let config = ConfigService::load(Some(&config_path)).unwrap();
        assert!(config.debug);
        assert_eq!(config.dataset_path, PathBuf::from("/srv/tajwid.json"));
        assert_eq!(config.min_support, 0.5);
        assert_eq!(config.min_confidence, DEFAULT_MIN_CONFIDENCE);
    }

    #[test]
    fn test_load_invalid_toml_returns_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let config_path = dir.path().join("bad.toml");

        fs::write(&config_path, "not valid [[[").unwrap();

        let result = ConfigService::load(Some(&config_path));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_rejects_out_of_range_threshold() {
        let dir = tempfile::TempDir::new().unwrap();
        let config_path = dir.path().join("config.toml");

        fs::write(&config_path, "min_confidence = 1.5\n").unwrap();

        assert!(ConfigService::load(Some(&config_path)).is_err());
    }

    #[test]
    fn test_load_custom_log_path() {
        let dir = tempfile::TempDir::new().unwrap();
        let config_path = dir.path().join("config.toml");

        fs::write(&config_path, "debug = true\nlog_path = \"/tmp/cooccur-logs\"\n").unwrap();

        let config = ConfigService::load(Some(&config_path)).unwrap();
        assert!(config.debug);
        assert_eq!(config.log_path, PathBuf::from("/tmp/cooccur-logs"));
    }
}
